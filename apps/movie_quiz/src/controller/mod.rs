//! Controller layer: keyboard commands, screen tracking, and dispatch into the
//! quiz event loop.

pub mod events;
pub mod orchestration;
