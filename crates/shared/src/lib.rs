//! Values shared between the quiz engine, its storage and its front ends.

pub mod domain;
pub mod error;
pub mod view_models;

/// Number of questions in one round.
pub const QUESTIONS_AMOUNT: u32 = 10;
