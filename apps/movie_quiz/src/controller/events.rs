//! Keyboard commands and the screen they apply to.

use std::sync::{Arc, Mutex, MutexGuard};

use quiz_core::QuizEvent;

pub const INPUT_HINT: &str = "keys: y = yes, n = no, r = play again / retry, q = quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    Yes,
    No,
    Again,
    Quit,
}

impl UserCommand {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Some(Self::Yes),
            "n" | "no" => Some(Self::No),
            "r" | "retry" | "restart" => Some(Self::Again),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }

    /// `r` retries the load after a load error and restarts otherwise.
    pub fn into_event(self, screen: Screen) -> QuizEvent {
        match self {
            Self::Yes => QuizEvent::Answer(true),
            Self::No => QuizEvent::Answer(false),
            Self::Again if screen == Screen::LoadError => QuizEvent::RetryLoad,
            Self::Again => QuizEvent::Restart,
            Self::Quit => QuizEvent::Shutdown,
        }
    }
}

/// What the terminal last rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Loading,
    Question,
    Feedback,
    Results,
    LoadError,
}

/// Written by the view, read by the input thread.
#[derive(Debug, Clone, Default)]
pub struct ScreenTracker {
    inner: Arc<Mutex<Screen>>,
}

impl ScreenTracker {
    pub fn set(&self, screen: Screen) {
        *self.lock() = screen;
    }

    pub fn get(&self) -> Screen {
        *self.lock()
    }

    fn lock(&self) -> MutexGuard<'_, Screen> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
