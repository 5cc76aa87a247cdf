//! Immutable projections handed to the view boundary.

use crate::domain::PosterInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizStepViewModel {
    pub image: Vec<u8>,
    pub poster: Option<PosterInfo>,
    pub movie_title: String,
    pub question: String,
    pub question_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResultsViewModel {
    pub title: String,
    pub text: String,
    pub button_text: String,
}

/// Dialog shown for a failure the user can act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertModel {
    pub title: String,
    pub message: String,
    pub button_text: String,
}

impl AlertModel {
    pub fn network_error(message: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            message: message.into(),
            button_text: "Try again".to_string(),
        }
    }

    /// Informational only; dismissing it does not retry anything.
    pub fn persistence_error(message: impl Into<String>) -> Self {
        Self {
            title: "Statistics not saved".to_string(),
            message: message.into(),
            button_text: "OK".to_string(),
        }
    }
}
