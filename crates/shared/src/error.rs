use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DataLoadFailure,
    InsufficientData,
    ImageDecodeFailure,
    InvalidStateTransition,
    PersistenceFailure,
    Validation,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("movie source transport error: {0}")]
    Transport(String),
    #[error("movie source rejected the request: {0}")]
    SourceRejected(String),
    #[error("malformed movie catalog response: {0}")]
    MalformedResponse(String),
    #[error("movie catalog has {actual} entries, at least {required} are required")]
    InsufficientData { required: usize, actual: usize },
    #[error("poster decode failed: {0}")]
    ImageDecode(String),
    #[error("{action} is not accepted while {state}")]
    InvalidStateTransition {
        action: &'static str,
        state: &'static str,
    },
    #[error("invalid game result {correct}/{total}")]
    InvalidGameResult { correct: u32, total: u32 },
    #[error("statistics persistence failed: {0}")]
    Persistence(String),
}

impl QuizError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) | Self::SourceRejected(_) | Self::MalformedResponse(_) => {
                ErrorKind::DataLoadFailure
            }
            Self::InsufficientData { .. } => ErrorKind::InsufficientData,
            Self::ImageDecode(_) => ErrorKind::ImageDecodeFailure,
            Self::InvalidStateTransition { .. } => ErrorKind::InvalidStateTransition,
            Self::InvalidGameResult { .. } => ErrorKind::Validation,
            Self::Persistence(_) => ErrorKind::PersistenceFailure,
        }
    }

    /// Load failures halt question flow until the user retries.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::DataLoadFailure | ErrorKind::InsufficientData
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserErrorCategory {
    Transport,
    SourceRejected,
    Validation,
    Persistence,
    Unknown,
}

/// Short, actionable text for an error that reaches the user.
#[derive(Debug, Clone)]
pub struct UserFacingError {
    category: UserErrorCategory,
    message: String,
}

impl UserFacingError {
    pub fn from_error(err: &QuizError) -> Self {
        match err {
            QuizError::SourceRejected(reason) => Self {
                category: UserErrorCategory::SourceRejected,
                message: format!("The movie service refused the request: {reason}"),
            },
            QuizError::InsufficientData { .. } => Self {
                category: UserErrorCategory::Validation,
                message: "The movie service returned too few movies to build a round.".to_string(),
            },
            QuizError::Persistence(_) => Self {
                category: UserErrorCategory::Persistence,
                message: "Your result could not be saved; statistics may be out of date."
                    .to_string(),
            },
            other => Self::from_message(other.to_string()),
        }
    }

    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        if lower.contains("timed out")
            || lower.contains("timeout")
            || lower.contains("connection")
            || lower.contains("dns")
            || lower.contains("transport")
            || lower.contains("unreachable")
        {
            Self {
                category: UserErrorCategory::Transport,
                message: "Could not reach the movie service; check the network and try again."
                    .to_string(),
            }
        } else if lower.contains("malformed")
            || lower.contains("invalid")
            || lower.contains("missing")
            || lower.contains("decode")
        {
            Self {
                category: UserErrorCategory::Validation,
                message: "The movie service sent data that could not be read.".to_string(),
            }
        } else {
            Self {
                category: UserErrorCategory::Unknown,
                message: format!("Failed to load movies: {message}"),
            }
        }
    }

    pub fn category(&self) -> UserErrorCategory {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_errors_map_onto_taxonomy() {
        assert_eq!(
            QuizError::Transport("boom".into()).kind(),
            ErrorKind::DataLoadFailure
        );
        assert_eq!(
            QuizError::InsufficientData {
                required: 10,
                actual: 3
            }
            .kind(),
            ErrorKind::InsufficientData
        );
        assert!(QuizError::InsufficientData {
            required: 10,
            actual: 3
        }
        .is_load_failure());
        assert!(!QuizError::ImageDecode("bad png".into()).is_load_failure());
        assert!(!QuizError::Persistence("disk full".into()).is_load_failure());
    }

    #[test]
    fn transport_failures_read_as_network_problems() {
        let err = QuizError::Transport("error sending request: connection refused".into());
        let user = UserFacingError::from_error(&err);
        assert_eq!(user.category(), UserErrorCategory::Transport);
        assert!(user.message().contains("network"));
    }

    #[test]
    fn malformed_payload_reads_as_validation_problem() {
        let err = QuizError::MalformedResponse("expected value at line 1".into());
        let user = UserFacingError::from_error(&err);
        assert_eq!(user.category(), UserErrorCategory::Validation);
    }

    #[test]
    fn source_rejection_keeps_upstream_reason() {
        let err = QuizError::SourceRejected("Invalid API Key".into());
        let user = UserFacingError::from_error(&err);
        assert_eq!(user.category(), UserErrorCategory::SourceRejected);
        assert!(user.message().ends_with("Invalid API Key"));
    }

    #[test]
    fn unknown_messages_are_passed_through() {
        let user = UserFacingError::from_message("something odd");
        assert_eq!(user.category(), UserErrorCategory::Unknown);
        assert_eq!(user.message(), "Failed to load movies: something odd");
    }
}
