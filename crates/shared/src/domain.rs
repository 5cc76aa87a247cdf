use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QuizError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub struct $name(pub u64);
    };
}

id_newtype!(RoundId);

impl RoundId {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// One entry of the ranked catalog the questions are built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub title: String,
    pub rating: f32,
    pub image_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosterInfo {
    pub width: u32,
    pub height: u32,
}

/// A yes/no question about a single movie. `image` is empty when the poster
/// could not be fetched or decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub image: Vec<u8>,
    pub poster: Option<PosterInfo>,
    pub movie_title: String,
    pub text: String,
    pub correct_answer: bool,
}

impl QuizQuestion {
    pub fn new(image: Vec<u8>, text: impl Into<String>, correct_answer: bool) -> Self {
        Self {
            image,
            poster: None,
            movie_title: String::new(),
            text: text.into(),
            correct_answer,
        }
    }

    pub fn with_poster(mut self, poster: Option<PosterInfo>) -> Self {
        self.poster = poster;
        self
    }

    pub fn with_movie_title(mut self, title: impl Into<String>) -> Self {
        self.movie_title = title.into();
        self
    }

    pub fn is_answered_by(&self, user_answer: bool) -> bool {
        self.correct_answer == user_answer
    }
}

/// Outcome of one completed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub correct: u32,
    pub total: u32,
    pub date: DateTime<Utc>,
}

impl GameResult {
    pub fn new(correct: u32, total: u32, date: DateTime<Utc>) -> Result<Self, QuizError> {
        if total == 0 || correct > total {
            return Err(QuizError::InvalidGameResult { correct, total });
        }
        Ok(Self {
            correct,
            total,
            date,
        })
    }

    /// Strictly more correct answers; ties are not better.
    pub fn is_better_than(&self, another: &GameResult) -> bool {
        self.correct > another.correct
    }
}

impl Default for GameResult {
    fn default() -> Self {
        Self {
            correct: 0,
            total: 0,
            date: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}
