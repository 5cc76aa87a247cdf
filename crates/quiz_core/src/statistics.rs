//! Aggregate of every completed round, persisted through a `StatisticsStore`.

use std::cell::OnceCell;

use chrono::Utc;
use shared::{domain::GameResult, error::QuizError};
use storage::{StatisticsRecord, StatisticsStore, StoreError};
use tracing::{error, info};

pub trait StatisticService: Send {
    /// Durable before returning; on error nothing is counted.
    fn store(&mut self, correct: u32, total: u32) -> Result<(), QuizError>;
    fn best_game(&self) -> GameResult;
    fn games_count(&self) -> u32;
    fn total_accuracy(&self) -> f64;
}

/// Statistics backed by a `StatisticsStore`, read on first access.
///
/// An unreadable history blocks every `store` until a later read succeeds, so
/// a transient I/O error never replaces the file with a one-game record. A
/// corrupt file has already been copied aside and is overwritten normally.
pub struct StoredStatistics<S> {
    store: S,
    history: OnceCell<History>,
}

struct History {
    record: StatisticsRecord,
    unreadable: Option<StoreError>,
}

impl<S: StatisticsStore> StoredStatistics<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            history: OnceCell::new(),
        }
    }

    fn history(&self) -> &History {
        self.history.get_or_init(|| self.read_history())
    }

    fn record(&self) -> &StatisticsRecord {
        &self.history().record
    }

    fn read_history(&self) -> History {
        match self.store.load() {
            Ok(record) => History {
                record: record.unwrap_or_default(),
                unreadable: None,
            },
            Err(err) if err.is_safe_to_overwrite() => {
                error!("statistics unreadable, starting from an empty history: {err}");
                History {
                    record: StatisticsRecord::default(),
                    unreadable: None,
                }
            }
            Err(err) => {
                error!("statistics unreadable, refusing to overwrite them: {err}");
                History {
                    record: StatisticsRecord::default(),
                    unreadable: Some(err),
                }
            }
        }
    }
}

impl<S: StatisticsStore> StatisticService for StoredStatistics<S> {
    fn store(&mut self, correct: u32, total: u32) -> Result<(), QuizError> {
        let game = GameResult::new(correct, total, Utc::now())?;
        if self.history().unreadable.is_some() {
            self.history = OnceCell::from(self.read_history());
        }
        let history = self.history();
        if let Some(err) = &history.unreadable {
            return Err(QuizError::Persistence(format!(
                "stored statistics could not be read, result not saved: {err}"
            )));
        }

        let next = history.record.with_game(game);
        self.store.save(&next)?;

        info!(
            correct,
            total,
            games_count = next.games_count,
            "game result stored"
        );
        self.history = OnceCell::from(History {
            record: next,
            unreadable: None,
        });
        Ok(())
    }

    fn best_game(&self) -> GameResult {
        self.record().best_game()
    }

    fn games_count(&self) -> u32 {
        self.record().games_count
    }

    fn total_accuracy(&self) -> f64 {
        self.record().total_accuracy()
    }
}
