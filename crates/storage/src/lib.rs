use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use serde::{Deserialize, Serialize};
use shared::{domain::GameResult, error::QuizError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access statistics file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("statistics file '{path}' is corrupt (copy kept at '{backup}'): {source}")]
    Corrupt {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode statistics: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("statistics store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Corrupt files are copied aside on load, so overwriting them loses nothing.
    pub fn is_safe_to_overwrite(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}

impl From<StoreError> for QuizError {
    fn from(value: StoreError) -> Self {
        QuizError::Persistence(value.to_string())
    }
}

/// Cumulative statistics of every completed round on this installation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsRecord {
    pub games_count: u32,
    pub correct_sum: u64,
    pub total_sum: u64,
    pub best_game: Option<GameResult>,
}

impl StatisticsRecord {
    /// Record after one more completed round. The first round always becomes
    /// the best game.
    pub fn with_game(&self, game: GameResult) -> Self {
        let best_game = match self.best_game {
            Some(best) if !game.is_better_than(&best) => Some(best),
            _ => Some(game),
        };
        Self {
            games_count: self.games_count.saturating_add(1),
            correct_sum: self.correct_sum + u64::from(game.correct),
            total_sum: self.total_sum + u64::from(game.total),
            best_game,
        }
    }

    pub fn best_game(&self) -> GameResult {
        self.best_game.unwrap_or_default()
    }

    /// Percentage over running sums, not an average of per-round percentages.
    pub fn total_accuracy(&self) -> f64 {
        if self.total_sum == 0 {
            return 0.0;
        }
        100.0 * self.correct_sum as f64 / self.total_sum as f64
    }
}

pub trait StatisticsStore: Send {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<StatisticsRecord>, StoreError>;
    /// Must be durable before returning.
    fn save(&self, record: &StatisticsRecord) -> Result<(), StoreError>;
}

/// Single JSON document on disk, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        ensure_parent_dir_exists(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `statistics.json` -> `statistics.json.corrupt`.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".corrupt");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl StatisticsStore for JsonFileStore {
    fn load(&self) -> Result<Option<StatisticsRecord>, StoreError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(err)),
        };
        match serde_json::from_slice(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(source) => {
                let backup = self.backup_path();
                fs::write(&backup, &raw).map_err(|err| StoreError::Io {
                    path: backup.clone(),
                    source: err,
                })?;
                tracing::warn!(backup = %backup.display(), "corrupt statistics file copied aside");
                Err(StoreError::Corrupt {
                    path: self.path.clone(),
                    backup,
                    source,
                })
            }
        }
    }

    fn save(&self, record: &StatisticsRecord) -> Result<(), StoreError> {
        let encoded = serde_json::to_vec_pretty(record)?;
        let dir = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut staged = tempfile::NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        staged.write_all(&encoded).map_err(|e| self.io_error(e))?;
        staged
            .as_file()
            .sync_all()
            .map_err(|e| self.io_error(e))?;
        staged
            .persist(&self.path)
            .map_err(|err| self.io_error(err.error))?;

        tracing::debug!(
            path = %self.path.display(),
            games_count = record.games_count,
            "statistics saved"
        );
        Ok(())
    }
}

/// Process-local store. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    record: Option<StatisticsRecord>,
    saves: usize,
    fail_saves: bool,
    fail_loads: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: StatisticsRecord) -> Self {
        let store = Self::default();
        store.lock().record = Some(record);
        store
    }

    /// Makes every later `save` fail, for exercising persistence errors.
    pub fn fail_saves(&self, fail: bool) {
        self.lock().fail_saves = fail;
    }

    /// Makes every later `load` fail with an I/O error.
    pub fn fail_loads(&self, fail: bool) {
        self.lock().fail_loads = fail;
    }

    pub fn saves(&self) -> usize {
        self.lock().saves
    }

    pub fn snapshot(&self) -> Option<StatisticsRecord> {
        self.lock().record.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StatisticsStore for MemoryStore {
    fn load(&self) -> Result<Option<StatisticsRecord>, StoreError> {
        let state = self.lock();
        if state.fail_loads {
            return Err(StoreError::Io {
                path: PathBuf::from("<memory>"),
                source: std::io::Error::new(ErrorKind::Other, "simulated read failure"),
            });
        }
        Ok(state.record.clone())
    }

    fn save(&self, record: &StatisticsRecord) -> Result<(), StoreError> {
        let mut state = self.lock();
        if state.fail_saves {
            return Err(StoreError::Unavailable("memory store is read-only".into()));
        }
        state.record = Some(record.clone());
        state.saves += 1;
        Ok(())
    }
}

fn ensure_parent_dir_exists(path: &Path) -> Result<(), StoreError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }

    fs::create_dir_all(parent).map_err(|source| StoreError::Io {
        path: parent.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
