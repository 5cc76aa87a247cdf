use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{ensure, Context};
use quiz_core::{HttpMoviesLoader, QuizOptions};
use url::Url;

pub const CONFIG_FILE: &str = "movie_quiz.toml";
pub const ENV_PREFIX: &str = "MOVIE_QUIZ__";

const KEYS: [&str; 6] = [
    "movies_url",
    "api_key",
    "stats_path",
    "request_timeout_secs",
    "answer_delay_ms",
    "min_movies",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub movies_url: String,
    pub api_key: Option<String>,
    pub stats_path: PathBuf,
    pub request_timeout_secs: u64,
    pub answer_delay_ms: u64,
    pub min_movies: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            movies_url: "https://tv-api.com/en/API/Top250Movies".into(),
            api_key: None,
            stats_path: default_stats_path(),
            request_timeout_secs: 10,
            answer_delay_ms: 1000,
            min_movies: 10,
        }
    }
}

fn default_stats_path() -> PathBuf {
    match dirs::data_local_dir() {
        Some(dir) => dir.join("movie_quiz").join("statistics.json"),
        None => PathBuf::from("movie_quiz_statistics.json"),
    }
}

/// Defaults, then the config file, then `MOVIE_QUIZ__*` variables.
///
/// A missing `movie_quiz.toml` in the working directory is fine; a missing
/// file named explicitly is an error.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = config_path.map_or_else(|| PathBuf::from(CONFIG_FILE), Path::to_path_buf);
    match fs::read_to_string(&path) {
        Ok(raw) => settings
            .apply_file(&raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if err.kind() == ErrorKind::NotFound && config_path.is_none() => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    settings.apply_env(|name| std::env::var(name).ok())?;
    Ok(settings)
}

impl Settings {
    /// Flat `key = value` table; strings, integers and booleans are accepted.
    pub fn apply_file(&mut self, raw: &str) -> anyhow::Result<()> {
        let table: HashMap<String, toml::Value> = toml::from_str(raw)?;
        for (key, value) in table {
            let value = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(n) => n.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                other => anyhow::bail!("`{key}` must be a plain value, got {}", other.type_str()),
            };
            if KEYS.contains(&key.as_str()) {
                self.set(&key, &value)?;
            } else {
                tracing::warn!(key = %key, "ignoring unknown config key");
            }
        }
        Ok(())
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        for key in KEYS {
            let name = format!("{ENV_PREFIX}{}", key.to_ascii_uppercase());
            if let Some(value) = lookup(&name) {
                self.set(key, &value).with_context(|| format!("invalid {name}"))?;
            }
        }
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let value = value.trim();
        match key {
            "movies_url" => self.movies_url = value.to_string(),
            "api_key" => {
                self.api_key = (!value.is_empty()).then(|| value.to_string());
            }
            "stats_path" => self.stats_path = PathBuf::from(value),
            "request_timeout_secs" => self.request_timeout_secs = parse_number(key, value)?,
            "answer_delay_ms" => self.answer_delay_ms = parse_number(key, value)?,
            "min_movies" => self.min_movies = parse_number(key, value)?,
            other => anyhow::bail!("unknown setting `{other}`"),
        }
        Ok(())
    }

    pub fn quiz_options(&self) -> anyhow::Result<QuizOptions> {
        let base = Url::parse(&self.movies_url)
            .with_context(|| format!("movies_url '{}' is not a valid URL", self.movies_url))?;
        ensure!(
            matches!(base.scheme(), "http" | "https"),
            "movies_url must use http or https"
        );
        ensure!(self.request_timeout_secs > 0, "request_timeout_secs must be non-zero");
        ensure!(self.min_movies > 0, "min_movies must be at least 1");

        Ok(QuizOptions {
            movies_endpoint: HttpMoviesLoader::endpoint_with_key(&base, self.api_key.as_deref())?,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            answer_delay: Duration::from_millis(self.answer_delay_ms),
            min_movies: self.min_movies,
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> anyhow::Result<T> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("`{key}` expects a non-negative integer, got '{value}'"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
