use std::{io, path::PathBuf, sync::Arc, thread};

use anyhow::{Context, Result};
use clap::Parser;
use quiz_core::{build_presenter, event_channel, run_event_loop, QuizView};
use storage::JsonFileStore;
use tracing_subscriber::EnvFilter;

mod config;
mod controller;
mod terminal_view;

use controller::{events::ScreenTracker, orchestration::run_input_loop};
use terminal_view::TerminalView;

#[derive(Parser, Debug)]
#[command(about = "Guess whether a top-rated movie beats the rating threshold")]
struct Args {
    /// Settings file; defaults to ./movie_quiz.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    movies_url: Option<String>,
    #[arg(long)]
    api_key: Option<String>,
    #[arg(long)]
    stats_path: Option<PathBuf>,
    #[arg(long)]
    request_timeout_secs: Option<u64>,
    #[arg(long)]
    answer_delay_ms: Option<u64>,
    #[arg(long)]
    min_movies: Option<usize>,
    /// Filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn overrides(&self) -> Vec<(&'static str, String)> {
        let mut overrides = Vec::new();
        if let Some(v) = &self.movies_url {
            overrides.push(("movies_url", v.clone()));
        }
        if let Some(v) = &self.api_key {
            overrides.push(("api_key", v.clone()));
        }
        if let Some(v) = &self.stats_path {
            overrides.push(("stats_path", v.display().to_string()));
        }
        if let Some(v) = self.request_timeout_secs {
            overrides.push(("request_timeout_secs", v.to_string()));
        }
        if let Some(v) = self.answer_delay_ms {
            overrides.push(("answer_delay_ms", v.to_string()));
        }
        if let Some(v) = self.min_movies {
            overrides.push(("min_movies", v.to_string()));
        }
        overrides
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid --log-level filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut settings = config::load_settings(args.config.as_deref())?;
    for (key, value) in args.overrides() {
        settings
            .set(key, &value)
            .with_context(|| format!("invalid --{}", key.replace('_', "-")))?;
    }
    let options = settings.quiz_options()?;
    tracing::info!(
        endpoint = %settings.movies_url,
        stats_path = %settings.stats_path.display(),
        "starting movie quiz"
    );

    let store = JsonFileStore::new(&settings.stats_path).with_context(|| {
        format!(
            "failed to prepare statistics file '{}'",
            settings.stats_path.display()
        )
    })?;

    let screens = ScreenTracker::default();
    let view: Arc<dyn QuizView> = Arc::new(TerminalView::new(io::stdout(), screens.clone()));
    let (events_tx, events_rx) = event_channel();
    let presenter = build_presenter(&options, Arc::downgrade(&view), store, events_tx.clone())
        .context("failed to build the quiz")?;

    thread::Builder::new()
        .name("stdin-input".into())
        .spawn(move || run_input_loop(io::stdin().lock(), io::stdout(), &events_tx, &screens))
        .context("failed to spawn input thread")?;

    let presenter = run_event_loop(presenter, events_rx).await;
    tracing::info!(
        round = presenter.round().0,
        state = presenter.state().name(),
        "movie quiz stopped"
    );
    drop(view);
    Ok(())
}
