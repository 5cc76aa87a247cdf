//! Movie quiz engine: catalog loading, question construction, round flow and
//! statistics.

use std::{sync::Arc, time::Duration};

use shared::error::QuizError;
use storage::StatisticsStore;
use url::Url;

pub mod movies_loader;
pub mod presenter;
pub mod question_factory;
pub mod runtime;
pub mod statistics;

pub use movies_loader::{HttpMoviesLoader, MoviesLoading};
pub use presenter::{DelayScheduler, MovieQuizPresenter, QuizState, QuizView};
pub use question_factory::{QuestionFactory, QuestionFactoryListener, QuestionSource};
pub use runtime::{event_channel, run_event_loop, EventListener, QuizEvent, TokioDelayScheduler};
pub use statistics::{StatisticService, StoredStatistics};

#[derive(Debug, Clone)]
pub struct QuizOptions {
    pub movies_endpoint: Url,
    pub request_timeout: Duration,
    pub answer_delay: Duration,
    pub min_movies: usize,
}

/// Wires loader, factory, statistics and scheduler around `view`.
pub fn build_presenter<S>(
    options: &QuizOptions,
    view: std::sync::Weak<dyn QuizView>,
    store: S,
    events: tokio::sync::mpsc::UnboundedSender<QuizEvent>,
) -> Result<MovieQuizPresenter, QuizError>
where
    S: StatisticsStore + 'static,
{
    let loader = HttpMoviesLoader::new(options.movies_endpoint.clone(), options.request_timeout)?;
    let factory = QuestionFactory::new(
        Arc::new(loader),
        Arc::new(EventListener::new(events.clone())),
        options.min_movies,
    );

    Ok(MovieQuizPresenter::new(
        view,
        Box::new(factory),
        Box::new(StoredStatistics::new(store)),
        Box::new(TokioDelayScheduler::new(events)),
    )
    .with_answer_delay(options.answer_delay))
}
