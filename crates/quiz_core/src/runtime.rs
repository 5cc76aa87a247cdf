//! Primary flow: a single task that owns the presenter and applies events in
//! arrival order.

use std::{ops::ControlFlow, time::Duration};

use shared::{
    domain::{QuizQuestion, RoundId},
    error::QuizError,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use crate::{
    presenter::{DelayScheduler, MovieQuizPresenter},
    question_factory::QuestionFactoryListener,
};

#[derive(Debug)]
pub enum QuizEvent {
    DataLoaded,
    DataLoadFailed(QuizError),
    QuestionReady {
        round: RoundId,
        question: Option<QuizQuestion>,
    },
    AdvanceDue {
        round: RoundId,
    },
    Answer(bool),
    Restart,
    RetryLoad,
    Shutdown,
}

impl QuizEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DataLoaded => "data_loaded",
            Self::DataLoadFailed(_) => "data_load_failed",
            Self::QuestionReady { .. } => "question_ready",
            Self::AdvanceDue { .. } => "advance_due",
            Self::Answer(_) => "answer",
            Self::Restart => "restart",
            Self::RetryLoad => "retry_load",
            Self::Shutdown => "shutdown",
        }
    }
}

pub fn event_channel() -> (UnboundedSender<QuizEvent>, UnboundedReceiver<QuizEvent>) {
    mpsc::unbounded_channel()
}

/// Factory listener that hands every completion back to the primary flow.
#[derive(Clone)]
pub struct EventListener {
    tx: UnboundedSender<QuizEvent>,
}

impl EventListener {
    pub fn new(tx: UnboundedSender<QuizEvent>) -> Self {
        Self { tx }
    }

    fn forward(&self, event: QuizEvent) {
        let name = event.name();
        if self.tx.send(event).is_err() {
            debug!(event = name, "event loop gone; dropping factory notification");
        }
    }
}

impl QuestionFactoryListener for EventListener {
    fn on_question_ready(&self, round: RoundId, question: Option<QuizQuestion>) {
        self.forward(QuizEvent::QuestionReady { round, question });
    }

    fn on_data_loaded(&self) {
        self.forward(QuizEvent::DataLoaded);
    }

    fn on_data_load_failed(&self, error: QuizError) {
        self.forward(QuizEvent::DataLoadFailed(error));
    }
}

/// Sleeps on the Tokio timer, then enqueues `AdvanceDue`. Never blocks the
/// primary flow.
pub struct TokioDelayScheduler {
    tx: UnboundedSender<QuizEvent>,
}

impl TokioDelayScheduler {
    pub fn new(tx: UnboundedSender<QuizEvent>) -> Self {
        Self { tx }
    }
}

impl DelayScheduler for TokioDelayScheduler {
    fn schedule_advance(&self, delay: Duration, round: RoundId) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(QuizEvent::AdvanceDue { round });
        });
    }
}

pub fn dispatch(presenter: &mut MovieQuizPresenter, event: QuizEvent) -> ControlFlow<()> {
    debug!(event = event.name(), "dispatching quiz event");
    let outcome = match event {
        QuizEvent::DataLoaded => {
            presenter.did_load_data();
            Ok(())
        }
        QuizEvent::DataLoadFailed(error) => {
            presenter.did_fail_to_load_data(error);
            Ok(())
        }
        QuizEvent::QuestionReady { round, question } => {
            presenter.did_receive_next_question(round, question);
            Ok(())
        }
        QuizEvent::AdvanceDue { round } => {
            presenter.advance_due(round);
            Ok(())
        }
        QuizEvent::Answer(true) => presenter.yes_button_clicked(),
        QuizEvent::Answer(false) => presenter.no_button_clicked(),
        QuizEvent::Restart => presenter.restart_game(),
        QuizEvent::RetryLoad => presenter.retry_load(),
        QuizEvent::Shutdown => return ControlFlow::Break(()),
    };

    // Out-of-state input is expected (double clicks, keys during the delay).
    if let Err(err) = outcome {
        debug!("input ignored: {err}");
    }
    ControlFlow::Continue(())
}

/// Starts the presenter and runs until `Shutdown`. Returns the presenter for
/// inspection.
pub async fn run_event_loop(
    mut presenter: MovieQuizPresenter,
    mut events: UnboundedReceiver<QuizEvent>,
) -> MovieQuizPresenter {
    presenter.start();
    while let Some(event) = events.recv().await {
        if dispatch(&mut presenter, event).is_break() {
            break;
        }
    }
    info!(round = presenter.round().0, "quiz event loop stopped");
    presenter
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
