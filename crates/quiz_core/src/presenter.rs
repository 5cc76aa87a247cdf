//! Quiz-flow state machine.
//!
//! All methods run on the primary flow. Background work (catalog load, poster
//! fetch, the post-answer delay) reports back through `QuizEvent`s, and every
//! report carries the `RoundId` it was issued for so a restart can discard
//! stale completions.

use std::{sync::Weak, time::Duration};

use chrono::Local;
use shared::{
    domain::{QuizQuestion, RoundId},
    error::{QuizError, UserFacingError},
    view_models::{QuizResultsViewModel, QuizStepViewModel},
    QUESTIONS_AMOUNT,
};
use tracing::{debug, info, warn};

use crate::{question_factory::QuestionSource, statistics::StatisticService};

pub const DEFAULT_ANSWER_DELAY: Duration = Duration::from_secs(1);

/// Passive view boundary. The presenter never reads anything back.
pub trait QuizView: Send + Sync {
    fn show(&self, step: QuizStepViewModel);
    fn show_results(&self, results: QuizResultsViewModel);
    fn highlight_answer(&self, is_correct: bool);
    fn show_loading_indicator(&self);
    fn hide_loading_indicator(&self);
    fn show_network_error(&self, message: String);

    /// Statistics could not be saved. There is nothing to retry, so views
    /// should not offer the load-failure retry action here.
    fn show_persistence_error(&self, message: String) {
        self.show_network_error(message);
    }
}

/// Runs the post-answer transition later on the primary flow.
pub trait DelayScheduler: Send {
    fn schedule_advance(&self, delay: Duration, round: RoundId);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizState {
    Loading,
    AwaitingAnswer(QuizQuestion),
    Evaluating,
    RoundComplete,
}

impl QuizState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::AwaitingAnswer(_) => "awaiting an answer",
            Self::Evaluating => "evaluating",
            Self::RoundComplete => "round complete",
        }
    }
}

pub struct MovieQuizPresenter {
    view: Weak<dyn QuizView>,
    question_factory: Box<dyn QuestionSource>,
    statistic_service: Box<dyn StatisticService>,
    scheduler: Box<dyn DelayScheduler>,
    answer_delay: Duration,

    state: QuizState,
    round: RoundId,
    questions_amount: u32,
    current_question_index: u32,
    correct_answers_count: u32,
    data_loaded: bool,
    load_failed: bool,
    question_requested: bool,
}

impl MovieQuizPresenter {
    pub fn new(
        view: Weak<dyn QuizView>,
        question_factory: Box<dyn QuestionSource>,
        statistic_service: Box<dyn StatisticService>,
        scheduler: Box<dyn DelayScheduler>,
    ) -> Self {
        Self {
            view,
            question_factory,
            statistic_service,
            scheduler,
            answer_delay: DEFAULT_ANSWER_DELAY,
            state: QuizState::Loading,
            round: RoundId::default(),
            questions_amount: QUESTIONS_AMOUNT,
            current_question_index: 0,
            correct_answers_count: 0,
            data_loaded: false,
            load_failed: false,
            question_requested: false,
        }
    }

    pub fn with_answer_delay(mut self, answer_delay: Duration) -> Self {
        self.answer_delay = answer_delay;
        self
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn round(&self) -> RoundId {
        self.round
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        match &self.state {
            QuizState::AwaitingAnswer(question) => Some(question),
            _ => None,
        }
    }

    pub fn current_question_index(&self) -> u32 {
        self.current_question_index
    }

    pub fn correct_answers_count(&self) -> u32 {
        self.correct_answers_count
    }

    pub fn start(&mut self) {
        info!("loading movie catalog");
        self.state = QuizState::Loading;
        self.load_failed = false;
        self.with_view(|view| view.show_loading_indicator());
        self.question_factory.load_data();
    }

    /// Retry action of the load-failure alert.
    pub fn retry_load(&mut self) -> Result<(), QuizError> {
        if self.state != QuizState::Loading || !self.load_failed {
            return Err(self.rejected("retry"));
        }
        self.start();
        Ok(())
    }

    // Factory listener callbacks, already marshalled onto the primary flow.

    pub fn did_load_data(&mut self) {
        self.data_loaded = true;
        self.load_failed = false;
        self.with_view(|view| view.hide_loading_indicator());

        if self.state == QuizState::Loading && !self.question_requested {
            self.request_question();
        }
    }

    pub fn did_fail_to_load_data(&mut self, error: QuizError) {
        warn!(kind = ?error.kind(), "movie catalog unavailable: {error}");
        self.data_loaded = false;
        self.load_failed = true;
        self.question_requested = false;
        self.state = QuizState::Loading;

        let message = UserFacingError::from_error(&error).message().to_string();
        self.with_view(|view| {
            view.hide_loading_indicator();
            view.show_network_error(message);
        });
    }

    pub fn did_receive_next_question(&mut self, round: RoundId, question: Option<QuizQuestion>) {
        if round != self.round {
            debug!(
                stale = round.0,
                active = self.round.0,
                "discarding question from a previous round"
            );
            return;
        }
        let Some(question) = question else {
            return;
        };
        if !self.question_requested {
            debug!(state = self.state.name(), "discarding unrequested question");
            return;
        }

        self.question_requested = false;
        let view_model = self.convert(&question);
        self.state = QuizState::AwaitingAnswer(question);
        self.with_view(|view| view.show(view_model));
    }

    // User actions.

    pub fn yes_button_clicked(&mut self) -> Result<(), QuizError> {
        self.handle_answer(true)
    }

    pub fn no_button_clicked(&mut self) -> Result<(), QuizError> {
        self.handle_answer(false)
    }

    pub fn restart_game(&mut self) -> Result<(), QuizError> {
        if !self.data_loaded {
            return Err(self.rejected("restart"));
        }

        self.round = self.round.next();
        self.current_question_index = 0;
        self.correct_answers_count = 0;
        self.state = QuizState::Loading;
        self.question_requested = false;
        info!(round = self.round.0, "round restarted");

        self.request_question();
        Ok(())
    }

    /// Continuation of the post-answer delay.
    pub fn advance_due(&mut self, round: RoundId) {
        if round != self.round || self.state != QuizState::Evaluating {
            debug!(
                scheduled = round.0,
                active = self.round.0,
                state = self.state.name(),
                "dropping stale delayed transition"
            );
            return;
        }
        self.proceed_to_next_question_or_results();
    }

    pub fn proceed_to_next_question_or_results(&mut self) {
        if self.is_last_question() {
            self.finish_round();
        } else {
            self.switch_to_next_question();
            self.request_question();
        }
    }

    pub fn is_last_question(&self) -> bool {
        self.current_question_index + 1 == self.questions_amount
    }

    pub fn convert(&self, model: &QuizQuestion) -> QuizStepViewModel {
        QuizStepViewModel {
            image: model.image.clone(),
            poster: model.poster,
            movie_title: model.movie_title.clone(),
            question: model.text.clone(),
            question_number: format!(
                "{}/{}",
                self.current_question_index + 1,
                self.questions_amount
            ),
        }
    }

    fn handle_answer(&mut self, user_answer: bool) -> Result<(), QuizError> {
        let QuizState::AwaitingAnswer(question) = &self.state else {
            return Err(self.rejected(if user_answer { "yes" } else { "no" }));
        };

        let is_correct = question.is_answered_by(user_answer);
        self.state = QuizState::Evaluating;
        self.did_answer(is_correct);
        debug!(
            round = self.round.0,
            index = self.current_question_index,
            is_correct,
            "answer evaluated"
        );

        self.with_view(|view| view.highlight_answer(is_correct));
        self.scheduler
            .schedule_advance(self.answer_delay, self.round);
        Ok(())
    }

    fn did_answer(&mut self, is_correct: bool) {
        if is_correct {
            self.correct_answers_count += 1;
        }
    }

    fn switch_to_next_question(&mut self) {
        self.current_question_index += 1;
    }

    fn request_question(&mut self) {
        self.question_requested = true;
        self.question_factory.request_next_question(self.round);
    }

    fn finish_round(&mut self) {
        self.state = QuizState::RoundComplete;
        info!(
            round = self.round.0,
            correct = self.correct_answers_count,
            total = self.questions_amount,
            "round complete"
        );

        if let Err(err) = self
            .statistic_service
            .store(self.correct_answers_count, self.questions_amount)
        {
            warn!(kind = ?err.kind(), "game result not stored: {err}");
            let message = UserFacingError::from_error(&err).message().to_string();
            self.with_view(|view| view.show_persistence_error(message));
        }

        let results = self.build_results_view_model();
        self.with_view(|view| view.show_results(results));
    }

    fn build_results_view_model(&self) -> QuizResultsViewModel {
        let best_game = self.statistic_service.best_game();
        let best_date = best_game.date.with_timezone(&Local).format("%d.%m.%y %H:%M");
        let text = format!(
            "Your result: {}/{}\nQuizzes played: {}\nRecord: {}/{} ({})\nAverage accuracy: {:.2}%",
            self.correct_answers_count,
            self.questions_amount,
            self.statistic_service.games_count(),
            best_game.correct,
            best_game.total,
            best_date,
            self.statistic_service.total_accuracy(),
        );

        QuizResultsViewModel {
            title: "This round is over!".to_string(),
            text,
            button_text: "Play again".to_string(),
        }
    }

    fn rejected(&self, action: &'static str) -> QuizError {
        QuizError::InvalidStateTransition {
            action,
            state: self.state.name(),
        }
    }

    fn with_view(&self, notify: impl FnOnce(&dyn QuizView)) {
        match self.view.upgrade() {
            Some(view) => notify(view.as_ref()),
            None => debug!("view released; dropping notification"),
        }
    }
}

#[cfg(test)]
#[path = "tests/presenter_tests.rs"]
mod tests;
