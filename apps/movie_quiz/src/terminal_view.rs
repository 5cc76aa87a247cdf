//! Line-oriented rendering of the quiz on a terminal.

use std::{
    io::Write,
    sync::{Mutex, MutexGuard},
};

use quiz_core::QuizView;
use shared::{
    domain::PosterInfo,
    view_models::{AlertModel, QuizResultsViewModel, QuizStepViewModel},
};

use crate::controller::events::{Screen, ScreenTracker};

pub struct TerminalView {
    out: Mutex<Box<dyn Write + Send>>,
    screens: ScreenTracker,
}

impl TerminalView {
    pub fn new(out: impl Write + Send + 'static, screens: ScreenTracker) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
            screens,
        }
    }

    fn emit(&self, screen: Screen, text: &str) {
        self.screens.set(screen);
        self.print(text);
    }

    fn print(&self, text: &str) {
        let mut out = self.out();
        if let Err(err) = writeln!(out, "{text}").and_then(|()| out.flush()) {
            tracing::warn!("terminal write failed: {err}");
        }
    }

    fn out(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl QuizView for TerminalView {
    fn show(&self, step: QuizStepViewModel) {
        self.emit(Screen::Question, &render_step(&step));
    }

    fn show_results(&self, results: QuizResultsViewModel) {
        self.emit(Screen::Results, &render_results(&results));
    }

    fn highlight_answer(&self, is_correct: bool) {
        let marker = if is_correct { "[+] correct" } else { "[-] incorrect" };
        self.emit(Screen::Feedback, marker);
    }

    fn show_loading_indicator(&self) {
        self.emit(Screen::Loading, "Loading movies...");
    }

    fn hide_loading_indicator(&self) {}

    fn show_network_error(&self, message: String) {
        self.emit(Screen::LoadError, &render_alert(&AlertModel::network_error(message)));
    }

    // Screen unchanged: `r` still restarts once the results are up.
    fn show_persistence_error(&self, message: String) {
        self.print(&render_notice(&AlertModel::persistence_error(message)));
    }
}

pub fn describe_poster(image: &[u8], poster: Option<PosterInfo>) -> String {
    if image.is_empty() {
        return "poster unavailable".to_string();
    }
    let kib = (image.len() + 512) / 1024;
    match poster {
        Some(PosterInfo { width, height }) => format!("poster {width}x{height}, {kib} KB"),
        None => format!("poster {kib} KB"),
    }
}

pub fn render_step(step: &QuizStepViewModel) -> String {
    let mut text = format!("\nQuestion {}", step.question_number);
    if !step.movie_title.is_empty() {
        text.push_str(&format!("\n{}", step.movie_title));
    }
    text.push_str(&format!(
        "\n({})\n{}\n[y] yes  [n] no",
        describe_poster(&step.image, step.poster),
        step.question
    ));
    text
}

pub fn render_results(results: &QuizResultsViewModel) -> String {
    format!(
        "\n== {} ==\n{}\n[r] {}  [q] quit",
        results.title, results.text, results.button_text
    )
}

pub fn render_alert(alert: &AlertModel) -> String {
    format!(
        "\n!! {}: {}\n[r] {}  [q] quit",
        alert.title, alert.message, alert.button_text
    )
}

pub fn render_notice(alert: &AlertModel) -> String {
    format!("\n!! {}: {}", alert.title, alert.message)
}
