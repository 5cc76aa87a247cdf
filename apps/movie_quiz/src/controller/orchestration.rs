//! Command orchestration from terminal input to the quiz event queue.

use std::io::{BufRead, Write};

use quiz_core::QuizEvent;
use tokio::sync::mpsc::UnboundedSender;

use super::events::{ScreenTracker, UserCommand, INPUT_HINT};

/// Returns `false` once the event loop has gone away.
pub fn dispatch_user_command(
    tx: &UnboundedSender<QuizEvent>,
    cmd: UserCommand,
    screens: &ScreenTracker,
) -> bool {
    let screen = screens.get();
    let event = cmd.into_event(screen);
    let event_name = event.name();

    match tx.send(event) {
        Ok(()) => {
            tracing::debug!(command = ?cmd, screen = ?screen, event = event_name, "queued user command");
            true
        }
        Err(_) => {
            tracing::debug!(command = ?cmd, "event loop stopped; dropping user command");
            false
        }
    }
}

/// Reads commands line by line until `q`, end of input, or a closed queue.
/// End of input counts as quit.
pub fn run_input_loop(
    input: impl BufRead,
    mut hints: impl Write,
    tx: &UnboundedSender<QuizEvent>,
    screens: &ScreenTracker,
) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!("stdin read failed: {err}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let Some(cmd) = UserCommand::parse(&line) else {
            let _ = writeln!(hints, "{INPUT_HINT}");
            continue;
        };
        if !dispatch_user_command(tx, cmd, screens) || cmd == UserCommand::Quit {
            return;
        }
    }

    let _ = tx.send(QuizEvent::Shutdown);
}
