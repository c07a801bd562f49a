//! # TUI Adapter
//!
//! Terminal I/O for the selection page. Everything above this module speaks
//! [`Msg`] and [`Command`]; this is where crossterm events come in, where
//! commands are spawned onto the runtime, and where frames are drawn.
//!
//! ## Redraw Strategy
//!
//! Nothing on screen animates, so the loop sleeps up to 250ms waiting for
//! input and only redraws after an event or a finished command. All queued
//! events are drained before the next frame so held keys do not lag.

pub mod app;
pub mod common;
pub mod component;
pub mod components;
pub mod event;
pub mod keymap;
pub mod markdown;
pub mod selection;
pub mod styles;
mod ui;

use std::io::stdout;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::clipboard::CopyToClipboard;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{debug, info, warn};

use crate::tui::app::{App, Outcome};
use crate::tui::event::{Command, Msg, poll_event_immediate, poll_event_timeout};

const IDLE_POLL: Duration = Duration::from_millis(250);

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Release events are filtered in `event::translate`
        execute!(
            stdout(),
            EnableMouseCapture,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), PopKeyboardEnhancementFlags, DisableMouseCapture);
    }
}

fn spawn_all(cmds: Vec<Command>, tx: &mpsc::Sender<Msg>) {
    for cmd in cmds {
        let tx = tx.clone();
        tokio::spawn(async move {
            // Receiver gone means the loop has exited
            let _ = tx.send(cmd.run().await);
        });
    }
}

fn copy_to_clipboard(text: &str) {
    if let Err(e) = execute!(stdout(), CopyToClipboard::to_clipboard_from(text)) {
        warn!("Clipboard write failed: {}", e);
    }
}

/// Run the app until it quits. Must be called from inside a multi-threaded
/// tokio runtime; commands are spawned onto it.
pub fn run(mut app: App) -> std::io::Result<Outcome> {
    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    let (tx, rx) = mpsc::channel();

    let size = terminal.size().unwrap_or_default();
    app.update(&Msg::Resize {
        width: size.width,
        height: size.height,
    });
    spawn_all(app.init(), &tx);

    let mut needs_redraw = true;
    let result = loop {
        if needs_redraw {
            if let Err(e) = terminal.draw(|f| ui::draw_ui(f, &mut app)) {
                break Err(e);
            }
            needs_redraw = false;
        }

        let first_event = match poll_event_timeout(IDLE_POLL) {
            Ok(event) => event,
            Err(e) => break Err(e),
        };
        if first_event.is_some() {
            needs_redraw = true;
        }

        let mut pending: Vec<Msg> = first_event.into_iter().collect();
        loop {
            match poll_event_immediate() {
                Ok(Some(msg)) => pending.push(msg),
                Ok(None) => break,
                Err(e) => {
                    warn!("Dropping unreadable terminal event: {}", e);
                    break;
                }
            }
        }
        for msg in rx.try_iter() {
            debug!("Command finished");
            needs_redraw = true;
            pending.push(msg);
        }

        for msg in &pending {
            let cmds = app.update(msg);
            spawn_all(cmds, &tx);
            if let Some(text) = app.take_copy() {
                copy_to_clipboard(&text);
            }
        }

        if let Some(outcome) = app.outcome() {
            info!("Exiting: {:?}", outcome);
            break Ok(outcome.clone());
        }
    };

    drop(_terminal_mode_guard);
    ratatui::restore();
    result
}
