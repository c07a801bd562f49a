//! Messages and commands.
//!
//! Every input the UI reacts to is a [`Msg`]. Terminal events are translated
//! into messages by [`poll_event_timeout`]; background work is expressed as a
//! [`Command`], a future that resolves to exactly one message which the run
//! loop feeds back through `update`.

use std::future::Future;
use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseEvent};
use futures::future::BoxFuture;

use crate::core::listing::Listing;

#[derive(Debug, Clone)]
pub enum Msg {
    Resize { width: u16, height: u16 },
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// The tab strip switched to the tab at this raw index.
    ActiveTab(usize),
    /// Aggregation finished. `generation` identifies the load that produced
    /// it; only the newest one is installed.
    Listing { generation: u64, listing: Listing },
    /// Unrecoverable error; the shell shows it and exits on the next key.
    Fatal(String),
    /// A repository was chosen from the selector.
    RepoChosen { identity: String, hint: String },
    /// Text to place on the clipboard.
    Copy(String),
}

/// Deferred work yielding one [`Msg`].
pub struct Command(BoxFuture<'static, Msg>);

impl Command {
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Msg> + Send + 'static,
    {
        Self(Box::pin(future))
    }

    /// A command that immediately yields `msg`.
    pub fn msg(msg: Msg) -> Self {
        Self::new(async move { msg })
    }

    pub async fn run(self) -> Msg {
        self.0.await
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Command(..)")
    }
}

/// Translate a raw crossterm event. Key releases and repeats are dropped so
/// each press is handled once when keyboard enhancement is active.
pub fn translate(event: Event) -> Option<Msg> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            log::debug!("Key event: {:?} with modifiers {:?}", key.code, key.modifiers);
            Some(Msg::Key(key))
        }
        Event::Mouse(mouse) => Some(Msg::Mouse(mouse)),
        Event::Resize(width, height) => Some(Msg::Resize { width, height }),
        _ => None,
    }
}

/// Poll for an event without blocking.
pub fn poll_event_immediate() -> io::Result<Option<Msg>> {
    poll_event_timeout(Duration::ZERO)
}

/// Wait up to `timeout` for the next translatable event.
pub fn poll_event_timeout(timeout: Duration) -> io::Result<Option<Msg>> {
    if event::poll(timeout)? {
        Ok(translate(event::read()?))
    } else {
        Ok(None)
    }
}
