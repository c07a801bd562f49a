//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use chrono::{DateTime, TimeZone, Utc};
use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::Terminal;
use ratatui::backend::TestBackend;

use crate::core::access::{AccessLevel, AccessPolicy, PublicKey};
use crate::core::listing::DisplayItem;
use crate::tui::component::Component;
use crate::tui::event::{Command, Msg};

/// A UTC timestamp `secs` after the epoch.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

pub fn identities(items: &[DisplayItem]) -> Vec<&str> {
    items.iter().map(|i| i.identity.as_str()).collect()
}

/// A display item as the listing would build it for `localhost:23231`.
pub fn item(name: &str) -> DisplayItem {
    DisplayItem {
        identity: name.to_string(),
        name: name.to_string(),
        description: format!("About {name}"),
        last_update: Some(at(0)),
        invocation_hint: format!("git clone ssh://localhost:23231/{name}"),
    }
}

/// Grants the same level to everyone on every repository.
pub struct AllowAll(pub AccessLevel);

impl AccessPolicy for AllowAll {
    fn evaluate(&self, _repo: &str, _requester: Option<&PublicKey>) -> AccessLevel {
        self.0
    }
}

pub fn key(code: KeyCode) -> Msg {
    Msg::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

pub fn ctrl_key(c: char) -> Msg {
    Msg::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
}

fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Msg {
    Msg::Mouse(MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

pub fn left_click(column: u16, row: u16) -> Msg {
    mouse(MouseEventKind::Down(MouseButton::Left), column, row)
}

pub fn scroll_down() -> Msg {
    mouse(MouseEventKind::ScrollDown, 0, 0)
}

/// Run every command and collect the messages they yield.
pub async fn drain(cmds: Vec<Command>) -> Vec<Msg> {
    futures::future::join_all(cmds.into_iter().map(Command::run)).await
}

/// Render a component on a `width`×`height` test terminal and return the
/// screen as text, one line per row.
pub fn render_to_string(component: &mut dyn Component, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|f| component.render(f, f.area())).unwrap();
    buffer_text(terminal.backend().buffer())
}

pub fn buffer_text(buffer: &ratatui::buffer::Buffer) -> String {
    let area = buffer.area;
    (area.top()..area.bottom())
        .map(|y| {
            (area.left()..area.right())
                .map(|x| buffer[(x, y)].symbol())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
