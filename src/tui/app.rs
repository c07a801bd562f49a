//! # Shell
//!
//! Owns the page and the chrome around it: title bar, help footer, error
//! view and clipboard. Handles the keys that mean the same thing everywhere
//! (quit, help) before anything reaches the page.
//!
//! ```text
//! ┌ title ─────────────────────── status ┐
//! │                                       │
//! │ page (Selection)                      │
//! │                                       │
//! └ help (short / full) ──────────────────┘
//! ```

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{error, info};

use crate::tui::common::Common;
use crate::tui::component::Component;
use crate::tui::components::HelpView;
use crate::tui::event::{Command, Msg};
use crate::tui::selection::Selection;

/// Rows above the page: the title line and a gap.
pub const HEADER_ROWS: u16 = 2;

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Quit,
    Chosen { identity: String, hint: String },
}

pub struct App {
    pub(crate) common: Common,
    pub(crate) title: String,
    pub(crate) selection: Selection,
    pub(crate) show_full_help: bool,
    pub(crate) error: Option<String>,
    pub(crate) status: Option<String>,
    pending_copy: Option<String>,
    outcome: Option<Outcome>,
}

impl App {
    pub fn new(common: Common, title: impl Into<String>, selection: Selection, full_help: bool) -> Self {
        Self {
            common,
            title: title.into(),
            selection,
            show_full_help: full_help,
            error: None,
            status: None,
            pending_copy: None,
            outcome: None,
        }
    }

    pub fn init(&mut self) -> Vec<Command> {
        info!("Initializing selection page");
        self.selection.init()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn show_full_help(&self) -> bool {
        self.show_full_help
    }

    /// Set once the session should end.
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Text waiting to be written to the clipboard.
    pub fn take_copy(&mut self) -> Option<String> {
        self.pending_copy.take()
    }

    pub fn help_height(&self) -> u16 {
        HelpView::new(&self.common.styles, &self.selection, self.show_full_help).height()
    }

    /// Rows left for the page once header and help are drawn.
    pub fn page_height(&self) -> u16 {
        self.common
            .height
            .saturating_sub(HEADER_ROWS)
            .saturating_sub(self.help_height())
    }

    fn resize_page(&mut self) -> Vec<Command> {
        let msg = Msg::Resize {
            width: self.common.width,
            height: self.page_height(),
        };
        self.selection.update(&msg)
    }

    fn quit(&mut self) {
        self.outcome.get_or_insert(Outcome::Quit);
    }

    pub fn update(&mut self, msg: &Msg) -> Vec<Command> {
        if let Msg::Key(key) = msg {
            self.status = None;
            if self.error.is_some() || is_interrupt(key) {
                self.quit();
                return Vec::new();
            }
            let filtering = self.selection.is_filtering();
            if !filtering && self.common.keymap.quit.matches(key) {
                self.quit();
                return Vec::new();
            }
            if !filtering && self.common.keymap.help.matches(key) {
                self.show_full_help = !self.show_full_help;
                return self.resize_page();
            }
        }

        match msg {
            Msg::Resize { width, height } => {
                self.common.set_size(*width, *height);
                self.resize_page()
            }
            Msg::Fatal(text) => {
                error!("Fatal: {}", text);
                self.error = Some(text.clone());
                Vec::new()
            }
            Msg::Copy(text) => {
                info!("Copying {} bytes to clipboard", text.len());
                self.pending_copy = Some(text.clone());
                self.status = Some("Command copied to clipboard".to_string());
                Vec::new()
            }
            Msg::RepoChosen { identity, hint } => {
                info!("Repository chosen: {}", identity);
                self.outcome = Some(Outcome::Chosen {
                    identity: identity.clone(),
                    hint: hint.clone(),
                });
                Vec::new()
            }
            _ if self.error.is_some() => Vec::new(),
            _ => self.selection.update(msg),
        }
    }
}

fn is_interrupt(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::backend::memory::{MemoryRepo, MemorySource};
    use crate::core::access::AccessLevel;
    use crate::core::listing::Endpoint;
    use crate::test_support::{AllowAll, at, ctrl_key, drain, key};
    use crate::tui::selection::{ActiveTab, Loader};

    fn app() -> App {
        let mut source = MemorySource::new();
        source.add(MemoryRepo::new("alpha").committed_at(at(1)));
        source.add(MemoryRepo::new("beta").committed_at(at(2)));
        let loader = Loader {
            source: Arc::new(source),
            policy: Arc::new(AllowAll(AccessLevel::ReadOnly)),
            endpoint: Endpoint::new("git.example.com", 22),
            requester: None,
        };
        let common = Common::default();
        let mut app = App::new(common.clone(), "gitshelf", Selection::new(common, loader), false);
        app.update(&Msg::Resize {
            width: 80,
            height: 30,
        });
        app
    }

    async fn loaded() -> App {
        let mut app = app();
        for msg in drain(app.init()).await {
            app.update(&msg);
        }
        app
    }

    #[test]
    fn test_q_quits() {
        let mut app = app();
        app.update(&key(KeyCode::Char('q')));
        assert_eq!(app.outcome(), Some(&Outcome::Quit));
    }

    #[tokio::test]
    async fn test_q_while_filtering_is_text() {
        let mut app = loaded().await;
        app.update(&key(KeyCode::Char('/')));
        app.update(&key(KeyCode::Char('q')));
        assert_eq!(app.outcome(), None);
        assert_eq!(app.selection().selector().filter_value(), "q");

        app.update(&ctrl_key('c'));
        assert_eq!(app.outcome(), Some(&Outcome::Quit));
    }

    #[test]
    fn test_help_toggle_resizes_page() {
        let mut app = app();
        let short = app.selection().selector().size().1;
        app.update(&key(KeyCode::Char('?')));
        assert!(app.show_full_help());
        let full = app.selection().selector().size().1;
        assert!(full < short);
        assert_eq!(app.page_height(), 30 - HEADER_ROWS - app.help_height());
    }

    #[tokio::test]
    async fn test_enter_chooses_repository() {
        let mut app = loaded().await;
        app.update(&key(KeyCode::Down));
        for msg in drain(app.update(&key(KeyCode::Enter))).await {
            app.update(&msg);
        }
        assert_eq!(
            app.outcome(),
            Some(&Outcome::Chosen {
                identity: "beta".to_string(),
                hint: "git clone ssh://git.example.com/beta".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_copy_sets_clipboard_and_status() {
        let mut app = loaded().await;
        for msg in drain(app.update(&key(KeyCode::Char('c')))).await {
            app.update(&msg);
        }
        assert_eq!(app.take_copy().as_deref(), Some("git clone ssh://git.example.com/alpha"));
        assert!(app.status().is_some());
        assert_eq!(app.take_copy(), None);

        app.update(&key(KeyCode::Down));
        assert!(app.status().is_none());
    }

    #[test]
    fn test_fatal_shows_error_then_any_key_quits() {
        let mut app = app();
        app.update(&Msg::Fatal("boom".to_string()));
        assert_eq!(app.error(), Some("boom"));
        assert_eq!(app.outcome(), None);

        app.update(&Msg::ActiveTab(1));
        assert_eq!(app.selection().active_tab(), ActiveTab::Selector);

        app.update(&key(KeyCode::Char('x')));
        assert_eq!(app.outcome(), Some(&Outcome::Quit));
    }
}
