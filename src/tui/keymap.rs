//! Key bindings with help text.
//!
//! A [`KeyBinding`] groups the physical keys that trigger one action together
//! with the `key`/`description` pair shown in the help footer.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// One physical key plus modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Only CTRL/ALT are compared for characters and back-tab, since
    /// terminals disagree on whether `G`, `?` or shift-tab carry SHIFT.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        let mask = match self.code {
            KeyCode::Char(_) | KeyCode::BackTab => KeyModifiers::CONTROL | KeyModifiers::ALT,
            _ => KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT,
        };
        self.code == event.code && (self.modifiers & mask) == (event.modifiers & mask)
    }
}

/// Help text shown for a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Help {
    pub key: &'static str,
    pub desc: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    keys: Vec<KeyBind>,
    help: Help,
}

impl KeyBinding {
    pub fn new(keys: Vec<KeyBind>) -> Self {
        Self {
            keys,
            help: Help { key: "", desc: "" },
        }
    }

    pub fn with_help(mut self, key: &'static str, desc: &'static str) -> Self {
        self.help = Help { key, desc };
        self
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.keys.iter().any(|k| k.matches(event))
    }

    pub fn help(&self) -> Help {
        self.help
    }

    pub fn keys(&self) -> &[KeyBind] {
        &self.keys
    }
}

pub fn key(code: KeyCode) -> KeyBind {
    KeyBind::new(code, KeyModifiers::NONE)
}

pub fn ch(c: char) -> KeyBind {
    key(KeyCode::Char(c))
}

pub fn ctrl(c: char) -> KeyBind {
    KeyBind::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

/// Bindings shared by every page, owned by the shell.
#[derive(Debug, Clone)]
pub struct KeyMap {
    pub select: KeyBinding,
    pub copy: KeyBinding,
    pub up_down: KeyBinding,
    pub section: KeyBinding,
    pub back: KeyBinding,
    pub help: KeyBinding,
    pub quit: KeyBinding,
}

impl Default for KeyMap {
    fn default() -> Self {
        use KeyCode::*;
        Self {
            select: KeyBinding::new(vec![key(Enter)]).with_help("enter", "select"),
            copy: KeyBinding::new(vec![ch('c')]).with_help("c", "copy command"),
            up_down: KeyBinding::new(vec![key(Up), key(Down), ch('k'), ch('j')])
                .with_help("↑↓", "navigate"),
            section: KeyBinding::new(vec![key(Tab), KeyBind::new(BackTab, KeyModifiers::SHIFT)])
                .with_help("tab", "section"),
            back: KeyBinding::new(vec![key(Esc)]).with_help("esc", "back"),
            help: KeyBinding::new(vec![ch('?')]).with_help("?", "toggle help"),
            quit: KeyBinding::new(vec![ch('q'), ctrl('c')]).with_help("q", "quit"),
        }
    }
}
