//! # Readme Viewer
//!
//! Scrollable, read-only view of a README. The rendered text is cached per
//! content; the wrapped line count is cached per width and refreshed during
//! `render`, which is the only place the real viewport width is known.

use crossterm::event::{KeyCode, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Text;
use ratatui::widgets::{Paragraph, Wrap};

use crate::tui::common::Common;
use crate::tui::component::Component;
use crate::tui::event::{Command, Msg};
use crate::tui::keymap::{KeyBinding, ch, ctrl, key};
use crate::tui::markdown;

const WHEEL_STEP: usize = 3;

#[derive(Debug, Clone)]
pub struct ReadmeKeyMap {
    pub down: KeyBinding,
    pub up: KeyBinding,
    pub page_down: KeyBinding,
    pub page_up: KeyBinding,
    pub half_page_down: KeyBinding,
    pub half_page_up: KeyBinding,
}

impl Default for ReadmeKeyMap {
    fn default() -> Self {
        use KeyCode::*;
        Self {
            down: KeyBinding::new(vec![key(Down), ch('j')]).with_help("↓/j", "down"),
            up: KeyBinding::new(vec![key(Up), ch('k')]).with_help("↑/k", "up"),
            page_down: KeyBinding::new(vec![key(PageDown), ch(' '), ch('f')])
                .with_help("f/pgdn", "page down"),
            page_up: KeyBinding::new(vec![key(PageUp), ch('b')]).with_help("b/pgup", "page up"),
            half_page_down: KeyBinding::new(vec![ch('d'), ctrl('d')])
                .with_help("d", "½ page down"),
            half_page_up: KeyBinding::new(vec![ch('u'), ctrl('u')]).with_help("u", "½ page up"),
        }
    }
}

pub struct ReadmeView {
    common: Common,
    keymap: ReadmeKeyMap,
    content: String,
    path: String,
    text: Text<'static>,
    offset: usize,
    /// Wrapped line count and the width it was computed for.
    total_lines: usize,
    wrap_width: u16,
}

impl ReadmeView {
    pub fn new(common: Common) -> Self {
        Self {
            common,
            keymap: ReadmeKeyMap::default(),
            content: String::new(),
            path: String::new(),
            text: Text::default(),
            offset: 0,
            total_lines: 0,
            wrap_width: 0,
        }
    }

    pub fn size(&self) -> (u16, u16) {
        (self.common.width, self.common.height)
    }

    pub fn keymap(&self) -> &ReadmeKeyMap {
        &self.keymap
    }

    /// Replace the content; `path` selects markdown or source highlighting.
    pub fn set_content(&mut self, content: impl Into<String>, path: impl Into<String>) {
        self.content = content.into();
        self.path = path.into();
        self.text = markdown::render_readme(&self.content, &self.path, self.common.styles.readme_text);
        self.offset = 0;
        self.wrap_width = 0;
        self.measure(self.common.width);
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Fraction scrolled, `0.0..=1.0`. Content that fits is fully scrolled.
    pub fn scroll_percent(&self) -> f64 {
        let max = self.max_offset();
        if max == 0 {
            1.0
        } else {
            (self.offset as f64 / max as f64).clamp(0.0, 1.0)
        }
    }

    fn paragraph(&self) -> Paragraph<'static> {
        Paragraph::new(self.text.clone()).wrap(Wrap { trim: false })
    }

    fn measure(&mut self, width: u16) {
        if width == 0 || width == self.wrap_width {
            return;
        }
        self.total_lines = self.paragraph().line_count(width);
        self.wrap_width = width;
        self.offset = self.offset.min(self.max_offset());
    }

    fn viewport(&self) -> usize {
        usize::from(self.common.height)
    }

    fn max_offset(&self) -> usize {
        self.total_lines.saturating_sub(self.viewport())
    }

    fn scroll_down(&mut self, n: usize) {
        self.offset = (self.offset + n).min(self.max_offset());
    }

    fn scroll_up(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
    }
}

impl Component for ReadmeView {
    fn update(&mut self, msg: &Msg) -> Vec<Command> {
        let page = self.viewport().max(1);
        match msg {
            Msg::Key(event) => {
                let k = &self.keymap;
                if k.down.matches(event) {
                    self.scroll_down(1);
                } else if k.up.matches(event) {
                    self.scroll_up(1);
                } else if k.page_down.matches(event) {
                    self.scroll_down(page);
                } else if k.page_up.matches(event) {
                    self.scroll_up(page);
                } else if k.half_page_down.matches(event) {
                    self.scroll_down((page / 2).max(1));
                } else if k.half_page_up.matches(event) {
                    self.scroll_up((page / 2).max(1));
                }
            }
            Msg::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => self.scroll_down(WHEEL_STEP),
                MouseEventKind::ScrollUp => self.scroll_up(WHEEL_STEP),
                _ => {}
            },
            _ => {}
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if self.content.trim().is_empty() {
            let empty = Paragraph::new("No readme found.").style(self.common.styles.no_content);
            frame.render_widget(empty, area);
            return;
        }
        self.common.height = area.height;
        self.measure(area.width);
        self.offset = self.offset.min(self.max_offset());
        let scroll = u16::try_from(self.offset).unwrap_or(u16::MAX);
        frame.render_widget(self.paragraph().scroll((scroll, 0)), area);
    }

    fn set_size(&mut self, width: u16, height: u16) {
        self.common.set_size(width, height);
        self.measure(width);
        self.offset = self.offset.min(self.max_offset());
    }
}
