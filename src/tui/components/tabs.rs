//! # Tab Strip
//!
//! A single row of tab headers. `tab` / `shift-tab` cycle through them and a
//! left click selects the header under the cursor. Every change is announced
//! with [`Msg::ActiveTab`] so the owning page can switch views.

use crossterm::event::{KeyCode, MouseButton, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use crate::tui::common::Common;
use crate::tui::component::Component;
use crate::tui::event::{Command, Msg};

pub struct Tabs {
    common: Common,
    labels: Vec<String>,
    active: usize,
    /// Screen columns `[start, end)` of each header from the last render.
    hit_boxes: Vec<(u16, u16)>,
    row: Option<u16>,
}

impl Tabs {
    pub fn new(common: Common, labels: Vec<String>) -> Self {
        Self {
            common,
            labels,
            active: 0,
            hit_boxes: Vec::new(),
            row: None,
        }
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Move the highlight without announcing it.
    pub fn select(&mut self, index: usize) {
        if index < self.labels.len() {
            self.active = index;
        }
    }

    /// Select a tab and announce it. Out-of-range indices are ignored.
    pub fn set_active(&mut self, index: usize) -> Vec<Command> {
        if index >= self.labels.len() {
            return Vec::new();
        }
        self.active = index;
        vec![Command::msg(Msg::ActiveTab(index))]
    }

    fn header(label: &str) -> String {
        format!(" {label} ")
    }

    fn hit(&self, column: u16) -> Option<usize> {
        self.hit_boxes
            .iter()
            .position(|&(start, end)| column >= start && column < end)
    }
}

impl Component for Tabs {
    fn update(&mut self, msg: &Msg) -> Vec<Command> {
        if self.labels.is_empty() {
            return Vec::new();
        }
        match msg {
            Msg::Key(key) if self.common.keymap.section.matches(key) => {
                let count = self.labels.len();
                let next = if key.code == KeyCode::BackTab {
                    (self.active + count - 1) % count
                } else {
                    (self.active + 1) % count
                };
                self.set_active(next)
            }
            Msg::Mouse(mouse)
                if mouse.kind == MouseEventKind::Down(MouseButton::Left)
                    && self.row == Some(mouse.row) =>
            {
                match self.hit(mouse.column) {
                    Some(index) => self.set_active(index),
                    None => Vec::new(),
                }
            }
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let styles = &self.common.styles;
        let mut spans = Vec::with_capacity(self.labels.len());
        self.hit_boxes.clear();
        let mut x = area.x;
        for (i, label) in self.labels.iter().enumerate() {
            let header = Self::header(label);
            let width = u16::try_from(header.width()).unwrap_or(u16::MAX);
            self.hit_boxes.push((x, x.saturating_add(width)));
            x = x.saturating_add(width);
            let style = if i == self.active {
                styles.tab_active
            } else {
                styles.tab_inactive
            };
            spans.push(Span::styled(header, style));
        }
        self.row = (area.height > 0).then_some(area.y);
        frame.render_widget(Line::from(spans), area);
    }

    fn set_size(&mut self, width: u16, height: u16) {
        self.common.set_size(width, height);
    }
}
