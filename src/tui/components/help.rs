//! # Help Footer
//!
//! Transient render wrapper: built each frame around whatever implements
//! [`HelpKeyMap`], in either the one-line short form or the columned full
//! form.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::tui::component::HelpKeyMap;
use crate::tui::keymap::KeyBinding;
use crate::tui::styles::Styles;

const SHORT_SEPARATOR: &str = " • ";
const COLUMN_GAP: &str = "    ";

pub struct HelpView<'a> {
    styles: &'a Styles,
    keymap: &'a dyn HelpKeyMap,
    show_all: bool,
}

impl<'a> HelpView<'a> {
    pub fn new(styles: &'a Styles, keymap: &'a dyn HelpKeyMap, show_all: bool) -> Self {
        Self {
            styles,
            keymap,
            show_all,
        }
    }

    /// Rows needed to draw this help.
    pub fn height(&self) -> u16 {
        if self.show_all {
            let rows = self
                .keymap
                .full_help()
                .iter()
                .map(Vec::len)
                .max()
                .unwrap_or(0);
            u16::try_from(rows).unwrap_or(u16::MAX).max(1)
        } else {
            1
        }
    }

    pub fn lines(&self) -> Vec<Line<'static>> {
        if self.show_all {
            self.full_lines()
        } else {
            vec![self.short_line()]
        }
    }

    fn short_line(&self) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, binding) in self.keymap.short_help().iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(SHORT_SEPARATOR, self.styles.help_separator));
            }
            let help = binding.help();
            spans.push(Span::styled(help.key, self.styles.help_key));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(help.desc, self.styles.help_desc));
        }
        Line::from(spans)
    }

    fn full_lines(&self) -> Vec<Line<'static>> {
        let columns: Vec<Vec<KeyBinding>> = self
            .keymap
            .full_help()
            .into_iter()
            .filter(|c| !c.is_empty())
            .collect();
        let widths: Vec<(usize, usize)> = columns
            .iter()
            .map(|col| {
                let key_w = col.iter().map(|b| b.help().key.width()).max().unwrap_or(0);
                let desc_w = col.iter().map(|b| b.help().desc.width()).max().unwrap_or(0);
                (key_w, desc_w)
            })
            .collect();
        let rows = columns.iter().map(Vec::len).max().unwrap_or(0);

        (0..rows)
            .map(|row| {
                let mut spans = Vec::new();
                for (c, col) in columns.iter().enumerate() {
                    let (key_w, desc_w) = widths[c];
                    if c > 0 {
                        spans.push(Span::raw(COLUMN_GAP));
                    }
                    match col.get(row) {
                        Some(binding) => {
                            let help = binding.help();
                            let key_pad = key_w - help.key.width();
                            let desc_pad = desc_w - help.desc.width();
                            spans.push(Span::styled(help.key, self.styles.help_key));
                            spans.push(Span::raw(" ".repeat(key_pad + 1)));
                            spans.push(Span::styled(help.desc, self.styles.help_desc));
                            spans.push(Span::raw(" ".repeat(desc_pad)));
                        }
                        None => spans.push(Span::raw(" ".repeat(key_w + 1 + desc_w))),
                    }
                }
                Line::from(spans)
            })
            .collect()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Paragraph::new(self.lines()), area);
    }
}
