//! Shared colours and box chrome.
//!
//! Box styles carry the same borders and padding the renderer draws, so the
//! layout margins computed from them always match what ends up on screen.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Padding};

/// Chrome around a region: borders, padding and extra reserved rows.
#[derive(Debug, Clone)]
pub struct BoxStyle {
    pub borders: Borders,
    pub padding: Padding,
    /// Rows reserved below the content in addition to the frame.
    pub height: u16,
    pub border_style: Style,
}

impl BoxStyle {
    pub fn plain() -> Self {
        Self {
            borders: Borders::NONE,
            padding: Padding::ZERO,
            height: 0,
            border_style: Style::default(),
        }
    }

    /// Border rows plus vertical padding.
    pub fn vertical_frame_size(&self) -> u16 {
        let mut size = self.padding.top.saturating_add(self.padding.bottom);
        if self.borders.contains(Borders::TOP) {
            size = size.saturating_add(1);
        }
        if self.borders.contains(Borders::BOTTOM) {
            size = size.saturating_add(1);
        }
        size
    }

    pub fn block(&self) -> Block<'static> {
        Block::default()
            .borders(self.borders)
            .border_style(self.border_style)
            .padding(self.padding)
    }
}

#[derive(Debug, Clone)]
pub struct Styles {
    pub tabs: BoxStyle,
    pub selector_box: BoxStyle,
    pub readme_box: BoxStyle,

    pub tab_active: Style,
    pub tab_inactive: Style,

    pub item_title: Style,
    pub item_title_selected: Style,
    pub item_marker: Style,
    pub item_desc: Style,
    pub item_updated: Style,
    pub item_hint: Style,
    pub filter_prompt: Style,

    pub readme_text: Color,
    pub no_content: Style,
    pub status: Style,

    pub help_key: Style,
    pub help_desc: Style,
    pub help_separator: Style,

    pub app_title: Style,
    pub error_title: Style,
    pub error_body: Style,
}

impl Styles {
    /// Default palette with extra rows reserved under the selector and the
    /// readme boxes.
    pub fn with_heights(selector_height: u16, readme_height: u16) -> Self {
        let inactive = Color::Rgb(0x62, 0x62, 0x62);
        let accent = Color::Indexed(62);
        Self {
            tabs: BoxStyle::plain(),
            selector_box: BoxStyle {
                height: selector_height,
                ..BoxStyle::plain()
            },
            readme_box: BoxStyle {
                borders: Borders::ALL,
                padding: Padding::horizontal(1),
                height: readme_height,
                border_style: Style::default().fg(inactive),
            },

            tab_active: Style::default()
                .fg(Color::Indexed(230))
                .bg(accent)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(inactive).add_modifier(Modifier::BOLD),

            item_title: Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
            item_title_selected: Style::default()
                .fg(Color::Indexed(212))
                .add_modifier(Modifier::BOLD),
            item_marker: Style::default().fg(Color::Indexed(212)),
            item_desc: Style::default().fg(Color::DarkGray),
            item_updated: Style::default().fg(Color::DarkGray),
            item_hint: Style::default().fg(inactive),
            filter_prompt: Style::default().fg(Color::Indexed(212)),

            readme_text: Color::Gray,
            no_content: Style::default().fg(inactive).add_modifier(Modifier::ITALIC),
            status: Style::default().fg(inactive),

            help_key: Style::default().fg(Color::Gray),
            help_desc: Style::default().fg(Color::DarkGray),
            help_separator: Style::default().fg(inactive),

            app_title: Style::default()
                .fg(Color::Indexed(230))
                .bg(accent)
                .add_modifier(Modifier::BOLD),
            error_title: Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
            error_body: Style::default().fg(Color::Red),
        }
    }
}

impl Default for Styles {
    fn default() -> Self {
        Self::with_heights(0, 0)
    }
}
