//! # Repository Selector
//!
//! A paged list of [`DisplayItem`]s with a fuzzy filter.
//!
//! ```text
//! │ dotfiles                         Updated 3 days ago
//! │ My dotfiles
//! │ git clone ssh://localhost:23231/dotfiles
//!
//!   tool                             Updated 2 months ago
//!   ...
//! ```
//!
//! Filtering moves through three states:
//!
//! ```text
//! Unfiltered ──/──► Filtering ──enter──► FilterApplied
//!      ▲               │                      │
//!      └─────esc───────┴──────────esc─────────┘
//! ```

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::listing::DisplayItem;
use crate::tui::common::Common;
use crate::tui::component::Component;
use crate::tui::event::{Command, Msg};
use crate::tui::keymap::{KeyBind, KeyBinding, ch, key};

/// Rows taken by one item.
pub const ITEM_HEIGHT: u16 = 3;
/// Blank rows between items.
pub const ITEM_SPACING: u16 = 1;
/// Rows taken by the filter prompt and the gap under it.
const FILTER_ROWS: u16 = 2;

#[derive(Debug, Clone)]
pub struct SelectorKeyMap {
    pub cursor_up: KeyBinding,
    pub cursor_down: KeyBinding,
    pub next_page: KeyBinding,
    pub prev_page: KeyBinding,
    pub go_to_start: KeyBinding,
    pub go_to_end: KeyBinding,
    pub filter: KeyBinding,
    pub clear_filter: KeyBinding,
    pub cancel_while_filtering: KeyBinding,
    pub accept_while_filtering: KeyBinding,
}

impl Default for SelectorKeyMap {
    fn default() -> Self {
        use KeyCode::*;
        Self {
            cursor_up: KeyBinding::new(vec![key(Up), ch('k')]).with_help("↑/k", "up"),
            cursor_down: KeyBinding::new(vec![key(Down), ch('j')]).with_help("↓/j", "down"),
            next_page: KeyBinding::new(vec![key(Right), ch('l'), key(PageDown)])
                .with_help("→/l/pgdn", "next page"),
            prev_page: KeyBinding::new(vec![key(Left), ch('h'), key(PageUp)])
                .with_help("←/h/pgup", "prev page"),
            go_to_start: KeyBinding::new(vec![key(Home), ch('g')]).with_help("g/home", "go to start"),
            go_to_end: KeyBinding::new(vec![key(End), ch('G')]).with_help("G/end", "go to end"),
            filter: KeyBinding::new(vec![ch('/')]).with_help("/", "filter"),
            clear_filter: KeyBinding::new(vec![key(Esc)]).with_help("esc", "clear filter"),
            cancel_while_filtering: KeyBinding::new(vec![key(Esc)]).with_help("esc", "cancel"),
            accept_while_filtering: KeyBinding::new(vec![
                key(Enter),
                key(Tab),
                KeyBind::new(BackTab, KeyModifiers::SHIFT),
                key(Up),
                key(Down),
            ])
            .with_help("enter", "apply filter"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterState {
    Unfiltered,
    Filtering,
    FilterApplied,
}

pub struct Selector {
    common: Common,
    keymap: SelectorKeyMap,
    items: Vec<DisplayItem>,
    filter: String,
    filter_state: FilterState,
    /// Indices into `items` that match the filter, best match first.
    visible: Vec<usize>,
    /// Position within `visible`.
    cursor: usize,
    /// Fixed "now" for relative times; wall clock when unset.
    clock: Option<DateTime<Utc>>,
}

impl Selector {
    pub fn new(common: Common) -> Self {
        Self {
            common,
            keymap: SelectorKeyMap::default(),
            items: Vec::new(),
            filter: String::new(),
            filter_state: FilterState::Unfiltered,
            visible: Vec::new(),
            cursor: 0,
            clock: None,
        }
    }

    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.clock = Some(now);
        self
    }

    pub fn size(&self) -> (u16, u16) {
        (self.common.width, self.common.height)
    }

    pub fn keymap(&self) -> &SelectorKeyMap {
        &self.keymap
    }

    pub fn set_items(&mut self, items: Vec<DisplayItem>) {
        self.items = items;
        self.refilter();
    }

    pub fn items(&self) -> &[DisplayItem] {
        &self.items
    }

    pub fn visible_items(&self) -> Vec<&DisplayItem> {
        self.visible.iter().map(|&i| &self.items[i]).collect()
    }

    pub fn selected_item(&self) -> Option<&DisplayItem> {
        self.visible.get(self.cursor).map(|&i| &self.items[i])
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn filter_value(&self) -> &str {
        &self.filter
    }

    pub fn filter_state(&self) -> FilterState {
        self.filter_state
    }

    /// True while the filter prompt is taking input.
    pub fn is_filtering(&self) -> bool {
        self.filter_state == FilterState::Filtering
    }

    /// Clear the filter and move the cursor back to the top.
    pub fn reset(&mut self) {
        self.filter.clear();
        self.filter_state = FilterState::Unfiltered;
        self.cursor = 0;
        self.refilter();
    }

    pub fn per_page(&self) -> usize {
        let rows = if self.filter_state == FilterState::Unfiltered {
            self.common.height
        } else {
            self.common.height.saturating_sub(FILTER_ROWS)
        };
        let per_page = (rows + ITEM_SPACING) / (ITEM_HEIGHT + ITEM_SPACING);
        usize::from(per_page.max(1))
    }

    pub fn page(&self) -> usize {
        self.cursor / self.per_page()
    }

    pub fn total_pages(&self) -> usize {
        self.visible.len().div_ceil(self.per_page()).max(1)
    }

    fn refilter(&mut self) {
        if self.filter.is_empty() {
            self.visible = (0..self.items.len()).collect();
        } else {
            let mut scored: Vec<(usize, i64)> = self
                .items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| fuzzy_score(&self.filter, &item.name).map(|s| (i, s)))
                .collect();
            // Stable: equal scores keep list order.
            scored.sort_by(|a, b| b.1.cmp(&a.1));
            self.visible = scored.into_iter().map(|(i, _)| i).collect();
        }
        self.cursor = self.cursor.min(self.visible.len().saturating_sub(1));
    }

    fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn cursor_down(&mut self) {
        if self.cursor + 1 < self.visible.len() {
            self.cursor += 1;
        }
    }

    fn next_page(&mut self) {
        let start = (self.page() + 1) * self.per_page();
        if start < self.visible.len() {
            self.cursor = start;
        }
    }

    fn prev_page(&mut self) {
        let page = self.page();
        if page > 0 {
            self.cursor = (page - 1) * self.per_page();
        }
    }

    fn handle_filter_key(&mut self, event: &KeyEvent) {
        if self.keymap.cancel_while_filtering.matches(event) {
            self.reset();
        } else if self.keymap.accept_while_filtering.matches(event) {
            self.filter_state = if self.filter.is_empty() {
                FilterState::Unfiltered
            } else {
                FilterState::FilterApplied
            };
        } else if event.code == KeyCode::Backspace {
            self.filter.pop();
            self.cursor = 0;
            self.refilter();
        } else if let KeyCode::Char(c) = event.code
            && !event.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            self.filter.push(c);
            self.cursor = 0;
            self.refilter();
        }
    }

    fn handle_key(&mut self, event: &KeyEvent) -> Vec<Command> {
        let k = &self.keymap;
        if k.filter.matches(event) {
            self.filter_state = FilterState::Filtering;
        } else if k.clear_filter.matches(event) && self.filter_state == FilterState::FilterApplied {
            self.reset();
        } else if k.cursor_up.matches(event) {
            self.cursor_up();
        } else if k.cursor_down.matches(event) {
            self.cursor_down();
        } else if k.next_page.matches(event) {
            self.next_page();
        } else if k.prev_page.matches(event) {
            self.prev_page();
        } else if k.go_to_start.matches(event) {
            self.cursor = 0;
        } else if k.go_to_end.matches(event) {
            self.cursor = self.visible.len().saturating_sub(1);
        } else if self.common.keymap.select.matches(event) {
            if let Some(item) = self.selected_item() {
                return vec![Command::msg(Msg::RepoChosen {
                    identity: item.identity.clone(),
                    hint: item.invocation_hint.clone(),
                })];
            }
        } else if self.common.keymap.copy.matches(event)
            && let Some(item) = self.selected_item()
        {
            return vec![Command::msg(Msg::Copy(item.invocation_hint.clone()))];
        }
        Vec::new()
    }

    fn render_item(&self, item: &DisplayItem, selected: bool, width: u16, now: DateTime<Utc>) -> Vec<Line<'static>> {
        let styles = &self.common.styles;
        let width = usize::from(width);
        let marker = if selected {
            Span::styled("│ ", styles.item_marker)
        } else {
            Span::raw("  ")
        };
        let inner = width.saturating_sub(2);

        let updated = item
            .last_update
            .map(|t| format!("Updated {}", relative_time(t, now)))
            .unwrap_or_default();
        let title_width = inner.saturating_sub(updated.width() + 1);
        let title = truncate(&item.name, title_width);
        let gap = inner.saturating_sub(title.width() + updated.width());
        let title_style = if selected {
            styles.item_title_selected
        } else {
            styles.item_title
        };

        vec![
            Line::from(vec![
                marker.clone(),
                Span::styled(title, title_style),
                Span::raw(" ".repeat(gap)),
                Span::styled(updated, styles.item_updated),
            ]),
            Line::from(vec![
                marker.clone(),
                Span::styled(truncate(&item.description, inner), styles.item_desc),
            ]),
            Line::from(vec![
                marker,
                Span::styled(truncate(&item.invocation_hint, inner), styles.item_hint),
            ]),
        ]
    }
}

impl Component for Selector {
    /// Soft reset: filter and cursor are cleared, items are kept.
    fn init(&mut self) -> Vec<Command> {
        self.reset();
        Vec::new()
    }

    fn update(&mut self, msg: &Msg) -> Vec<Command> {
        match msg {
            Msg::Key(event) if self.is_filtering() => {
                self.handle_filter_key(event);
                Vec::new()
            }
            Msg::Key(event) => self.handle_key(event),
            Msg::Mouse(mouse) => {
                match mouse.kind {
                    MouseEventKind::ScrollUp => self.cursor_up(),
                    MouseEventKind::ScrollDown => self.cursor_down(),
                    _ => {}
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let styles = &self.common.styles;
        let mut lines: Vec<Line<'static>> = Vec::new();

        if self.filter_state != FilterState::Unfiltered {
            let mut prompt = vec![
                Span::styled("Filter: ", styles.filter_prompt),
                Span::raw(self.filter.clone()),
            ];
            if self.is_filtering() {
                prompt.push(Span::styled("▏", styles.filter_prompt));
            }
            lines.push(Line::from(prompt));
            lines.push(Line::default());
        }

        if self.visible.is_empty() {
            let empty = if self.items.is_empty() {
                "No repositories."
            } else {
                "Nothing matched."
            };
            lines.push(Line::styled(empty, styles.no_content));
        } else {
            let now = self.clock.unwrap_or_else(Utc::now);
            let per_page = self.per_page();
            let start = self.page() * per_page;
            let end = (start + per_page).min(self.visible.len());
            for (pos, &index) in self.visible[start..end].iter().enumerate() {
                if pos > 0 {
                    lines.extend((0..ITEM_SPACING).map(|_| Line::default()));
                }
                let selected = start + pos == self.cursor;
                lines.extend(self.render_item(&self.items[index], selected, area.width, now));
            }
        }

        frame.render_widget(Paragraph::new(lines), area);
    }

    fn set_size(&mut self, width: u16, height: u16) {
        self.common.set_size(width, height);
    }
}

/// Case-insensitive subsequence match. Consecutive and word-start hits
/// score higher; `None` when `pattern` is not a subsequence of `text`.
pub fn fuzzy_score(pattern: &str, text: &str) -> Option<i64> {
    let text: Vec<char> = text.chars().flat_map(char::to_lowercase).collect();
    let mut score = 0i64;
    let mut pos = 0usize;
    let mut last: Option<usize> = None;
    for p in pattern.chars().flat_map(char::to_lowercase) {
        let found = text[pos..].iter().position(|&c| c == p)? + pos;
        score += 1;
        if last.is_some_and(|l| l + 1 == found) {
            score += 5;
        }
        if found == 0 || matches!(text[found - 1], ' ' | '-' | '_' | '/' | '.') {
            score += 3;
        }
        last = Some(found);
        pos = found + 1;
    }
    Some(score)
}

/// Cut `s` to at most `max` columns, ending in `…` when shortened.
pub fn truncate(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// "just now", "5 minutes ago", "3 days ago", ...
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    if secs < 60 {
        return "just now".to_string();
    }
    let (n, unit) = match secs {
        s if s < 3_600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s if s < 7 * 86_400 => (s / 86_400, "day"),
        s if s < 30 * 86_400 => (s / (7 * 86_400), "week"),
        s if s < 365 * 86_400 => (s / (30 * 86_400), "month"),
        s => (s / (365 * 86_400), "year"),
    };
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, drain, item, key, render_to_string};

    fn selector(names: &[&str], height: u16) -> Selector {
        let mut s = Selector::new(Common::default()).with_clock(at(10 * 86_400));
        s.set_size(60, height);
        s.set_items(names.iter().map(|n| item(n)).collect());
        s
    }

    fn type_str(s: &mut Selector, text: &str) {
        for c in text.chars() {
            s.update(&key(KeyCode::Char(c)));
        }
    }

    fn visible(s: &Selector) -> Vec<&str> {
        s.visible_items().iter().map(|i| i.identity.as_str()).collect()
    }

    #[test]
    fn test_cursor_moves_and_clamps() {
        let mut s = selector(&["a", "b", "c"], 40);
        s.update(&key(KeyCode::Up));
        assert_eq!(s.cursor(), 0);
        s.update(&key(KeyCode::Char('j')));
        s.update(&key(KeyCode::Down));
        s.update(&key(KeyCode::Down));
        assert_eq!(s.cursor(), 2);
        s.update(&key(KeyCode::Char('g')));
        assert_eq!(s.cursor(), 0);
        s.update(&key(KeyCode::End));
        assert_eq!(s.selected_item().unwrap().identity, "c");
    }

    #[test]
    fn test_paging() {
        // 8 rows fit two items: 3 + 1 + 3.
        let mut s = selector(&["a", "b", "c", "d", "e"], 8);
        assert_eq!(s.per_page(), 2);
        assert_eq!(s.total_pages(), 3);
        s.update(&key(KeyCode::PageDown));
        assert_eq!(s.cursor(), 2);
        s.update(&key(KeyCode::Char('l')));
        assert_eq!(s.cursor(), 4);
        s.update(&key(KeyCode::Right));
        assert_eq!(s.cursor(), 4);
        s.update(&key(KeyCode::Left));
        assert_eq!(s.cursor(), 2);
    }

    #[test]
    fn test_tiny_height_still_shows_one_per_page() {
        let s = selector(&["a", "b"], 1);
        assert_eq!(s.per_page(), 1);
    }

    #[test]
    fn test_filter_narrows_and_accepts() {
        let mut s = selector(&["dotfiles", "tool", "docs"], 40);
        s.update(&key(KeyCode::Char('/')));
        assert!(s.is_filtering());
        type_str(&mut s, "do");
        assert_eq!(visible(&s), vec!["dotfiles", "docs"]);

        s.update(&key(KeyCode::Enter));
        assert_eq!(s.filter_state(), FilterState::FilterApplied);
        assert!(!s.is_filtering());

        s.update(&key(KeyCode::Esc));
        assert_eq!(s.filter_state(), FilterState::Unfiltered);
        assert_eq!(visible(&s).len(), 3);
    }

    #[test]
    fn test_filter_cancel_restores_list() {
        let mut s = selector(&["dotfiles", "tool"], 40);
        s.update(&key(KeyCode::Char('/')));
        type_str(&mut s, "zzz");
        assert!(visible(&s).is_empty());
        s.update(&key(KeyCode::Esc));
        assert_eq!(s.filter_value(), "");
        assert_eq!(visible(&s), vec!["dotfiles", "tool"]);
    }

    #[test]
    fn test_filter_keys_are_text_not_navigation() {
        let mut s = selector(&["jk", "other"], 40);
        s.update(&key(KeyCode::Char('/')));
        type_str(&mut s, "jk");
        assert_eq!(s.filter_value(), "jk");
        assert_eq!(s.cursor(), 0);
        s.update(&key(KeyCode::Backspace));
        assert_eq!(s.filter_value(), "j");
    }

    #[test]
    fn test_reset_clears_filter_and_cursor() {
        let mut s = selector(&["a", "b", "c"], 40);
        s.update(&key(KeyCode::Down));
        s.update(&key(KeyCode::Char('/')));
        type_str(&mut s, "b");
        s.init();
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.filter_state(), FilterState::Unfiltered);
        assert_eq!(s.items().len(), 3);
    }

    #[tokio::test]
    async fn test_enter_chooses_and_c_copies() {
        let mut s = selector(&["a", "b"], 40);
        s.update(&key(KeyCode::Down));

        match drain(s.update(&key(KeyCode::Enter))).await.as_slice() {
            [Msg::RepoChosen { identity, hint }] => {
                assert_eq!(identity, "b");
                assert_eq!(hint, "git clone ssh://localhost:23231/b");
            }
            other => panic!("unexpected: {other:?}"),
        }
        match drain(s.update(&key(KeyCode::Char('c')))).await.as_slice() {
            [Msg::Copy(text)] => assert_eq!(text, "git clone ssh://localhost:23231/b"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_enter_on_empty_list_does_nothing() {
        let mut s = selector(&[], 40);
        assert!(s.update(&key(KeyCode::Enter)).is_empty());
    }

    #[test]
    fn test_fuzzy_score() {
        assert!(fuzzy_score("dtf", "dotfiles").is_some());
        assert!(fuzzy_score("xyz", "dotfiles").is_none());
        assert!(fuzzy_score("DOT", "dotfiles").is_some());
        assert!(fuzzy_score("dot", "dotfiles") > fuzzy_score("dot", "a-d-o-t"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("dotfiles", 5), "dotf…");
        assert_eq!(truncate("dotfiles", 0), "");
    }

    #[test]
    fn test_relative_time() {
        let now = at(400 * 86_400);
        assert_eq!(relative_time(now, now), "just now");
        assert_eq!(relative_time(at(400 * 86_400 - 120), now), "2 minutes ago");
        assert_eq!(relative_time(at(400 * 86_400 - 3_600), now), "1 hour ago");
        assert_eq!(relative_time(at(397 * 86_400), now), "3 days ago");
        assert_eq!(relative_time(at(0), now), "1 year ago");
    }

    #[test]
    fn test_render_shows_item_rows() {
        let mut s = selector(&["dotfiles"], 10);
        let out = render_to_string(&mut s, 60, 10);
        assert!(out.contains("│ dotfiles"));
        assert!(out.contains("git clone ssh://localhost:23231/dotfiles"));
    }

    #[test]
    fn test_render_empty_list() {
        let mut s = selector(&[], 10);
        assert!(render_to_string(&mut s, 40, 5).contains("No repositories."));
    }
}
