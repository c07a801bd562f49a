//! Chrome arithmetic for the selection page.
//!
//! ```text
//! ┌ tabs frame + tabs height + 1 ┐  tab strip
//! │ 1                            │  gap
//! ├──────────────────────────────┤
//! │ box frame + box height       │  selector chrome
//! │   (+1 status line for readme)│
//! └──────────────────────────────┘
//! ```
//!
//! [`margins`] is what `set_size` subtracts; [`areas`] is what `render`
//! draws into. They are derived from the same styles and must agree.

use ratatui::layout::{Constraint, Layout, Rect};

use super::tab::ActiveTab;
use crate::tui::styles::{BoxStyle, Styles};

/// `(width_margin, height_margin)` for the content of `tab`.
pub fn margins(styles: &Styles, tab: ActiveTab) -> (u16, u16) {
    let wm = 0;
    let mut hm = styles
        .tabs
        .vertical_frame_size()
        .saturating_add(styles.tabs.height)
        .saturating_add(2);
    hm = match tab {
        ActiveTab::Selector => hm
            .saturating_add(styles.selector_box.vertical_frame_size())
            .saturating_add(styles.selector_box.height),
        ActiveTab::Readme => hm
            .saturating_add(styles.readme_box.vertical_frame_size())
            .saturating_add(styles.readme_box.height)
            .saturating_add(1),
    };
    (wm, hm)
}

/// Screen regions for one frame of the selection page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Areas {
    pub tabs: Rect,
    /// The whole box, chrome included.
    pub body: Rect,
    /// Where the active component draws.
    pub content: Rect,
    /// Readme scroll status line; zero-sized for the selector.
    pub status: Rect,
}

pub fn areas(styles: &Styles, tab: ActiveTab, area: Rect) -> Areas {
    let tabs_height = styles
        .tabs
        .vertical_frame_size()
        .saturating_add(styles.tabs.height)
        .saturating_add(1);
    let [tabs, _gap, body] = Layout::vertical([
        Constraint::Length(tabs_height),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(area);

    let boxed = match tab {
        ActiveTab::Selector => &styles.selector_box,
        ActiveTab::Readme => &styles.readme_box,
    };
    let inner = reserve_bottom(boxed.block().inner(body), boxed);

    let (content, status) = match tab {
        ActiveTab::Selector => (inner, Rect::new(inner.x, inner.bottom(), inner.width, 0)),
        ActiveTab::Readme => {
            let [content, status] =
                Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(inner);
            (content, status)
        }
    };
    Areas {
        tabs,
        body,
        content,
        status,
    }
}

fn reserve_bottom(inner: Rect, style: &BoxStyle) -> Rect {
    Rect {
        height: inner.height.saturating_sub(style.height),
        ..inner
    }
}
