//! # Selection Page
//!
//! The landing page: a tab strip over two mutually exclusive views, the
//! repository [`Selector`] and the About [`ReadmeView`].
//!
//! ```text
//!            ┌──────────── Msg ────────────┐
//!            ▼                             │
//!   Resize ──► relayout ──► selector + readme
//!   Key/Mouse ─► back? ── reload           │
//!            └─► tabs ──► Msg::ActiveTab ──┘
//!   then ─────► active view only
//! ```
//!
//! On `init` (and on the back key) the page returns a command that runs the
//! listing aggregation off the UI thread; its result re-enters as
//! [`Msg::Listing`].

mod help;
pub mod layout;
pub mod tab;

use std::sync::Arc;

use log::{debug, error, info};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::widgets::Paragraph;

use crate::core::access::{AccessPolicy, PublicKey};
use crate::core::listing::{Endpoint, Listing, build_items};
use crate::core::repo::RepositorySource;
use crate::tui::common::Common;
use crate::tui::component::Component;
use crate::tui::components::{ReadmeView, Selector, Tabs};
use crate::tui::event::{Command, Msg};

pub use tab::ActiveTab;

/// Everything the aggregation needs, cheap to clone into a task.
#[derive(Clone)]
pub struct Loader {
    pub source: Arc<dyn RepositorySource>,
    pub policy: Arc<dyn AccessPolicy>,
    pub endpoint: Endpoint,
    pub requester: Option<PublicKey>,
}

impl Loader {
    /// Run the aggregation on the blocking pool, tagging the result with
    /// `generation`.
    pub fn command(&self, generation: u64) -> Command {
        let loader = self.clone();
        Command::new(async move {
            let result = tokio::task::spawn_blocking(move || {
                build_items(
                    loader.source.as_ref(),
                    loader.policy.as_ref(),
                    &loader.endpoint,
                    loader.requester.as_ref(),
                )
            })
            .await;
            match result {
                Ok(Ok(listing)) => Msg::Listing {
                    generation,
                    listing,
                },
                Ok(Err(e)) => {
                    error!("Failed to load repositories: {}", e);
                    Msg::Fatal(e.to_string())
                }
                Err(e) => {
                    error!("Repository loader task failed: {}", e);
                    Msg::Fatal(format!("repository loader failed: {e}"))
                }
            }
        })
    }
}

pub struct Selection {
    common: Common,
    loader: Loader,
    tabs: Tabs,
    selector: Selector,
    readme: ReadmeView,
    active: ActiveTab,
    /// Bumped on every reload; older listings are dropped.
    generation: u64,
}

impl Selection {
    pub fn new(common: Common, loader: Loader) -> Self {
        Self {
            tabs: Tabs::new(common.clone(), ActiveTab::labels()),
            selector: Selector::new(common.clone()),
            readme: ReadmeView::new(common.clone()),
            active: ActiveTab::default(),
            generation: 0,
            common,
            loader,
        }
    }

    pub fn active_tab(&self) -> ActiveTab {
        self.active
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn readme(&self) -> &ReadmeView {
        &self.readme
    }

    pub fn tabs(&self) -> &Tabs {
        &self.tabs
    }

    /// True while keystrokes are text for the selector's filter.
    pub fn is_filtering(&self) -> bool {
        self.active == ActiveTab::Selector && self.selector.is_filtering()
    }

    pub fn margins(&self) -> (u16, u16) {
        layout::margins(&self.common.styles, self.active)
    }

    /// Soft-reset the selector and rebuild the listing.
    fn reload(&mut self) -> Vec<Command> {
        let mut cmds = self.selector.init();
        cmds.extend(self.readme.init());
        self.generation += 1;
        cmds.push(self.loader.command(self.generation));
        cmds
    }

    fn relayout(&mut self) {
        self.set_size(self.common.width, self.common.height);
    }

    fn install(&mut self, generation: u64, listing: &Listing) {
        if generation != self.generation {
            debug!(
                "Dropping stale listing {} (current {})",
                generation, self.generation
            );
            return;
        }
        info!("Installing {} repositories", listing.items.len());
        self.selector.set_items(listing.items.clone());
        match &listing.about {
            Some(readme) => self.readme.set_content(readme.content.clone(), readme.path.clone()),
            None => self.readme.set_content("", ""),
        }
    }

    fn set_active(&mut self, index: usize) {
        match ActiveTab::try_from(index) {
            Ok(tab) => {
                debug!("Active tab: {}", tab);
                self.active = tab;
                self.tabs.select(tab.index());
                self.relayout();
            }
            Err(e) => debug!("Ignoring tab change: {}", e),
        }
    }
}

impl Component for Selection {
    fn init(&mut self) -> Vec<Command> {
        self.reload()
    }

    fn update(&mut self, msg: &Msg) -> Vec<Command> {
        let mut cmds = Vec::new();
        match msg {
            Msg::Resize { width, height } => {
                self.set_size(*width, *height);
                cmds.extend(self.readme.update(msg));
                cmds.extend(self.selector.update(msg));
            }
            Msg::Key(key) if self.common.keymap.back.matches(key) => {
                cmds.extend(self.reload());
            }
            Msg::Key(_) | Msg::Mouse(_) => cmds.extend(self.tabs.update(msg)),
            Msg::ActiveTab(index) => self.set_active(*index),
            Msg::Listing {
                generation,
                listing,
            } => self.install(*generation, listing),
            _ => {}
        }
        match self.active {
            ActiveTab::Readme => cmds.extend(self.readme.update(msg)),
            ActiveTab::Selector => cmds.extend(self.selector.update(msg)),
        }
        cmds
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let styles = Arc::clone(&self.common.styles);
        let areas = layout::areas(&styles, self.active, area);

        let tabs_block = styles.tabs.block();
        let tabs_inner = tabs_block.inner(areas.tabs);
        frame.render_widget(tabs_block, areas.tabs);
        self.tabs.render(frame, tabs_inner);

        match self.active {
            ActiveTab::Selector => {
                frame.render_widget(styles.selector_box.block(), areas.body);
                self.selector.render(frame, areas.content);
            }
            ActiveTab::Readme => {
                frame.render_widget(styles.readme_box.block(), areas.body);
                self.readme.render(frame, areas.content);
                let status = format!("☰ {:.0}%", self.readme.scroll_percent() * 100.0);
                frame.render_widget(
                    Paragraph::new(status)
                        .alignment(Alignment::Right)
                        .style(styles.status),
                    areas.status,
                );
            }
        }
    }

    fn set_size(&mut self, width: u16, height: u16) {
        self.common.set_size(width, height);
        let (wm, hm) = self.margins();
        let content_width = width.saturating_sub(wm);
        let content_height = height.saturating_sub(hm);
        self.tabs.set_size(width, content_height);
        self.selector.set_size(content_width, content_height);
        self.readme.set_size(content_width, content_height);
    }
}
