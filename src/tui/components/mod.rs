//! # TUI Components
//!
//! Widgets composed by pages.
//!
//! ### Stateful Components (message-driven)
//!
//! Implement [`Component`](crate::tui::component::Component), own their
//! state and emit follow-up messages as commands:
//! - `Tabs`: tab strip, emits `Msg::ActiveTab`
//! - `Selector`: paged, filterable repository list
//! - `ReadmeView`: scrollable README
//!
//! ### Transient Wrappers (props-based rendering)
//!
//! Built every frame from borrowed data:
//! - `HelpView`: short or full key help
//!
//! ```text
//! components/
//! ├── mod.rs       (this file)
//! ├── tabs.rs
//! ├── selector.rs
//! ├── readme.rs
//! └── help.rs
//! ```

pub mod help;
pub mod readme;
pub mod selector;
pub mod tabs;

pub use help::HelpView;
pub use readme::ReadmeView;
pub use selector::{FilterState, Selector};
pub use tabs::Tabs;
