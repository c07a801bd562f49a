//! # Core Listing Logic
//!
//! Everything here is independent of the terminal UI.
//!
//! ```text
//!   config ──► access ──┐
//!                       ├──► listing::build_items ──► Listing
//!   repo (sources) ─────┘
//! ```
//!
//! ## Modules
//!
//! - [`config`]: file/env/CLI configuration layering
//! - [`access`]: access levels, public keys and the `AccessPolicy` seam
//! - [`repo`]: the `Repository` / `RepositorySource` backend contract
//! - [`listing`]: merging configured and discovered repositories

pub mod access;
pub mod config;
pub mod listing;
pub mod repo;
