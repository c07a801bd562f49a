//! # Repository Source Contract
//!
//! The storage backend is an external collaborator. This module defines the
//! seam it plugs into: a [`RepositorySource`] hands out [`Repository`]
//! handles, each exposing identity, privacy, description, the latest commit
//! and an optional README.
//!
//! Implementations live in `crate::backend`.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Errors a backend may report.
/// Whether a given failure is fatal is decided by the caller, not here.
#[derive(Debug)]
pub enum SourceError {
    /// No repository with that identity.
    NotFound(String),
    /// Filesystem or transport failure.
    Io(std::io::Error),
    /// The repository exists but has no resolvable commit.
    NoCommits(String),
    /// Backend metadata could not be parsed.
    Malformed(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::NotFound(repo) => write!(f, "repository not found: {repo}"),
            SourceError::Io(e) => write!(f, "I/O error: {e}"),
            SourceError::NoCommits(repo) => write!(f, "no commits in {repo}"),
            SourceError::Malformed(msg) => write!(f, "malformed repository data: {msg}"),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SourceError {
    fn from(e: std::io::Error) -> Self {
        SourceError::Io(e)
    }
}

/// Metadata of a repository's latest commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub id: String,
    pub committed_at: Option<DateTime<Utc>>,
    pub authored_at: Option<DateTime<Utc>>,
}

impl CommitInfo {
    /// Committer time, or author time when the committer time is zero.
    ///
    /// "Zero" means absent or the Unix epoch.
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        match self.committed_at {
            Some(t) if !is_zero_time(t) => Some(t),
            _ => self.authored_at,
        }
    }
}

fn is_zero_time(t: DateTime<Utc>) -> bool {
    t.timestamp() == 0 && t.timestamp_subsec_nanos() == 0
}

/// README text together with the path it was read from. The path drives
/// how the viewer renders it (markdown vs. highlighted source).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Readme {
    pub content: String,
    pub path: String,
}

/// A repository handle produced by a [`RepositorySource`].
pub trait Repository: Send + Sync {
    /// Unique identity (path-like name) used as the merge key.
    fn name(&self) -> &str;

    fn is_private(&self) -> bool;

    fn description(&self) -> Option<String> {
        None
    }

    fn latest_commit(&self) -> Result<CommitInfo, SourceError>;

    fn readme(&self) -> Option<Readme>;
}

/// A pinned repository from static configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfiguredRepo {
    /// Identity of the backing repository.
    pub repo: String,
    /// Display name; falls back to `repo`.
    pub name: Option<String>,
    pub private: bool,
    pub note: Option<String>,
}

impl ConfiguredRepo {
    pub fn new(repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            name: None,
            private: false,
            note: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.repo)
    }
}

/// Supplies the two repository enumerations.
pub trait RepositorySource: Send + Sync {
    /// Pinned repositories, in configured order.
    fn configured(&self) -> Vec<ConfiguredRepo>;

    /// Resolve a configured identity to a repository handle.
    fn open(&self, repo: &str) -> Result<Arc<dyn Repository>, SourceError>;

    /// Every repository found in storage, in discovery order.
    fn discovered(&self) -> Result<Vec<Arc<dyn Repository>>, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_last_update_prefers_committer() {
        let commit = CommitInfo {
            id: "abc".to_string(),
            committed_at: Some(at(2_000)),
            authored_at: Some(at(1_000)),
        };
        assert_eq!(commit.last_update(), Some(at(2_000)));
    }

    #[test]
    fn test_last_update_falls_back_on_zero_committer() {
        let commit = CommitInfo {
            id: "abc".to_string(),
            committed_at: Some(at(0)),
            authored_at: Some(at(1_000)),
        };
        assert_eq!(commit.last_update(), Some(at(1_000)));

        let missing = CommitInfo {
            committed_at: None,
            ..commit
        };
        assert_eq!(missing.last_update(), Some(at(1_000)));
    }

    #[test]
    fn test_configured_display_name() {
        let mut entry = ConfiguredRepo::new("dotfiles");
        assert_eq!(entry.display_name(), "dotfiles");
        entry.name = Some("Dotfiles".to_string());
        assert_eq!(entry.display_name(), "Dotfiles");
    }

    #[test]
    fn test_source_error_display() {
        let err = SourceError::NotFound("x".to_string());
        assert_eq!(err.to_string(), "repository not found: x");
    }
}
