//! # Repository Listing
//!
//! Builds the list of repositories a viewer may browse by merging the
//! configured (pinned) entries with the ones discovered in storage.
//!
//! ```text
//! configured ──┐                      ┌── items (configured first, then
//!              ├── filter ── merge ───┤    discovery order, one per identity)
//! discovered ──┘                      └── about README ("config" repo)
//! ```
//!
//! Configured entries are best effort: one that cannot be opened is skipped.
//! Discovered entries are authoritative: a commit that cannot be resolved
//! fails the whole listing.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::core::access::{AccessPolicy, PublicKey};
use crate::core::repo::{Readme, RepositorySource, SourceError};

/// Identity of the repository whose README is shown on the About tab.
pub const ABOUT_REPO: &str = "config";

/// Where the server is reachable. Used to build clone commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `git clone ssh://host[:port]/repo`. The port is left out when it is 22.
    pub fn clone_hint(&self, repo: &str) -> String {
        if self.port == 22 {
            format!("git clone ssh://{}/{}", self.host, repo)
        } else {
            format!("git clone ssh://{}:{}/{}", self.host, self.port, repo)
        }
    }
}

/// One row of the repository list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayItem {
    pub identity: String,
    pub name: String,
    pub description: String,
    pub last_update: Option<DateTime<Utc>>,
    pub invocation_hint: String,
}

/// Result of a successful aggregation.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub items: Vec<DisplayItem>,
    pub about: Option<Readme>,
}

#[derive(Debug)]
pub enum LoadError {
    /// The backend could not enumerate its repositories.
    Discover(SourceError),
    /// A discovered repository has no resolvable latest commit.
    Commit { repo: String, source: SourceError },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Discover(e) => write!(f, "failed to list repositories: {e}"),
            LoadError::Commit { repo, source } => {
                write!(f, "failed to read latest commit of {repo}: {source}")
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Discover(e) | LoadError::Commit { source: e, .. } => Some(e),
        }
    }
}

/// Ordered items plus an identity → position index.
#[derive(Default)]
struct ItemSet {
    items: Vec<DisplayItem>,
    index: HashMap<String, usize>,
}

impl ItemSet {
    /// Append unless the identity is already present.
    fn push(&mut self, item: DisplayItem) {
        if self.index.contains_key(&item.identity) {
            debug!("Duplicate configured repository {} ignored", item.identity);
            return;
        }
        self.index.insert(item.identity.clone(), self.items.len());
        self.items.push(item);
    }

    /// Update `last_update` in place, or append a new item built by `make`.
    fn upsert(
        &mut self,
        identity: &str,
        last_update: Option<DateTime<Utc>>,
        make: impl FnOnce() -> DisplayItem,
    ) {
        match self.index.get(identity) {
            Some(&pos) => self.items[pos].last_update = last_update,
            None => {
                let mut item = make();
                item.last_update = last_update;
                self.push(item);
            }
        }
    }
}

/// Merge configured and discovered repositories into the viewer's listing.
pub fn build_items(
    source: &dyn RepositorySource,
    policy: &dyn AccessPolicy,
    endpoint: &Endpoint,
    requester: Option<&PublicKey>,
) -> Result<Listing, LoadError> {
    let mut set = ItemSet::default();

    for entry in source.configured() {
        let level = policy.evaluate(&entry.repo, requester);
        if !level.can_view(entry.private) {
            continue;
        }
        let repo = match source.open(&entry.repo) {
            Ok(repo) => repo,
            Err(e) => {
                warn!("Skipping configured repository {}: {}", entry.repo, e);
                continue;
            }
        };
        set.push(DisplayItem {
            identity: entry.repo.clone(),
            name: entry.display_name().to_string(),
            description: entry
                .note
                .clone()
                .or_else(|| repo.description())
                .unwrap_or_default(),
            last_update: None,
            invocation_hint: endpoint.clone_hint(&entry.repo),
        });
    }

    let mut about = None;
    for repo in source.discovered().map_err(LoadError::Discover)? {
        let identity = repo.name();
        if identity == ABOUT_REPO {
            about = repo.readme();
        }

        let level = policy.evaluate(identity, requester);
        if !level.can_view(repo.is_private()) {
            continue;
        }

        let commit = repo.latest_commit().map_err(|source| LoadError::Commit {
            repo: identity.to_string(),
            source,
        })?;

        set.upsert(identity, commit.last_update(), || DisplayItem {
            identity: identity.to_string(),
            name: identity.to_string(),
            description: repo.description().unwrap_or_default(),
            last_update: None,
            invocation_hint: endpoint.clone_hint(identity),
        });
    }

    info!(
        "Listing built: {} repositories, about readme {}",
        set.items.len(),
        if about.is_some() { "found" } else { "missing" }
    );
    Ok(Listing {
        items: set.items,
        about,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::{MemoryRepo, MemorySource};
    use crate::core::access::{AccessLevel, StaticAccessPolicy};
    use crate::core::repo::ConfiguredRepo;
    use crate::test_support::{at, identities};

    fn endpoint() -> Endpoint {
        Endpoint::new("localhost", 23231)
    }

    fn build(source: &MemorySource, policy: &StaticAccessPolicy) -> Listing {
        build_items(source, policy, &endpoint(), None).unwrap()
    }

    #[test]
    fn test_clone_hint_omits_default_port() {
        assert_eq!(
            Endpoint::new("git.example.com", 22).clone_hint("dotfiles"),
            "git clone ssh://git.example.com/dotfiles"
        );
        assert_eq!(
            endpoint().clone_hint("dotfiles"),
            "git clone ssh://localhost:23231/dotfiles"
        );
    }

    #[test]
    fn test_merge_enriches_configured_item_in_place() {
        let mut source = MemorySource::new();
        source.configure(ConfiguredRepo::new("a"));
        source.add(MemoryRepo::new("a").committed_at(at(100)));
        source.add(MemoryRepo::new("b").private(true).committed_at(at(200)));
        let policy = StaticAccessPolicy::new(AccessLevel::NoAccess).with("b", AccessLevel::ReadOnly);

        let listing = build(&source, &policy);

        assert_eq!(identities(&listing.items), vec!["a", "b"]);
        assert_eq!(listing.items[0].last_update, Some(at(100)));
        assert_eq!(listing.items[1].last_update, Some(at(200)));
    }

    #[test]
    fn test_configured_first_then_discovery_order() {
        let mut source = MemorySource::new();
        for name in ["z", "c", "m"] {
            source.configure(ConfiguredRepo::new(name));
        }
        for name in ["a", "m", "b", "z", "c", "d"] {
            source.add(MemoryRepo::new(name).committed_at(at(1)));
        }

        let listing = build(&source, &StaticAccessPolicy::new(AccessLevel::ReadOnly));

        assert_eq!(identities(&listing.items), vec!["z", "c", "m", "a", "b", "d"]);
        assert!(listing.items.iter().all(|i| i.last_update == Some(at(1))));
    }

    #[test]
    fn test_configured_without_discovery_has_no_timestamp() {
        let mut source = MemorySource::new();
        source.configure(ConfiguredRepo::new("pinned"));
        source.add_undiscovered(MemoryRepo::new("pinned"));

        let listing = build(&source, &StaticAccessPolicy::new(AccessLevel::ReadOnly));

        assert_eq!(identities(&listing.items), vec!["pinned"]);
        assert_eq!(listing.items[0].last_update, None);
    }

    #[test]
    fn test_private_excluded_below_read_only() {
        let mut source = MemorySource::new();
        source.add(MemoryRepo::new("open").committed_at(at(1)));
        source.add(MemoryRepo::new("secret").private(true).committed_at(at(1)));

        let none = build(&source, &StaticAccessPolicy::new(AccessLevel::NoAccess));
        assert_eq!(identities(&none.items), vec!["open"]);

        let read = build(&source, &StaticAccessPolicy::new(AccessLevel::ReadOnly));
        assert_eq!(identities(&read.items), vec!["open", "secret"]);

        let admin = build(&source, &StaticAccessPolicy::new(AccessLevel::AdminAccess));
        assert_eq!(identities(&admin.items), vec!["open", "secret"]);
    }

    #[test]
    fn test_private_configured_entry_filtered() {
        let mut source = MemorySource::new();
        let mut entry = ConfiguredRepo::new("secret");
        entry.private = true;
        source.configure(entry);
        source.add_undiscovered(MemoryRepo::new("secret"));

        let listing = build(&source, &StaticAccessPolicy::new(AccessLevel::NoAccess));
        assert!(listing.items.is_empty());
    }

    #[test]
    fn test_about_readme_ignores_filter() {
        let mut source = MemorySource::new();
        source.add(
            MemoryRepo::new(ABOUT_REPO)
                .private(true)
                .committed_at(at(1))
                .with_readme("# Hello", "README.md"),
        );

        let listing = build(&source, &StaticAccessPolicy::new(AccessLevel::NoAccess));

        assert!(listing.items.is_empty());
        let about = listing.about.unwrap();
        assert_eq!(about.content, "# Hello");
        assert_eq!(about.path, "README.md");
    }

    #[test]
    fn test_unresolvable_configured_entry_is_skipped() {
        let mut source = MemorySource::new();
        source.configure(ConfiguredRepo::new("gone"));
        source.configure(ConfiguredRepo::new("here"));
        source.add(MemoryRepo::new("here").committed_at(at(5)));

        let listing = build(&source, &StaticAccessPolicy::new(AccessLevel::ReadOnly));

        assert_eq!(identities(&listing.items), vec!["here"]);
    }

    #[test]
    fn test_commit_failure_aborts_listing() {
        let mut source = MemorySource::new();
        source.add(MemoryRepo::new("ok").committed_at(at(1)));
        source.add(MemoryRepo::new("broken").without_commits());

        let err = build_items(
            &source,
            &StaticAccessPolicy::new(AccessLevel::ReadOnly),
            &endpoint(),
            None,
        )
        .unwrap_err();

        match err {
            LoadError::Commit { repo, .. } => assert_eq!(repo, "broken"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_filtered_repo_commit_is_not_resolved() {
        let mut source = MemorySource::new();
        source.add(MemoryRepo::new("hidden").private(true).without_commits());

        let listing = build(&source, &StaticAccessPolicy::new(AccessLevel::NoAccess));
        assert!(listing.items.is_empty());
    }

    #[test]
    fn test_discovery_failure_aborts_listing() {
        let mut source = MemorySource::new();
        source.fail_discovery("disk on fire");

        let err = build_items(
            &source,
            &StaticAccessPolicy::new(AccessLevel::ReadOnly),
            &endpoint(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Discover(_)));
    }

    #[test]
    fn test_author_time_fallback() {
        let mut source = MemorySource::new();
        source.add(MemoryRepo::new("zero").committed_at(at(0)).authored_at(at(42)));
        source.add(MemoryRepo::new("both").committed_at(at(7)).authored_at(at(42)));

        let listing = build(&source, &StaticAccessPolicy::new(AccessLevel::ReadOnly));

        assert_eq!(listing.items[0].last_update, Some(at(42)));
        assert_eq!(listing.items[1].last_update, Some(at(7)));
    }

    #[test]
    fn test_display_fields() {
        let mut source = MemorySource::new();
        let mut entry = ConfiguredRepo::new("config");
        entry.name = Some("Home".to_string());
        entry.note = Some("About this server".to_string());
        source.configure(entry);
        source.add(MemoryRepo::new("config").committed_at(at(1)));
        source.add(
            MemoryRepo::new("tool")
                .committed_at(at(1))
                .with_description("A tool"),
        );

        let listing = build(&source, &StaticAccessPolicy::new(AccessLevel::ReadOnly));

        assert_eq!(listing.items[0].name, "Home");
        assert_eq!(listing.items[0].description, "About this server");
        assert_eq!(listing.items[1].name, "tool");
        assert_eq!(listing.items[1].description, "A tool");
        assert_eq!(
            listing.items[1].invocation_hint,
            "git clone ssh://localhost:23231/tool"
        );
    }

    #[test]
    fn test_duplicate_configured_entries_collapse() {
        let mut source = MemorySource::new();
        source.configure(ConfiguredRepo::new("a"));
        source.configure(ConfiguredRepo::new("a"));
        source.add(MemoryRepo::new("a").committed_at(at(3)));

        let listing = build(&source, &StaticAccessPolicy::new(AccessLevel::ReadOnly));
        assert_eq!(identities(&listing.items), vec!["a"]);
        assert_eq!(listing.items[0].last_update, Some(at(3)));
    }
}
