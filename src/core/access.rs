//! # Access Control
//!
//! Who may see what. The core only ever talks to the [`AccessPolicy`] trait;
//! [`ConfigAccessPolicy`] is the reference implementation driven by the
//! `[[users]]` and `[[repos]]` sections of the config file.
//!
//! ```text
//! NoAccess < ReadOnly < ReadWrite < AdminAccess
//! ```
//!
//! A private repository is listed only when the requester's level is at
//! least [`AccessLevel::ReadOnly`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::config::{RepoEntry, ResolvedConfig, UserEntry};

/// Ordered capability tier. Declaration order is the comparison order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessLevel {
    #[default]
    NoAccess,
    ReadOnly,
    ReadWrite,
    AdminAccess,
}

impl AccessLevel {
    /// Minimum level needed to list a private repository.
    pub const VIEW_PRIVATE: AccessLevel = AccessLevel::ReadOnly;

    pub fn label(self) -> &'static str {
        match self {
            AccessLevel::NoAccess => "no-access",
            AccessLevel::ReadOnly => "read-only",
            AccessLevel::ReadWrite => "read-write",
            AccessLevel::AdminAccess => "admin-access",
        }
    }

    /// Whether a repository with the given privacy flag is visible at this level.
    pub fn can_view(self, private: bool) -> bool {
        !private || self >= Self::VIEW_PRIVATE
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AccessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "no-access" | "none" => Ok(AccessLevel::NoAccess),
            "read-only" => Ok(AccessLevel::ReadOnly),
            "read-write" => Ok(AccessLevel::ReadWrite),
            "admin-access" | "admin" => Ok(AccessLevel::AdminAccess),
            other => Err(format!("unknown access level: {other}")),
        }
    }
}

/// An SSH public key in authorized-keys form (`<type> <base64> [comment]`).
///
/// Equality ignores the trailing comment.
#[derive(Debug, Clone)]
pub struct PublicKey {
    kind: String,
    body: String,
}

impl PublicKey {
    /// Parse an authorized-keys line. Returns `None` for anything that isn't
    /// at least `<type> <base64>`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let kind = parts.next()?;
        let body = parts.next()?;
        if !kind.starts_with("ssh-") && !kind.starts_with("ecdsa-") && !kind.starts_with("sk-") {
            return None;
        }
        Some(Self {
            kind: kind.to_string(),
            body: body.to_string(),
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Short form for logs: type plus the last 8 characters of the body.
    pub fn short(&self) -> String {
        let tail_start = self
            .body
            .char_indices()
            .rev()
            .nth(7)
            .map_or(0, |(i, _)| i);
        format!("{} …{}", self.kind, &self.body[tail_start..])
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.body == other.body
    }
}

impl Eq for PublicKey {}

/// Decides the access level a requester has on a repository.
pub trait AccessPolicy: Send + Sync {
    fn evaluate(&self, repo: &str, requester: Option<&PublicKey>) -> AccessLevel;
}

/// Fixed levels per repository with a default for everything else.
/// The requester is ignored.
#[derive(Debug, Clone)]
pub struct StaticAccessPolicy {
    default: AccessLevel,
    overrides: HashMap<String, AccessLevel>,
}

impl StaticAccessPolicy {
    pub fn new(default: AccessLevel) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    pub fn with(mut self, repo: impl Into<String>, level: AccessLevel) -> Self {
        self.overrides.insert(repo.into(), level);
        self
    }
}

impl AccessPolicy for StaticAccessPolicy {
    fn evaluate(&self, repo: &str, _requester: Option<&PublicKey>) -> AccessLevel {
        self.overrides.get(repo).copied().unwrap_or(self.default)
    }
}

/// Access policy backed by the resolved configuration.
pub struct ConfigAccessPolicy {
    anon_access: AccessLevel,
    allow_keyless: bool,
    users: Vec<PolicyUser>,
    repos: Vec<RepoEntry>,
}

struct PolicyUser {
    name: String,
    admin: bool,
    keys: Vec<PublicKey>,
    collab_repos: Vec<String>,
}

impl PolicyUser {
    fn from_entry(entry: &UserEntry) -> Self {
        let keys = entry
            .public_keys
            .iter()
            .filter_map(|k| PublicKey::parse(k))
            .collect();
        Self {
            name: entry.name.clone(),
            admin: entry.admin.unwrap_or(false),
            keys,
            collab_repos: entry.collab_repos.clone(),
        }
    }
}

impl ConfigAccessPolicy {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            anon_access: config.anon_access,
            allow_keyless: config.allow_keyless,
            users: config.users.iter().map(PolicyUser::from_entry).collect(),
            repos: config.repos.clone(),
        }
    }

    fn find_user(&self, key: &PublicKey) -> Option<&PolicyUser> {
        self.users.iter().find(|u| u.keys.iter().any(|k| k == key))
    }

    fn is_private(&self, repo: &str) -> bool {
        self.repos
            .iter()
            .any(|r| r.repo == repo && r.private.unwrap_or(false))
    }

    fn is_collab(&self, user: &PolicyUser, repo: &str) -> bool {
        user.collab_repos.iter().any(|r| r == repo)
            || self
                .repos
                .iter()
                .any(|r| r.repo == repo && r.collabs.iter().any(|c| *c == user.name))
    }
}

impl AccessPolicy for ConfigAccessPolicy {
    fn evaluate(&self, repo: &str, requester: Option<&PublicKey>) -> AccessLevel {
        let private = self.is_private(repo);

        if let Some(user) = requester.and_then(|k| self.find_user(k)) {
            if user.admin {
                return AccessLevel::AdminAccess;
            }
            if self.is_collab(user, repo) {
                return AccessLevel::ReadWrite;
            }
            if private {
                return AccessLevel::NoAccess;
            }
            return self.anon_access.max(AccessLevel::ReadOnly);
        }

        if private || (requester.is_none() && !self.allow_keyless) {
            return AccessLevel::NoAccess;
        }
        self.anon_access
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{CliOverrides, GitshelfConfig, ServerConfig, resolve};

    const ALICE: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIAlice alice@laptop";
    const BOB: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIBob";
    const EVE: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIEve";

    fn policy() -> ConfigAccessPolicy {
        let config = GitshelfConfig {
            server: ServerConfig {
                anon_access: Some(AccessLevel::ReadOnly),
                allow_keyless: Some(true),
                ..Default::default()
            },
            users: vec![
                UserEntry {
                    name: "alice".to_string(),
                    admin: Some(true),
                    public_keys: vec![ALICE.to_string()],
                    collab_repos: vec![],
                },
                UserEntry {
                    name: "bob".to_string(),
                    admin: None,
                    public_keys: vec![BOB.to_string()],
                    collab_repos: vec![],
                },
            ],
            repos: vec![
                RepoEntry {
                    name: Some("Secret".to_string()),
                    repo: "secret".to_string(),
                    private: Some(true),
                    note: None,
                    collabs: vec!["bob".to_string()],
                },
                RepoEntry {
                    name: None,
                    repo: "hidden".to_string(),
                    private: Some(true),
                    note: None,
                    collabs: vec![],
                },
            ],
            ..Default::default()
        };
        let cli = CliOverrides {
            anon_access: Some(AccessLevel::ReadOnly),
            ..Default::default()
        };
        ConfigAccessPolicy::from_config(&resolve(&config, &cli))
    }

    #[test]
    fn test_levels_are_ordered() {
        assert!(AccessLevel::NoAccess < AccessLevel::ReadOnly);
        assert!(AccessLevel::ReadOnly < AccessLevel::ReadWrite);
        assert!(AccessLevel::ReadWrite < AccessLevel::AdminAccess);
    }

    #[test]
    fn test_can_view_private_needs_read_only() {
        assert!(AccessLevel::NoAccess.can_view(false));
        assert!(!AccessLevel::NoAccess.can_view(true));
        assert!(AccessLevel::ReadOnly.can_view(true));
        assert!(AccessLevel::AdminAccess.can_view(true));
    }

    #[test]
    fn test_access_level_parse() {
        assert_eq!("read-write".parse::<AccessLevel>(), Ok(AccessLevel::ReadWrite));
        assert_eq!("Admin".parse::<AccessLevel>(), Ok(AccessLevel::AdminAccess));
        assert!("everything".parse::<AccessLevel>().is_err());
    }

    #[test]
    fn test_public_key_ignores_comment() {
        let a = PublicKey::parse(ALICE).unwrap();
        let b = PublicKey::parse("ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIAlice other").unwrap();
        assert_eq!(a, b);
        assert!(PublicKey::parse("not-a-key").is_none());
        assert!(PublicKey::parse("rsa AAAA").is_none());
    }

    #[test]
    fn test_short_key_keeps_last_eight_chars() {
        let key = PublicKey::parse(ALICE).unwrap();
        assert_eq!(key.short(), "ssh-ed25519 …AAIAlice");

        let odd = PublicKey::parse("ssh-ed25519 AAAAé日本語ключ").unwrap();
        assert_eq!(odd.short(), "ssh-ed25519 …é日本語ключ");

        let tiny = PublicKey::parse("ssh-rsa ab").unwrap();
        assert_eq!(tiny.short(), "ssh-rsa …ab");
    }

    #[test]
    fn test_admin_sees_everything() {
        let key = PublicKey::parse(ALICE).unwrap();
        assert_eq!(policy().evaluate("hidden", Some(&key)), AccessLevel::AdminAccess);
    }

    #[test]
    fn test_collaborator_gets_read_write() {
        let key = PublicKey::parse(BOB).unwrap();
        let policy = policy();
        assert_eq!(policy.evaluate("secret", Some(&key)), AccessLevel::ReadWrite);
        assert_eq!(policy.evaluate("hidden", Some(&key)), AccessLevel::NoAccess);
        assert_eq!(policy.evaluate("public", Some(&key)), AccessLevel::ReadOnly);
    }

    #[test]
    fn test_unknown_key_uses_anon_access() {
        let key = PublicKey::parse(EVE).unwrap();
        let policy = policy();
        assert_eq!(policy.evaluate("public", Some(&key)), AccessLevel::ReadOnly);
        assert_eq!(policy.evaluate("secret", Some(&key)), AccessLevel::NoAccess);
        assert_eq!(policy.evaluate("public", None), AccessLevel::ReadOnly);
    }
}
