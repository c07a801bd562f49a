//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.gitshelf/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::access::AccessLevel;
use crate::core::listing::Endpoint;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GitshelfConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub repos_path: Option<String>,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub repos: Vec<RepoEntry>,
    #[serde(default)]
    pub users: Vec<UserEntry>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub name: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub anon_access: Option<AccessLevel>,
    pub allow_keyless: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UiConfig {
    /// Extra rows reserved below the repository list.
    pub selector_height: Option<u16>,
    /// Extra rows reserved below the readme.
    pub readme_height: Option<u16>,
    /// Start with the full help expanded.
    pub full_help: Option<bool>,
}

/// A pinned repository. Listed first, in file order.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepoEntry {
    pub name: Option<String>,
    pub repo: String,
    pub private: Option<bool>,
    pub note: Option<String>,
    #[serde(default)]
    pub collabs: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserEntry {
    pub name: String,
    pub admin: Option<bool>,
    #[serde(default)]
    pub public_keys: Vec<String>,
    #[serde(default)]
    pub collab_repos: Vec<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_NAME: &str = "gitshelf";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 23231;
pub const DEFAULT_ANON_ACCESS: AccessLevel = AccessLevel::ReadOnly;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub anon_access: AccessLevel,
    pub allow_keyless: bool,
    pub repos_path: PathBuf,
    pub repos: Vec<RepoEntry>,
    pub users: Vec<UserEntry>,
    pub selector_height: u16,
    pub readme_height: u16,
    pub full_help: bool,
}

impl ResolvedConfig {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }
}

/// Values supplied on the command line. `None` = flag not given.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub repos_path: Option<PathBuf>,
    pub anon_access: Option<AccessLevel>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.gitshelf`.
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".gitshelf"))
}

/// Returns the path to `~/.gitshelf/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    home_dir().map(|d| d.join("config.toml"))
}

/// Load config from `path`, or from `~/.gitshelf/config.toml` when `None`.
///
/// A missing default config file is generated (commented out) and
/// `GitshelfConfig::default()` is returned. A missing explicit path is an
/// I/O error. Malformed TOML returns `ConfigError::Parse`.
pub fn load_config(path: Option<&Path>) -> Result<GitshelfConfig, ConfigError> {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => match config_path() {
            Some(p) => (p, false),
            None => {
                warn!("Could not determine home directory, using default config");
                return Ok(GitshelfConfig::default());
            }
        },
    };

    if !explicit && !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(GitshelfConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config = parse_config(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<GitshelfConfig, ConfigError> {
    toml::from_str(contents).map_err(ConfigError::Parse)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# gitshelf configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# repos_path = "/srv/git"              # Or set GITSHELF_REPOS

# [server]
# name = "gitshelf"
# host = "localhost"                  # Or set GITSHELF_HOST
# port = 23231                        # Or set GITSHELF_PORT
# anon_access = "read-only"           # "no-access", "read-only", "read-write", "admin-access"
# allow_keyless = true

# [ui]
# selector_height = 0
# readme_height = 0
# full_help = false

# [[repos]]
# name = "Home"
# repo = "config"
# private = false
# note = "Configuration and content repo"

# [[users]]
# name = "admin"
# admin = true
# public_keys = ["ssh-ed25519 AAAA..."]
# collab_repos = []
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &GitshelfConfig, cli: &CliOverrides) -> ResolvedConfig {
    // Host: CLI → env → config → default
    let host = cli
        .host
        .clone()
        .or_else(|| std::env::var("GITSHELF_HOST").ok())
        .or_else(|| config.server.host.clone())
        .unwrap_or_else(|| DEFAULT_HOST.to_string());

    // Port: CLI → env → config → default
    let port = cli
        .port
        .or_else(|| env_parse("GITSHELF_PORT"))
        .or(config.server.port)
        .unwrap_or(DEFAULT_PORT);

    let anon_access = cli
        .anon_access
        .or_else(|| env_parse("GITSHELF_ANON_ACCESS"))
        .or(config.server.anon_access)
        .unwrap_or(DEFAULT_ANON_ACCESS);

    // Repos path: CLI → env → config → ~/.gitshelf/repos
    let repos_path = cli
        .repos_path
        .clone()
        .or_else(|| std::env::var("GITSHELF_REPOS").ok().map(PathBuf::from))
        .or_else(|| config.repos_path.as_ref().map(PathBuf::from))
        .or_else(|| home_dir().map(|d| d.join("repos")))
        .unwrap_or_else(|| PathBuf::from("repos"));

    ResolvedConfig {
        name: config
            .server
            .name
            .clone()
            .unwrap_or_else(|| DEFAULT_NAME.to_string()),
        host,
        port,
        anon_access,
        allow_keyless: config.server.allow_keyless.unwrap_or(true),
        repos_path,
        repos: config.repos.clone(),
        users: config.users.clone(),
        selector_height: config.ui.selector_height.unwrap_or(0),
        readme_height: config.ui.readme_height.unwrap_or(0),
        full_help: config.ui.full_help.unwrap_or(false),
    }
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Option<T> {
    let raw = std::env::var(var).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring unparseable {}={:?}", var, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = GitshelfConfig::default();
        assert!(config.repos.is_empty());
        assert!(config.server.host.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let config = GitshelfConfig::default();
        let resolved = resolve(&config, &CliOverrides::default());
        assert_eq!(resolved.name, DEFAULT_NAME);
        assert!(resolved.allow_keyless);
        assert_eq!(resolved.selector_height, 0);
        assert!(!resolved.full_help);
    }

    #[test]
    fn test_cli_wins_over_config() {
        let config = GitshelfConfig {
            server: ServerConfig {
                host: Some("git.example.com".to_string()),
                port: Some(2222),
                anon_access: Some(AccessLevel::NoAccess),
                ..Default::default()
            },
            ..Default::default()
        };
        let cli = CliOverrides {
            host: Some("cli.example.com".to_string()),
            port: Some(22),
            repos_path: Some(PathBuf::from("/tmp/repos")),
            anon_access: Some(AccessLevel::ReadWrite),
        };
        let resolved = resolve(&config, &cli);
        assert_eq!(resolved.host, "cli.example.com");
        assert_eq!(resolved.port, 22);
        assert_eq!(resolved.anon_access, AccessLevel::ReadWrite);
        assert_eq!(resolved.repos_path, PathBuf::from("/tmp/repos"));
    }

    #[test]
    fn test_full_toml_parses() {
        let toml_str = r#"
repos_path = "/srv/git"

[server]
name = "Shelf"
host = "git.example.com"
port = 22
anon_access = "no-access"
allow_keyless = false

[ui]
readme_height = 2

[[repos]]
name = "Home"
repo = "config"
note = "About this server"

[[repos]]
repo = "secret"
private = true
collabs = ["bob"]

[[users]]
name = "bob"
public_keys = ["ssh-ed25519 AAAA bob@host"]
"#;
        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.repos_path.as_deref(), Some("/srv/git"));
        assert_eq!(config.server.anon_access, Some(AccessLevel::NoAccess));
        assert_eq!(config.server.allow_keyless, Some(false));
        assert_eq!(config.ui.readme_height, Some(2));
        assert_eq!(config.repos.len(), 2);
        assert_eq!(config.repos[0].name.as_deref(), Some("Home"));
        assert_eq!(config.repos[1].collabs, vec!["bob".to_string()]);
        assert_eq!(config.users[0].public_keys.len(), 1);
        assert!(config.users[0].collab_repos.is_empty());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = parse_config("[server\nhost = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("config parse error"));
    }

    #[test]
    fn test_explicit_missing_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = load_config(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_endpoint_from_resolved() {
        let cli = CliOverrides {
            host: Some("h".to_string()),
            port: Some(2222),
            ..Default::default()
        };
        let resolved = resolve(&GitshelfConfig::default(), &cli);
        assert_eq!(resolved.endpoint().clone_hint("repo"), "git clone ssh://h:2222/repo");
    }
}
