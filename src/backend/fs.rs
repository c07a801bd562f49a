//! Directory-backed repository source.
//!
//! Every sub-directory of the repos root that git can open is discovered.
//! Both layouts are recognised:
//!
//! ```text
//! repos/
//! ├── dotfiles/          work tree: dotfiles/.git
//! └── tool.git/          bare
//! ```
//!
//! Commit metadata and the README come from the object database through
//! `git2`, so bare repositories (the usual server layout) report the same
//! data as work trees. The README is read from the HEAD tree; uncommitted
//! files in a work tree are not shown.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use git2::ErrorCode;
use log::{debug, warn};

use crate::core::config::ResolvedConfig;
use crate::core::repo::{CommitInfo, ConfiguredRepo, Readme, Repository, RepositorySource, SourceError};

const README_CANDIDATES: &[&str] = &["README.md", "readme.md", "README", "README.txt"];
const PLACEHOLDER_DESCRIPTION: &str = "Unnamed repository";

pub struct DirectorySource {
    root: PathBuf,
    configured: Vec<ConfiguredRepo>,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>, configured: Vec<ConfiguredRepo>) -> Self {
        Self {
            root: root.into(),
            configured,
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        let configured = config
            .repos
            .iter()
            .map(|r| ConfiguredRepo {
                repo: r.repo.clone(),
                name: r.name.clone(),
                private: r.private.unwrap_or(false),
                note: r.note.clone(),
            })
            .collect();
        Self::new(config.repos_path.clone(), configured)
    }

    fn is_private(&self, name: &str) -> bool {
        self.configured.iter().any(|c| c.repo == name && c.private)
    }

    fn repo_at(&self, name: &str, dir: &Path) -> Option<FsRepo> {
        // Only `dir` itself; parent directories are never searched.
        let git = git2::Repository::open(dir).ok()?;
        Some(FsRepo {
            name: name.to_string(),
            git_dir: git.path().to_path_buf(),
            private: self.is_private(name),
        })
    }
}

impl RepositorySource for DirectorySource {
    fn configured(&self) -> Vec<ConfiguredRepo> {
        self.configured.clone()
    }

    fn open(&self, repo: &str) -> Result<Arc<dyn Repository>, SourceError> {
        for candidate in [self.root.join(repo), self.root.join(format!("{repo}.git"))] {
            if let Some(found) = self.repo_at(repo, &candidate) {
                return Ok(Arc::new(found));
            }
        }
        Err(SourceError::NotFound(repo.to_string()))
    }

    fn discovered(&self) -> Result<Vec<Arc<dyn Repository>>, SourceError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Repos path {} does not exist", self.root.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(SourceError::Io(e)),
        };

        let mut dirs: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();

        let mut repos: Vec<Arc<dyn Repository>> = Vec::new();
        for dir in dirs {
            let Some(file_name) = dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let name = file_name.strip_suffix(".git").unwrap_or(file_name);
            match self.repo_at(name, &dir) {
                Some(repo) => repos.push(Arc::new(repo)),
                None => debug!("Skipping non-repository {}", dir.display()),
            }
        }
        Ok(repos)
    }
}

/// A repository on disk. `git2::Repository` is not `Sync`, so the handle
/// keeps only the git directory and reopens it per query.
struct FsRepo {
    name: String,
    git_dir: PathBuf,
    private: bool,
}

impl FsRepo {
    fn git(&self) -> Result<git2::Repository, SourceError> {
        git2::Repository::open(&self.git_dir).map_err(|e| git_error(&self.name, e))
    }
}

fn git_error(repo: &str, e: git2::Error) -> SourceError {
    match e.code() {
        ErrorCode::UnbornBranch | ErrorCode::NotFound => SourceError::NoCommits(repo.to_string()),
        _ => SourceError::Malformed(format!("{repo}: {}", e.message())),
    }
}

fn git_time(time: git2::Time) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(time.seconds(), 0).single()
}

impl Repository for FsRepo {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_private(&self) -> bool {
        self.private
    }

    fn description(&self) -> Option<String> {
        let text = fs::read_to_string(self.git_dir.join("description")).ok()?;
        let text = text.trim();
        if text.is_empty() || text.starts_with(PLACEHOLDER_DESCRIPTION) {
            None
        } else {
            Some(text.to_string())
        }
    }

    fn latest_commit(&self) -> Result<CommitInfo, SourceError> {
        let git = self.git()?;
        let head = git.head().map_err(|e| git_error(&self.name, e))?;
        let commit = head.peel_to_commit().map_err(|e| git_error(&self.name, e))?;
        Ok(CommitInfo {
            id: commit.id().to_string(),
            committed_at: git_time(commit.committer().when()),
            authored_at: git_time(commit.author().when()),
        })
    }

    fn readme(&self) -> Option<Readme> {
        let git = self.git().ok()?;
        let tree = git.head().ok()?.peel_to_tree().ok()?;
        README_CANDIDATES.iter().find_map(|candidate| {
            let entry = tree.get_name(candidate)?;
            let blob = entry.to_object(&git).ok()?.peel_to_blob().ok()?;
            let content = String::from_utf8_lossy(blob.content()).into_owned();
            Some(Readme {
                content,
                path: candidate.to_string(),
            })
        })
    }
}
