use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::repo::{CommitInfo, ConfiguredRepo, Readme, Repository, RepositorySource, SourceError};

/// An in-memory repository, intended for tests and embedding.
#[derive(Debug, Clone)]
pub struct MemoryRepo {
    name: String,
    private: bool,
    description: Option<String>,
    commit: Option<CommitInfo>,
    readme: Option<Readme>,
}

impl MemoryRepo {
    /// A public repository with a single commit that has no timestamps.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            commit: Some(CommitInfo {
                id: format!("{name}-head"),
                committed_at: None,
                authored_at: None,
            }),
            name,
            private: false,
            description: None,
            readme: None,
        }
    }

    pub fn private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    pub fn committed_at(mut self, when: DateTime<Utc>) -> Self {
        if let Some(commit) = self.commit.as_mut() {
            commit.committed_at = Some(when);
        }
        self
    }

    pub fn authored_at(mut self, when: DateTime<Utc>) -> Self {
        if let Some(commit) = self.commit.as_mut() {
            commit.authored_at = Some(when);
        }
        self
    }

    /// Make `latest_commit` fail.
    pub fn without_commits(mut self) -> Self {
        self.commit = None;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_readme(mut self, content: impl Into<String>, path: impl Into<String>) -> Self {
        self.readme = Some(Readme {
            content: content.into(),
            path: path.into(),
        });
        self
    }
}

impl Repository for MemoryRepo {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_private(&self) -> bool {
        self.private
    }

    fn description(&self) -> Option<String> {
        self.description.clone()
    }

    fn latest_commit(&self) -> Result<CommitInfo, SourceError> {
        self.commit
            .clone()
            .ok_or_else(|| SourceError::NoCommits(self.name.clone()))
    }

    fn readme(&self) -> Option<Readme> {
        self.readme.clone()
    }
}

/// An in-memory `RepositorySource`.
///
/// Repositories added with [`MemorySource::add`] are both openable and
/// discovered; [`MemorySource::add_undiscovered`] makes one openable only.
#[derive(Default)]
pub struct MemorySource {
    configured: Vec<ConfiguredRepo>,
    repos: Vec<Arc<MemoryRepo>>,
    hidden: HashSet<String>,
    discover_error: Option<String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configure(&mut self, entry: ConfiguredRepo) -> &mut Self {
        self.configured.push(entry);
        self
    }

    pub fn add(&mut self, repo: MemoryRepo) -> &mut Self {
        self.repos.push(Arc::new(repo));
        self
    }

    pub fn add_undiscovered(&mut self, repo: MemoryRepo) -> &mut Self {
        self.hidden.insert(repo.name.clone());
        self.add(repo)
    }

    /// Make `discovered` fail with the given message.
    pub fn fail_discovery(&mut self, message: impl Into<String>) -> &mut Self {
        self.discover_error = Some(message.into());
        self
    }
}

impl RepositorySource for MemorySource {
    fn configured(&self) -> Vec<ConfiguredRepo> {
        self.configured.clone()
    }

    fn open(&self, repo: &str) -> Result<Arc<dyn Repository>, SourceError> {
        self.repos
            .iter()
            .find(|r| r.name == repo)
            .map(|r| Arc::clone(r) as Arc<dyn Repository>)
            .ok_or_else(|| SourceError::NotFound(repo.to_string()))
    }

    fn discovered(&self) -> Result<Vec<Arc<dyn Repository>>, SourceError> {
        if let Some(message) = &self.discover_error {
            return Err(SourceError::Malformed(message.clone()));
        }
        Ok(self
            .repos
            .iter()
            .filter(|r| !self.hidden.contains(&r.name))
            .map(|r| Arc::clone(r) as Arc<dyn Repository>)
            .collect())
    }
}
