//! go.mod freshness checking engine
//!
//! The checker fans out one task per dependency, each bounded by a deadline
//! shared across the whole run. A dependency is routed to the first VCS
//! transport claiming its path: go-get discovery first, direct git as the
//! fallback. One failing dependency never hides the results of the others.
//!
//! With `--force-update`, every outdated dependency is rewritten in memory;
//! the manifest is saved only when no check failed, otherwise the save is
//! abandoned with a "not modified" error result.

use crate::domain::{CheckMessage, Dependency, Level, Tag, Tags};
use crate::error::{ManifestError, VcsError};
use crate::manifest::ModFile;
use crate::netrc::Netrc;
use crate::pathmatch;
use crate::vcs::git::GitVcs;
use crate::vcs::goget::GoGetVcs;
use crate::vcs::{HttpPolicy, VcsSystem};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;

/// Settings of a check run
#[derive(Debug, Clone)]
pub struct Config {
    /// Skip dependencies marked `// indirect`
    pub exclude_indirect: bool,
    /// Write the advised versions back into the go.mod file
    pub force_update: bool,
    /// Allow candidates with a newer major version
    pub major: bool,
    /// Allow candidates with a newer minor version within the same major
    pub major_minor: bool,
    /// Also print routine (Debug level) results
    pub verbose: bool,
    /// Comma-separated globs of modules that may use insecure schemes
    pub insecure_patterns: String,
    /// Comma-separated globs of modules that must pin release tags
    pub only_releases: String,
    /// Deadline shared by all dependency checks of one file
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            exclude_indirect: false,
            force_update: false,
            major: false,
            major_minor: false,
            verbose: false,
            insecure_patterns: String::new(),
            only_releases: String::new(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Checks the dependencies of go.mod files against their upstream tags
#[derive(Clone)]
pub struct Checker {
    config: Config,
    goget: Arc<dyn VcsSystem>,
    git: Arc<dyn VcsSystem>,
}

impl Checker {
    /// Creates a checker wired with the default transports
    ///
    /// Credentials come from `.netrc` when present; a missing or unreadable
    /// file just means anonymous access.
    pub fn new(config: Config) -> Result<Self, VcsError> {
        let policy = Arc::new(HttpPolicy::new(
            config.timeout,
            &config.insecure_patterns,
        )?);
        let auth = Arc::new(Netrc::load().unwrap_or_default());
        let git = Arc::new(GitVcs::new(policy.clone(), auth));
        let goget = Arc::new(GoGetVcs::new(policy, git.clone()));
        Ok(Checker {
            config,
            goget,
            git,
        })
    }

    /// Creates a checker with explicit transports, mainly for tests
    pub fn with_systems(
        config: Config,
        goget: Arc<dyn VcsSystem>,
        git: Arc<dyn VcsSystem>,
    ) -> Self {
        Checker { config, goget, git }
    }

    /// Checks every dependency of the given manifest
    ///
    /// Returns one message per dependency, plus manifest-level messages when
    /// force-update saves (or refuses to save) the file.
    pub async fn check_file(&self, file: &dyn ModFile) -> Vec<CheckMessage> {
        let deadline = Instant::now() + self.config.timeout;
        let mut tasks = JoinSet::new();
        for dep in file.dependencies() {
            let checker = self.clone();
            tasks.spawn(async move {
                let result = tokio::time::timeout_at(
                    deadline,
                    checker.check_dependency(&dep),
                )
                .await;
                match result {
                    Ok(msg) => msg,
                    Err(_) => CheckMessage::failure(&dep, VcsError::DeadlineExceeded),
                }
            });
        }
        let mut messages = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(msg) => messages.push(msg),
                Err(err) => {
                    messages.push(CheckMessage::manifest_failure(file.module(), err))
                }
            }
        }
        if self.config.force_update {
            self.apply_updates(file, &mut messages);
        }
        messages
    }

    /// Rewrites outdated dependencies in memory, then saves the manifest
    /// unless any check failed
    fn apply_updates(&self, file: &dyn ModFile, messages: &mut Vec<CheckMessage>) {
        let deps: Vec<Dependency> = file.dependencies();
        for i in 0..messages.len() {
            let Some(version) = messages[i].outdated_version().map(str::to_string) else {
                continue;
            };
            let Some(dep) = deps.iter().find(|d| d.path == messages[i].module()) else {
                continue;
            };
            let updated = if dep.replacement {
                file.update_replace(&dep.path, &version)
            } else {
                file.update_require(&dep.path, &version)
            };
            messages[i] = match updated {
                Ok(()) => CheckMessage::updated(dep, &version),
                Err(err) => CheckMessage::failure(dep, err),
            };
        }
        if messages.iter().any(|m| m.level() == Level::Error) {
            messages.push(CheckMessage::manifest_failure(
                file.module(),
                ManifestError::NotModified,
            ));
            return;
        }
        if let Err(err) = save(file) {
            messages.push(CheckMessage::manifest_failure(file.module(), err));
        }
    }

    /// Resolves the status of a single dependency
    async fn check_dependency(&self, dep: &Dependency) -> CheckMessage {
        if self.config.exclude_indirect && dep.indirect {
            return CheckMessage::skipped(dep);
        }
        for system in [&self.goget, &self.git] {
            if !system.can_fetch(&dep.path) {
                continue;
            }
            let mut tags = match system.fetch_path(&dep.path).await {
                Ok(tags) => tags,
                Err(err) => return CheckMessage::failure(dep, err),
            };
            for excluded in &dep.excluded {
                tags = tags.not(excluded);
            }
            let Some(candidate) = self.latest(&tags, dep) else {
                return CheckMessage::up_to_date(dep);
            };
            if dep.version < candidate {
                return CheckMessage::outdated(dep, candidate.raw());
            }
            if let Err(err) = self.only_tag(dep) {
                return CheckMessage::failure(dep, err);
            }
            return CheckMessage::up_to_date(dep);
        }
        CheckMessage::failure(dep, VcsError::System)
    }

    /// Picks the newest acceptable candidate under the update policy
    fn latest(&self, tags: &Tags, dep: &Dependency) -> Option<Tag> {
        if self.config.major {
            tags.latest()
        } else if self.config.major_minor {
            tags.latest_minor(&dep.version.major())
        } else {
            tags.latest_patch(&dep.version.major_minor())
        }
    }

    /// Fails when the module must pin a release tag but does not
    fn only_tag(&self, dep: &Dependency) -> Result<(), VcsError> {
        if pathmatch::matches(&self.config.only_releases, &dep.path)
            && !dep.version.is_tag()
        {
            return Err(VcsError::ExpectedTag);
        }
        Ok(())
    }
}

fn save(file: &dyn ModFile) -> Result<(), ManifestError> {
    let buf = match file.format() {
        Ok(buf) => buf,
        // Nothing changed, nothing to write.
        Err(ManifestError::NotModified) => return Ok(()),
        Err(err) => return Err(err),
    };
    let name = file.name();
    std::fs::write(&name, buf).map_err(|e| ManifestError::write(name, e))
}
