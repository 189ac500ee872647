//! Typed per-dependency check outcomes

use crate::domain::Dependency;
use std::fmt;

/// Severity of a check message
///
/// Ordering follows severity: `Error < Warn < Info < Debug`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// A check failed; should definitely be noted
    Error,
    /// A newer version exists upstream
    Warn,
    /// A change was applied to the go.mod file
    Info,
    /// Routine outcome, only shown in verbose mode
    Debug,
}

/// Outcome of checking one dependency (or a whole manifest)
///
/// One message maps to one printed line. The candidate new version for an
/// outdated dependency is carried as a structured field, not only embedded
/// in the display text.
#[derive(Debug, Clone)]
pub struct CheckMessage {
    level: Level,
    module: String,
    text: String,
    new_version: Option<String>,
}

impl CheckMessage {
    /// The dependency is already at the selected latest candidate
    pub fn up_to_date(dep: &Dependency) -> Self {
        CheckMessage {
            level: Level::Debug,
            module: dep.path.clone(),
            text: format!("{} is up to date", dep.version),
            new_version: None,
        }
    }

    /// The dependency was skipped (indirect with exclude-indirect set)
    pub fn skipped(dep: &Dependency) -> Self {
        CheckMessage {
            level: Level::Debug,
            module: dep.path.clone(),
            text: format!("{} update skipped: indirect", dep.version),
            new_version: None,
        }
    }

    /// A newer version exists upstream
    pub fn outdated(dep: &Dependency, new_version: &str) -> Self {
        CheckMessage {
            level: Level::Warn,
            module: dep.path.clone(),
            text: format!("{} must be updated to {}", dep.version, new_version),
            new_version: Some(new_version.to_string()),
        }
    }

    /// An update was written into the manifest (force-update mode)
    pub fn updated(dep: &Dependency, new_version: &str) -> Self {
        CheckMessage {
            level: Level::Info,
            module: dep.path.clone(),
            text: format!("{} will be updated to {}", dep.version, new_version),
            new_version: None,
        }
    }

    /// The check of one dependency failed
    pub fn failure(dep: &Dependency, err: impl fmt::Display) -> Self {
        CheckMessage {
            level: Level::Error,
            module: dep.path.clone(),
            text: format!("check failed: {}", err),
            new_version: None,
        }
    }

    /// A manifest-level failure, emitted before any dependency was touched
    /// or when a force-update could not be persisted
    pub fn manifest_failure(module: impl Into<String>, err: impl fmt::Display) -> Self {
        CheckMessage {
            level: Level::Error,
            module: module.into(),
            text: err.to_string(),
            new_version: None,
        }
    }

    /// Severity of this message
    pub fn level(&self) -> Level {
        self.level
    }

    /// The module (or manifest) this message is about
    pub fn module(&self) -> &str {
        &self.module
    }

    /// The candidate new version, present only for the outdated case
    pub fn outdated_version(&self) -> Option<&str> {
        self.new_version.as_deref()
    }

    /// Returns true for outcomes that should drive a non-zero exit
    pub fn is_bad(&self) -> bool {
        self.level <= Level::Warn
    }
}

impl fmt::Display for CheckMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.module, self.text)
    }
}
