//! Application error types using thiserror
//!
//! Error hierarchy:
//! - VcsError: Failures while resolving or interrogating a remote repository
//! - ManifestError: Issues with go.mod parsing and rewriting
//!
//! Every error carries a matchable kind; callers never inspect message
//! strings to branch on a failure.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the VCS transports and the go-get discovery layer
#[derive(Error, Debug)]
pub enum VcsError {
    /// The transport is unusable (missing collaborator or unknown VCS kind)
    #[error("invalid VCS")]
    System,

    /// go-get discovery pointed at a VCS kind this tool does not implement
    #[error("unsupported VCS '{0}'")]
    UnsupportedSystem(String),

    /// Empty or unparsable repository path or URL
    #[error("invalid repository")]
    Repository,

    /// Insecure scheme requested without a matching insecure pattern
    #[error("unsecured call to {url} cancelled")]
    SecurityIssue { url: String },

    /// Remote listing or discovery request failed
    #[error("{vcs}: failed to list tags: {message}")]
    Fetch { vcs: &'static str, message: String },

    /// Discovery response declared an encoding we do not decode
    #[error("unsupported charset: {0}")]
    UnsupportedCharset(String),

    /// The shared deadline expired before the fetch completed
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The module must pin a release tag but uses a pre-release or
    /// pseudo-version
    #[error("release tag expected")]
    ExpectedTag,
}

impl VcsError {
    /// Creates a new SecurityIssue error
    pub fn security_issue(url: impl Into<String>) -> Self {
        VcsError::SecurityIssue { url: url.into() }
    }

    /// Creates a new Fetch error with the VCS name as context
    pub fn fetch(vcs: &'static str, message: impl Into<String>) -> Self {
        VcsError::Fetch {
            vcs,
            message: message.into(),
        }
    }
}

/// Errors related to go.mod file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The file is not a go.mod file or could not be parsed as one
    #[error("invalid go.mod: {message}")]
    Invalid { message: String },

    /// Failed to read the go.mod file
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the go.mod file back to disk
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The named module has no require or replace entry to update
    #[error("no entry for module '{module}'")]
    MissingModule { module: String },

    /// Serialization found no pending edits; a benign outcome, never
    /// surfaced as a user-facing error
    #[error("go.mod not modified")]
    NotModified,
}

impl ManifestError {
    /// Creates a new Invalid error
    pub fn invalid(message: impl Into<String>) -> Self {
        ManifestError::Invalid {
            message: message.into(),
        }
    }

    /// Creates a new Read error
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new Write error
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::Write {
            path: path.into(),
            source,
        }
    }

    /// Creates a new MissingModule error
    pub fn missing_module(module: impl Into<String>) -> Self {
        ManifestError::MissingModule {
            module: module.into(),
        }
    }
}
