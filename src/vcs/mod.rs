//! Version control transports
//!
//! This module provides:
//! - The `VcsSystem` trait implemented by every transport
//! - The dual secure/insecure HTTP client policy
//! - URL scheme helpers shared by the transports
//!
//! Two transports exist: go-get discovery (`goget`) and direct git (`git`).
//! The checker consults them in that fixed order; the first one claiming a
//! path serves it, with no fallback to the other.

pub mod git;
pub mod goget;
mod http;

pub use http::HttpPolicy;

use crate::domain::Tags;
use crate::error::VcsError;
use async_trait::async_trait;
use url::Url;

/// A way of addressing a repository over the network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Secure HTTPS
    Https,
    /// SSH with the conventional git user
    SshGit,
    /// The legacy unauthenticated git protocol
    Git,
    /// Plain HTTP
    Http,
}

impl Scheme {
    /// URL prefix for this scheme
    pub fn prefix(self) -> &'static str {
        match self {
            Scheme::Https => "https://",
            Scheme::SshGit => "ssh://git@",
            Scheme::Git => "git://",
            Scheme::Http => "http://",
        }
    }
}

/// Returns true for schemes that are inherently secure and never need an
/// insecure-pattern opt-in
pub fn is_secure_scheme(scheme: &str) -> bool {
    matches!(scheme, "https" | "ssh")
}

/// Repository path of a URL: host plus path, without any `.git` suffix
///
/// This is the form matched against insecure patterns.
pub fn repo_path(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    let path = url.path().trim_end_matches(".git");
    format!("{}{}", host, path)
}

/// Implemented by any VCS transport
#[async_trait]
pub trait VcsSystem: Send + Sync {
    /// Reports whether this transport claims the given import path
    ///
    /// A routing heuristic, not a promise that the fetch will succeed.
    fn can_fetch(&self, path: &str) -> bool;

    /// Lists the remote tags behind an import path
    async fn fetch_path(&self, path: &str) -> Result<Tags, VcsError>;

    /// Lists the remote tags behind a repository URL
    async fn fetch_url(&self, url: &str) -> Result<Tags, VcsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_prefixes() {
        assert_eq!(Scheme::Https.prefix(), "https://");
        assert_eq!(Scheme::SshGit.prefix(), "ssh://git@");
        assert_eq!(Scheme::Git.prefix(), "git://");
        assert_eq!(Scheme::Http.prefix(), "http://");
    }

    #[test]
    fn test_is_secure_scheme() {
        assert!(is_secure_scheme("https"));
        assert!(is_secure_scheme("ssh"));
        assert!(!is_secure_scheme("http"));
        assert!(!is_secure_scheme("git"));
        assert!(!is_secure_scheme(""));
    }

    #[test]
    fn test_repo_path_strips_git_suffix() {
        let u = Url::parse("https://example.com/group/pkg.git").unwrap();
        assert_eq!(repo_path(&u), "example.com/group/pkg");
    }

    #[test]
    fn test_repo_path_plain() {
        let u = Url::parse("http://example.com/group/pkg").unwrap();
        assert_eq!(repo_path(&u), "example.com/group/pkg");
    }
}
