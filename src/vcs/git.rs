//! Direct git transport
//!
//! Lists remote tags with `git ls-remote --tags`, trying candidate URL
//! schemes in a fixed security-first order: insecure schemes are only
//! reached when every secure attempt failed. The security gate (scheme
//! check against the insecure patterns) runs before any process is
//! spawned, and basic-auth credentials from the netrc provider are
//! injected into http(s) URLs.

use crate::domain::{Tag, Tags};
use crate::error::VcsError;
use crate::netrc::CredentialProvider;
use crate::vcs::{is_secure_scheme, repo_path, HttpPolicy, Scheme, VcsSystem};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::process::Command;
use url::Url;

/// Name of this VCS
pub const NAME: &str = "git";

/// Extension of a git repository
const EXT: &str = ".git";

// example.com/group/pkg, so with 2 slashes: 3 parts.
const STD_NUM_PARTS: usize = 3;

const TAG_REF_PREFIX: &str = "refs/tags/";
const PEELED_SUFFIX: &str = "^{}";

/// Candidate URL schemes in priority order. Secure first.
const TRANSPORTS: [(Scheme, &str); 4] = [
    (Scheme::Https, ""),
    (Scheme::SshGit, EXT),
    (Scheme::Git, EXT),
    (Scheme::Http, ""),
];

/// Lists the remote tags behind one candidate URL
#[async_trait]
trait TagLister: Send + Sync {
    async fn ls_remote(&self, url: &str) -> Result<Tags, VcsError>;
}

/// Lister spawning `git ls-remote --tags`
struct GitCommand;

#[async_trait]
impl TagLister for GitCommand {
    async fn ls_remote(&self, url: &str) -> Result<Tags, VcsError> {
        let output = Command::new("git")
            .arg("ls-remote")
            .arg("--tags")
            .arg(url)
            .env("GIT_TERMINAL_PROMPT", "0")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| VcsError::fetch(NAME, e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VcsError::fetch(NAME, stderr.trim().to_string()));
        }
        Ok(parse_ls_remote(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Git version control transport
pub struct GitVcs {
    policy: Arc<HttpPolicy>,
    auth: Arc<dyn CredentialProvider>,
    lister: Arc<dyn TagLister>,
}

impl GitVcs {
    /// Creates a new instance of the transport
    pub fn new(policy: Arc<HttpPolicy>, auth: Arc<dyn CredentialProvider>) -> Self {
        Self {
            policy,
            auth,
            lister: Arc::new(GitCommand),
        }
    }

    #[cfg(test)]
    fn with_lister(
        policy: Arc<HttpPolicy>,
        auth: Arc<dyn CredentialProvider>,
        lister: Arc<dyn TagLister>,
    ) -> Self {
        Self {
            policy,
            auth,
            lister,
        }
    }

    /// Tries each transport candidate in priority order and returns the
    /// first successful tag listing, or the last error
    async fn fetch_with_retry(&self, path: &str) -> Result<Tags, VcsError> {
        let mut last = VcsError::Repository;
        for raw_url in candidate_urls(path) {
            match self.fetch(&raw_url).await {
                Ok(tags) => return Ok(tags),
                Err(err) => last = err,
            }
        }
        Err(last)
    }

    /// One fetch attempt against a single candidate URL
    async fn fetch(&self, raw_url: &str) -> Result<Tags, VcsError> {
        let mut url = Url::parse(raw_url).map_err(|_| VcsError::Repository)?;
        // Security check, before anything touches the network.
        if !is_secure_scheme(url.scheme()) && !self.policy.allow_insecure(&repo_path(&url)) {
            return Err(VcsError::security_issue(url.as_str()));
        }
        if matches!(url.scheme(), "http" | "https") {
            if let Some(host) = url.host_str() {
                if let Some(auth) = self.auth.basic_auth(host) {
                    let _ = url.set_username(&auth.username);
                    let _ = url.set_password(Some(&auth.password));
                }
            }
        }
        self.lister.ls_remote(url.as_str()).await
    }
}

#[async_trait]
impl VcsSystem for GitVcs {
    /// Git is the fallback-of-last-resort transport: it claims every path
    fn can_fetch(&self, _path: &str) -> bool {
        true
    }

    async fn fetch_path(&self, path: &str) -> Result<Tags, VcsError> {
        if path.is_empty() {
            return Err(VcsError::Repository);
        }
        self.fetch_with_retry(&root_path(path)).await
    }

    async fn fetch_url(&self, url: &str) -> Result<Tags, VcsError> {
        if url.is_empty() {
            return Err(VcsError::Repository);
        }
        self.fetch(url).await
    }
}

/// Candidate URLs for a repository path, secure schemes first
fn candidate_urls(path: &str) -> Vec<String> {
    TRANSPORTS
        .iter()
        .map(|(scheme, ext)| format!("{}{}{}", scheme.prefix(), path, ext))
        .collect()
}

/// Truncates an import path to its repository root (first three
/// slash-separated segments), working around sub-packages
fn root_path(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() > STD_NUM_PARTS {
        parts[..STD_NUM_PARTS].join("/")
    } else {
        path.to_string()
    }
}

/// Parses `git ls-remote --tags` output into a tag set
///
/// Peeled refs (`^{}` suffix) are dropped; the remote's order is kept.
fn parse_ls_remote(stdout: &str) -> Tags {
    let mut tags = Tags::new();
    for line in stdout.lines() {
        let Some(refname) = line.split_whitespace().nth(1) else {
            continue;
        };
        let Some(short) = refname.strip_prefix(TAG_REF_PREFIX) else {
            continue;
        };
        if short.ends_with(PEELED_SUFFIX) {
            continue;
        }
        tags.push(Tag::parse(short));
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netrc::NoCredentials;
    use std::time::Duration;

    fn git(insecure_patterns: &str) -> GitVcs {
        let policy =
            Arc::new(HttpPolicy::new(Duration::from_secs(5), insecure_patterns).unwrap());
        GitVcs::new(policy, Arc::new(NoCredentials))
    }

    struct FakeLister {
        succeed_on: &'static str,
        calls: std::sync::Mutex<Vec<String>>,
    }

    impl FakeLister {
        fn new(succeed_on: &'static str) -> Arc<Self> {
            Arc::new(Self {
                succeed_on,
                calls: std::sync::Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TagLister for FakeLister {
        async fn ls_remote(&self, url: &str) -> Result<Tags, VcsError> {
            self.calls.lock().unwrap().push(url.to_string());
            if url.starts_with(self.succeed_on) {
                Ok(Tags::from(vec![Tag::parse("v1.2.0")]))
            } else {
                Err(VcsError::fetch(NAME, "connection refused"))
            }
        }
    }

    fn git_with(lister: Arc<FakeLister>) -> GitVcs {
        let policy = Arc::new(HttpPolicy::new(Duration::from_secs(5), "").unwrap());
        GitVcs::with_lister(policy, Arc::new(NoCredentials), lister)
    }

    #[test]
    fn test_can_fetch_everything() {
        let vcs = git("");
        assert!(vcs.can_fetch("example.com/group/pkg"));
        assert!(vcs.can_fetch(""));
    }

    #[test]
    fn test_candidate_urls_secure_first() {
        assert_eq!(
            candidate_urls("example.com/group/pkg"),
            vec![
                "https://example.com/group/pkg",
                "ssh://git@example.com/group/pkg.git",
                "git://example.com/group/pkg.git",
                "http://example.com/group/pkg",
            ]
        );
    }

    #[test]
    fn test_root_path_truncates_sub_packages() {
        assert_eq!(
            root_path("example.com/group/pkg/sub/deep"),
            "example.com/group/pkg"
        );
        assert_eq!(root_path("example.com/group/pkg"), "example.com/group/pkg");
        assert_eq!(root_path("example.com/pkg"), "example.com/pkg");
    }

    #[test]
    fn test_parse_ls_remote_keeps_only_tags() {
        let out = "abc123\trefs/heads/main\n\
                   def456\trefs/tags/v1.0.0\n\
                   def457\trefs/tags/v1.0.0^{}\n\
                   aaa111\trefs/tags/v1.1.0\n";
        let tags = parse_ls_remote(out);
        assert_eq!(tags.len(), 2);
        assert_eq!(tags.latest().unwrap().canonical(), "v1.1.0");
    }

    #[test]
    fn test_parse_ls_remote_empty() {
        assert!(parse_ls_remote("").is_empty());
    }

    #[tokio::test]
    async fn test_first_successful_candidate_stops_the_chain() {
        let lister = FakeLister::new("https://");
        let vcs = git_with(lister.clone());
        let tags = vcs.fetch_path("example.com/group/pkg").await.unwrap();
        assert_eq!(tags.latest().unwrap().canonical(), "v1.2.0");
        assert_eq!(lister.calls(), vec!["https://example.com/group/pkg"]);
    }

    #[tokio::test]
    async fn test_failed_candidate_falls_back_in_order() {
        let lister = FakeLister::new("ssh://");
        let vcs = git_with(lister.clone());
        let tags = vcs.fetch_path("example.com/group/pkg").await.unwrap();
        assert!(!tags.is_empty());
        assert_eq!(
            lister.calls(),
            vec![
                "https://example.com/group/pkg",
                "ssh://git@example.com/group/pkg.git",
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_empty_path_is_invalid_repository() {
        let vcs = git("");
        let err = vcs.fetch_path("").await.unwrap_err();
        assert!(matches!(err, VcsError::Repository));
    }

    #[tokio::test]
    async fn test_fetch_unparsable_url_is_invalid_repository() {
        let vcs = git("");
        let err = vcs.fetch_url("not a url").await.unwrap_err();
        assert!(matches!(err, VcsError::Repository));
    }

    #[tokio::test]
    async fn test_insecure_scheme_refused_before_any_network_call() {
        let vcs = git("");
        let err = vcs
            .fetch_url("git://example.com/group/pkg.git")
            .await
            .unwrap_err();
        assert!(matches!(err, VcsError::SecurityIssue { .. }));
    }

    #[tokio::test]
    async fn test_insecure_scheme_allowed_with_matching_pattern() {
        // The gate passes; the fetch then fails on the (unreachable) remote.
        let vcs = git("example.invalid/*");
        let err = vcs
            .fetch_url("http://example.invalid/group/pkg")
            .await
            .unwrap_err();
        assert!(matches!(err, VcsError::Fetch { vcs: "git", .. }));
    }
}
