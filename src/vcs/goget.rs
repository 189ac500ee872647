//! go-get discovery transport
//!
//! Resolves a package import path to its underlying VCS and repository URL
//! using the go-get convention: an HTTP GET with `?go-get=1` whose response
//! head carries `<meta name="go-import" content="<root> <vcs> <repo>">`.
//! Discovered git targets are delegated to the direct git transport; any
//! other VCS kind is rejected with a typed error.
//!
//! The HTML scan is deliberately tolerant: malformed markup never aborts
//! discovery, the scan just stops at the first `<body>` start tag or
//! `</head>` end tag.

use crate::domain::Tags;
use crate::error::VcsError;
use crate::vcs::git::{self, GitVcs};
use crate::vcs::{is_secure_scheme, repo_path, HttpPolicy, Scheme, VcsSystem};
use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use url::Url;

/// Name of this VCS
pub const NAME: &str = "go-get";

/// Reserved discovery protocol constants. These address an external,
/// uncontrolled convention and must not be altered.
const QUERY_PARAM: &str = "go-get";
const QUERY_VALUE: &str = "1";
const META_ATTR: &str = "go-import";

/// Hosting providers served by the direct git transport instead
const KNOWN_HOSTS: [&str; 3] = ["github.com", "gitlab", "bitbucket"];

/// Charsets the scanner decodes transparently
const SUPPORTED_CHARSETS: [&str; 2] = ["utf-8", "ascii"];

// Tolerant tag tokenizer: start/end marker, tag name, raw attribute blob.
static HTML_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<\s*(/?)\s*([a-z][a-z0-9]*)((?:"[^"]*"|'[^']*'|[^<>"'])*)>"#).unwrap()
});

static HTML_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)([a-z][a-z0-9-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#).unwrap()
});

/// A discovery hop: the VCS kind and the repository remote behind a path
#[derive(Debug, Clone, PartialEq, Eq)]
struct NextHop {
    vcs: String,
    repo: String,
}

/// go-get version control transport
///
/// Uses discovery to find the remote properties behind a package, then
/// delegates to git.
pub struct GoGetVcs {
    policy: Arc<HttpPolicy>,
    git: Arc<GitVcs>,
}

impl GoGetVcs {
    /// Creates a new instance of the transport
    pub fn new(policy: Arc<HttpPolicy>, git: Arc<GitVcs>) -> Self {
        Self { policy, git }
    }

    /// Issues the discovery GET and scans the response head
    async fn discover(&self, raw_url: &str) -> Result<Option<NextHop>, VcsError> {
        let mut url = Url::parse(raw_url).map_err(|_| VcsError::Repository)?;
        url.query_pairs_mut().append_pair(QUERY_PARAM, QUERY_VALUE);
        let path = repo_path(&url);
        // Security check, before anything touches the network.
        if !is_secure_scheme(url.scheme()) && !self.policy.allow_insecure(&path) {
            return Err(VcsError::security_issue(url.as_str()));
        }
        let response = self
            .policy
            .client_for(&path)
            .get(url)
            .send()
            .await
            .map_err(|e| VcsError::fetch(NAME, e.to_string()))?;
        check_charset(response.headers())?;
        let body = response
            .text()
            .await
            .map_err(|e| VcsError::fetch(NAME, e.to_string()))?;
        Ok(parse_meta_go_import(&body))
    }

    /// Routes a discovered hop to the transport implementing its VCS kind
    async fn dispatch(&self, hop: Option<NextHop>) -> Result<Tags, VcsError> {
        match hop {
            Some(hop) if hop.vcs == git::NAME => self.git.fetch_url(&hop.repo).await,
            Some(hop) => Err(VcsError::UnsupportedSystem(hop.vcs)),
            None => Err(VcsError::System),
        }
    }
}

#[async_trait]
impl VcsSystem for GoGetVcs {
    /// Claims any non-empty path not served by a well-known hosting
    /// provider
    ///
    /// A coarse routing heuristic, kept as-is: self-hosted instances of
    /// those providers are misrouted to the direct git transport, which
    /// handles them anyway.
    fn can_fetch(&self, path: &str) -> bool {
        !path.is_empty() && !KNOWN_HOSTS.iter().any(|host| path.contains(host))
    }

    async fn fetch_path(&self, path: &str) -> Result<Tags, VcsError> {
        if path.is_empty() {
            return Err(VcsError::Repository);
        }
        let mut last = VcsError::Repository;
        for scheme in [Scheme::Https, Scheme::Http] {
            match self.discover(&format!("{}{}", scheme.prefix(), path)).await {
                Ok(hop) => return self.dispatch(hop).await,
                Err(err) => last = err,
            }
        }
        Err(last)
    }

    async fn fetch_url(&self, url: &str) -> Result<Tags, VcsError> {
        if url.is_empty() {
            return Err(VcsError::Repository);
        }
        let hop = self.discover(url).await?;
        self.dispatch(hop).await
    }
}

/// Rejects header-declared encodings the scanner cannot decode
fn check_charset(headers: &reqwest::header::HeaderMap) -> Result<(), VcsError> {
    let Some(content_type) = headers
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return Ok(());
    };
    let Some(charset) = content_type
        .split(';')
        .filter_map(|part| part.trim().strip_prefix("charset="))
        .next()
    else {
        return Ok(());
    };
    let charset = charset.trim_matches('"').to_ascii_lowercase();
    if SUPPORTED_CHARSETS.contains(&charset.as_str()) {
        Ok(())
    } else {
        Err(VcsError::UnsupportedCharset(charset))
    }
}

/// Scans an HTML document head for the go-import meta tag
///
/// Stops at the first `<body>` start tag or `</head>` end tag; returns the
/// first meta tag whose content splits into exactly three fields.
fn parse_meta_go_import(body: &str) -> Option<NextHop> {
    for caps in HTML_TAG_RE.captures_iter(body) {
        let closing = !caps[1].is_empty();
        let name = caps[2].to_ascii_lowercase();
        match (closing, name.as_str()) {
            (false, "body") | (true, "head") => return None,
            (false, "meta") => {}
            _ => continue,
        }
        let attrs = &caps[3];
        if attr_value(attrs, "name").as_deref() != Some(META_ATTR) {
            continue;
        }
        let content = attr_value(attrs, "content").unwrap_or_default();
        let fields: Vec<&str> = content.split_whitespace().collect();
        if fields.len() == 3 {
            return Some(NextHop {
                vcs: fields[1].to_string(),
                repo: fields[2].to_string(),
            });
        }
    }
    None
}

/// Extracts a named attribute value from a raw attribute blob
fn attr_value(attrs: &str, name: &str) -> Option<String> {
    HTML_ATTR_RE.captures_iter(attrs).find_map(|caps| {
        if !caps[1].eq_ignore_ascii_case(name) {
            return None;
        }
        caps.get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str().to_string())
    })
}
