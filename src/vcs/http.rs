//! Secure and insecure HTTP clients behind one policy
//!
//! The policy owns two reqwest clients:
//! - The secure client validates certificates and rejects any redirect from
//!   an HTTPS URL to a non-HTTPS URL (downgrade protection).
//! - The insecure client skips certificate validation and allows plaintext.
//!
//! The insecure client is only ever handed out for repository paths that
//! match a configured insecure pattern; callers must not reuse it elsewhere.

use crate::error::VcsError;
use crate::pathmatch;
use reqwest::{redirect, Client};
use std::time::Duration;

/// Default User-Agent header
const USER_AGENT: &str = concat!("modup/", env!("CARGO_PKG_VERSION"));

/// Redirect chain length accepted before giving up
const MAX_REDIRECTS: usize = 10;

const HTTPS: &str = "https";

/// Chooses a secure or insecure HTTP client per repository path
pub struct HttpPolicy {
    secure: Client,
    insecure: Client,
    insecure_patterns: String,
}

impl HttpPolicy {
    /// Builds the client pair with the given request timeout and the
    /// comma-separated glob list of repository paths allowed to go insecure
    pub fn new(timeout: Duration, insecure_patterns: &str) -> Result<Self, VcsError> {
        let secure = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .redirect(redirect::Policy::custom(|attempt| {
                let downgraded = attempt
                    .previous()
                    .first()
                    .is_some_and(|first| first.scheme() == HTTPS)
                    && attempt.url().scheme() != HTTPS;
                if downgraded {
                    attempt.error("redirected from a secure URL to an insecure URL")
                } else if attempt.previous().len() > MAX_REDIRECTS {
                    attempt.error("too many redirects")
                } else {
                    attempt.follow()
                }
            }))
            .build()
            .map_err(|e| VcsError::fetch("http", format!("failed to build client: {}", e)))?;

        let insecure = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| VcsError::fetch("http", format!("failed to build client: {}", e)))?;

        Ok(Self {
            secure,
            insecure,
            insecure_patterns: insecure_patterns.to_string(),
        })
    }

    /// Returns the client to use for this repository path
    pub fn client_for(&self, path: &str) -> &Client {
        if self.allow_insecure(path) {
            &self.insecure
        } else {
            &self.secure
        }
    }

    /// Reports whether this repository path opted into insecure transport
    pub fn allow_insecure(&self, path: &str) -> bool {
        pathmatch::matches(&self.insecure_patterns, path)
    }
}
