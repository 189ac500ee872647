//! Basic-auth credentials from the .netrc auto-login file
//!
//! The file behind the `NETRC` environment variable is used when set,
//! otherwise `~/.netrc`. A missing file is not an error; the provider is
//! simply empty. See
//! https://www.gnu.org/software/inetutils/manual/html_node/The-_002enetrc-file.html

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Username and password pair for one host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// Looks up basic-auth credentials for a host
pub trait CredentialProvider: Send + Sync {
    /// Returns the credentials for this hostname, if any
    fn basic_auth(&self, host: &str) -> Option<BasicAuth>;
}

/// Credentials parsed from a .netrc file
#[derive(Debug, Clone, Default)]
pub struct Netrc {
    machines: HashMap<String, BasicAuth>,
    default: Option<BasicAuth>,
}

impl Netrc {
    /// Loads the .netrc file from `$NETRC` or the user home directory
    ///
    /// A missing file yields an empty provider; only read failures on an
    /// existing file are reported.
    pub fn load() -> std::io::Result<Self> {
        let path = match env::var_os("NETRC") {
            Some(p) => PathBuf::from(p),
            None => match dirs::home_dir() {
                Some(home) => home.join(".netrc"),
                None => return Ok(Netrc::default()),
            },
        };
        if !path.exists() {
            return Ok(Netrc::default());
        }
        Ok(Self::parse(&fs::read_to_string(path)?))
    }

    /// Parses netrc content: `machine`/`default` blocks with `login` and
    /// `password` tokens; macro definitions are skipped and unknown tokens
    /// are ignored
    pub fn parse(content: &str) -> Self {
        let mut rc = Netrc::default();
        let mut current: Option<String> = None;
        let mut login = String::new();
        let mut password = String::new();

        let mut flush = |machine: &Option<String>, login: &mut String, password: &mut String, rc: &mut Netrc| {
            if login.is_empty() && password.is_empty() {
                return;
            }
            let auth = BasicAuth {
                username: std::mem::take(login),
                password: std::mem::take(password),
            };
            match machine {
                Some(host) => {
                    rc.machines.insert(host.clone(), auth);
                }
                None => rc.default = Some(auth),
            }
        };

        let mut lines = content.lines();
        while let Some(line) = lines.next() {
            let mut tokens = line.split_whitespace();
            while let Some(tok) = tokens.next() {
                match tok {
                    "machine" => {
                        flush(&current, &mut login, &mut password, &mut rc);
                        current = tokens.next().map(str::to_string);
                    }
                    "default" => {
                        flush(&current, &mut login, &mut password, &mut rc);
                        current = None;
                    }
                    "login" => login = tokens.next().unwrap_or_default().to_string(),
                    "password" => password = tokens.next().unwrap_or_default().to_string(),
                    // A macro body runs to the first blank line; nothing in
                    // it is a credential token.
                    "macdef" => {
                        for body in lines.by_ref() {
                            if body.trim().is_empty() {
                                break;
                            }
                        }
                        break;
                    }
                    _ => {}
                }
            }
        }
        flush(&current, &mut login, &mut password, &mut rc);
        rc
    }
}

impl CredentialProvider for Netrc {
    fn basic_auth(&self, host: &str) -> Option<BasicAuth> {
        self.machines
            .get(host)
            .or(self.default.as_ref())
            .cloned()
    }
}

/// A provider with no credentials at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn basic_auth(&self, _host: &str) -> Option<BasicAuth> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_machine() {
        let rc = Netrc::parse("machine example.com login bob password s3cret");
        let auth = rc.basic_auth("example.com").unwrap();
        assert_eq!(auth.username, "bob");
        assert_eq!(auth.password, "s3cret");
    }

    #[test]
    fn test_parse_multiline_and_multiple_machines() {
        let rc = Netrc::parse(
            "machine one.example.com\n  login a\n  password pa\nmachine two.example.com\n  login b\n  password pb\n",
        );
        assert_eq!(rc.basic_auth("one.example.com").unwrap().username, "a");
        assert_eq!(rc.basic_auth("two.example.com").unwrap().username, "b");
    }

    #[test]
    fn test_default_entry_is_fallback() {
        let rc = Netrc::parse("machine a.example login x password px default login d password pd");
        assert_eq!(rc.basic_auth("a.example").unwrap().username, "x");
        assert_eq!(rc.basic_auth("unknown.example").unwrap().username, "d");
    }

    #[test]
    fn test_unknown_host_without_default() {
        let rc = Netrc::parse("machine a.example login x password px");
        assert!(rc.basic_auth("b.example").is_none());
    }

    #[test]
    fn test_macdef_body_is_not_parsed() {
        let rc = Netrc::parse(
            "machine real.example login bob password pb\nmacdef init\nmachine fake.example login mallory password evil\n\nmachine other.example login carol password pc\n",
        );
        assert_eq!(rc.basic_auth("real.example").unwrap().username, "bob");
        assert!(rc.basic_auth("fake.example").is_none());
        assert_eq!(rc.basic_auth("other.example").unwrap().username, "carol");
    }

    #[test]
    fn test_macdef_at_end_of_file() {
        let rc = Netrc::parse("machine a.example login x password px\nmacdef cleanup\nlogin y\npassword py");
        let auth = rc.basic_auth("a.example").unwrap();
        assert_eq!(auth.username, "x");
        assert_eq!(auth.password, "px");
        assert!(rc.default.is_none());
    }

    #[test]
    fn test_empty_content() {
        let rc = Netrc::parse("");
        assert!(rc.basic_auth("example.com").is_none());
    }

    #[test]
    fn test_no_credentials_provider() {
        assert!(NoCredentials.basic_auth("example.com").is_none());
    }
}
