//! Go-style semantic version tags
//!
//! Handles the version grammar used by Go modules:
//! - Canonical tags: `v1.2.3`
//! - Shortened forms: `v1`, `v1.2` (padded to a full triple)
//! - Prerelease / pseudo-versions: `v0.0.0-20210101120000-abcdef123456`
//! - Build metadata: `v2.0.0+incompatible`
//!
//! Parsing never fails: an unparsable string yields an invalid [`Tag`]
//! whose canonical form is empty. Invalid tags compare equal to each other
//! and below any valid tag, so they can never win a latest-tag selection.

use regex::Regex;
use semver::Version;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

// Go version grammar: v<major>[.<minor>[.<patch>]][-prerelease][+build]
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v(\d+)(?:\.(\d+))?(?:\.(\d+))?(-[0-9A-Za-z.\-]+)?(\+[0-9A-Za-z.\-]+)?$").unwrap()
});

/// A parsed semantic version tag
#[derive(Debug, Clone)]
pub struct Tag {
    raw: String,
    version: Option<Version>,
}

impl Tag {
    /// Parses a version string into a Tag
    ///
    /// A leading `refs/tags/` style path prefix is stripped (only the part
    /// after the last slash is considered). Unparsable input yields an
    /// invalid Tag; callers must check [`Tag::is_valid`] before relying on
    /// the major/minor fields.
    pub fn parse(s: &str) -> Self {
        let raw = s.to_string();
        let short = match s.rfind('/') {
            Some(p) => &s[p + 1..],
            None => s,
        };
        let version = TAG_RE.captures(short).and_then(|caps| {
            let major = caps.get(1)?.as_str();
            let minor = caps.get(2).map_or("0", |m| m.as_str());
            let patch = caps.get(3).map_or("0", |m| m.as_str());
            let pre = caps.get(4).map_or("", |m| m.as_str());
            let build = caps.get(5).map_or("", |m| m.as_str());
            Version::parse(&format!("{}.{}.{}{}{}", major, minor, patch, pre, build)).ok()
        });
        Tag { raw, version }
    }

    /// The raw string this tag was parsed from
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns true if the string parsed as a semantic version
    pub fn is_valid(&self) -> bool {
        self.version.is_some()
    }

    /// Returns true only for a genuine release tag: valid, with neither
    /// prerelease nor build metadata (i.e. not a pseudo-version)
    pub fn is_tag(&self) -> bool {
        self.version
            .as_ref()
            .is_some_and(|v| v.pre.is_empty() && v.build.is_empty())
    }

    /// Canonical form `vMAJOR.MINOR.PATCH[-PRERELEASE]`, without build
    /// metadata; empty for an invalid tag
    pub fn canonical(&self) -> String {
        match &self.version {
            Some(v) if v.pre.is_empty() => format!("v{}.{}.{}", v.major, v.minor, v.patch),
            Some(v) => format!("v{}.{}.{}-{}", v.major, v.minor, v.patch, v.pre),
            None => String::new(),
        }
    }

    /// Major prefix `vN`; empty for an invalid tag
    pub fn major(&self) -> String {
        match &self.version {
            Some(v) => format!("v{}", v.major),
            None => String::new(),
        }
    }

    /// Major.minor prefix `vN.N`; empty for an invalid tag
    pub fn major_minor(&self) -> String {
        match &self.version {
            Some(v) => format!("v{}.{}", v.major, v.minor),
            None => String::new(),
        }
    }

    /// Prerelease suffix with its leading hyphen, or empty
    pub fn prerelease(&self) -> String {
        match &self.version {
            Some(v) if !v.pre.is_empty() => format!("-{}", v.pre),
            _ => String::new(),
        }
    }

    /// Build metadata suffix with its leading plus, or empty
    pub fn build(&self) -> String {
        match &self.version {
            Some(v) if !v.build.is_empty() => format!("+{}", v.build),
            _ => String::new(),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl Ord for Tag {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.version, &other.version) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            // Build metadata is ignored in precedence comparison.
            (Some(a), Some(b)) => a.cmp_precedence(b),
        }
    }
}

impl PartialOrd for Tag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Tag {}

/// An ordered collection of tags
#[derive(Debug, Clone, Default)]
pub struct Tags(Vec<Tag>);

impl Tags {
    /// Creates an empty collection
    pub fn new() -> Self {
        Tags(Vec::new())
    }

    /// Appends a tag
    pub fn push(&mut self, tag: Tag) {
        self.0.push(tag);
    }

    /// Number of tags in the collection
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the collection holds no tag
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the tags in their current order
    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.0.iter()
    }

    /// Returns the collection without the first tag comparing equal to the
    /// given one
    pub fn not(mut self, unwanted: &Tag) -> Self {
        if let Some(i) = self.0.iter().position(|t| t == unwanted) {
            self.0.remove(i);
        }
        self
    }

    /// Latest tag overall by semantic precedence
    pub fn latest(&self) -> Option<Tag> {
        let mut sorted = self.0.clone();
        sorted.sort();
        sorted.pop()
    }

    /// Latest tag sharing the given major prefix (`vN`)
    pub fn latest_minor(&self, major: &str) -> Option<Tag> {
        if major.is_empty() || self.0.is_empty() {
            return None;
        }
        let mut sorted = self.0.clone();
        sorted.sort();
        sorted.into_iter().filter(|t| t.major() == major).next_back()
    }

    /// Latest tag sharing the given major.minor prefix (`vN.N`)
    pub fn latest_patch(&self, major_minor: &str) -> Option<Tag> {
        if major_minor.is_empty() || self.0.is_empty() {
            return None;
        }
        let mut sorted = self.0.clone();
        sorted.sort();
        sorted
            .into_iter()
            .filter(|t| t.major_minor() == major_minor)
            .next_back()
    }
}

impl From<Vec<Tag>> for Tags {
    fn from(tags: Vec<Tag>) -> Self {
        Tags(tags)
    }
}

impl FromIterator<Tag> for Tags {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        Tags(iter.into_iter().collect())
    }
}

impl IntoIterator for Tags {
    type Item = Tag;
    type IntoIter = std::vec::IntoIter<Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
