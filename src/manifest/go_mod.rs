//! go.mod file handling
//!
//! Handles:
//! - module, require, replace and exclude directives (single and block form)
//! - `// indirect` markers on require entries
//! - replace directives overriding the required module and version
//! - in-place version rewrites that keep indentation and comments intact

use crate::domain::{Dependency, Tag};
use crate::error::ManifestError;
use crate::manifest::ModFile;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, Mutex};

// Regex for the module directive: module example.com/pkg
static MODULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^module\s+(\S+)\s*$").unwrap());

// Regex for a single require: require module/path v1.2.3 [// comment]
static SINGLE_REQUIRE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^require\s+(\S+)\s+(v\S+)\s*(//.*)?$").unwrap());

// Regex for a require block entry: module/path v1.2.3 [// comment]
static BLOCK_ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)\s+(v\S+)\s*(//.*)?$").unwrap());

// Regex for a replace body: old [vX] => new [vY]
static REPLACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)(?:\s+(v\S+))?\s*=>\s*(\S+)(?:\s+(v\S+))?\s*(//.*)?$").unwrap()
});

// Regex for an exclude body: module/path v1.2.3
static EXCLUDE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)\s+(v\S+)\s*$").unwrap());

/// Directive block the line cursor currently sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    None,
    Require,
    Replace,
    Exclude,
}

/// A replace directive with a versioned remote target
///
/// Filesystem replacements (no target version) are not updatable and are
/// dropped at parse time.
#[derive(Debug, Clone)]
struct Replace {
    old_path: String,
    new_path: String,
    new_version: String,
}

/// Parsed view of the manifest, rebuilt after every edit
#[derive(Debug, Default)]
struct Directives {
    module: Option<String>,
    requires: Vec<(String, String, bool)>,
    replaces: Vec<Replace>,
    excludes: HashMap<String, Vec<Tag>>,
}

/// A go.mod file held in memory until explicitly saved
#[derive(Debug)]
pub struct GoModFile {
    name: PathBuf,
    content: Mutex<String>,
    dirty: AtomicBool,
}

impl GoModFile {
    /// Reads and parses a go.mod file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ManifestError::read(path, e))?;
        Self::parse(path, &content)
    }

    /// Parses go.mod content attributed to the given location
    pub fn parse(name: impl Into<PathBuf>, content: &str) -> Result<Self, ManifestError> {
        let file = GoModFile {
            name: name.into(),
            content: Mutex::new(content.to_string()),
            dirty: AtomicBool::new(false),
        };
        if file.directives().module.is_none() {
            return Err(ManifestError::invalid("missing module directive"));
        }
        Ok(file)
    }

    fn directives(&self) -> Directives {
        let content = self.content.lock().unwrap_or_else(|e| e.into_inner());
        parse_directives(&content)
    }

    /// Rewrites the version token on the first line the matcher accepts
    ///
    /// Returns `MissingModule` when no line matches and leaves the dirty
    /// flag untouched when the version already has the requested value.
    fn rewrite<F>(&self, module: &str, matcher: F) -> Result<(), ManifestError>
    where
        F: Fn(Block, &str) -> Option<String>,
    {
        let mut content = self.content.lock().unwrap_or_else(|e| e.into_inner());
        let mut block = Block::None;
        let mut lines: Vec<String> = Vec::new();
        let mut found = false;
        for line in content.lines() {
            let trimmed = line.trim();
            block = next_block(block, trimmed);
            if !found {
                if let Some(new_line) = matcher(block, trimmed) {
                    // Preserve the line's indentation.
                    let indent = &line[..line.len() - line.trim_start().len()];
                    if new_line != trimmed {
                        lines.push(format!("{}{}", indent, new_line));
                        self.dirty.store(true, Ordering::Relaxed);
                    } else {
                        lines.push(line.to_string());
                    }
                    found = true;
                    continue;
                }
            }
            lines.push(line.to_string());
        }
        if !found {
            return Err(ManifestError::missing_module(module));
        }
        let mut updated = lines.join("\n");
        if content.ends_with('\n') {
            updated.push('\n');
        }
        *content = updated;
        Ok(())
    }
}

impl ModFile for GoModFile {
    fn module(&self) -> String {
        self.directives().module.unwrap_or_default()
    }

    fn name(&self) -> PathBuf {
        self.name.clone()
    }

    fn dependencies(&self) -> Vec<Dependency> {
        let directives = self.directives();
        directives
            .requires
            .iter()
            .map(|(path, version, indirect)| {
                let replace = directives.replaces.iter().find(|r| r.old_path == *path);
                let mut dep = match replace {
                    Some(r) => Dependency::new(&r.new_path, &r.new_version).replacement(),
                    None => Dependency::new(path, version),
                };
                if *indirect {
                    dep = dep.indirect();
                }
                if let Some(excluded) = directives.excludes.get(&dep.path) {
                    dep.excluded = excluded.clone();
                }
                dep
            })
            .collect()
    }

    fn update_require(&self, path: &str, version: &str) -> Result<(), ManifestError> {
        self.rewrite(path, |block, line| match block {
            Block::Require => {
                let caps = BLOCK_ENTRY_RE.captures(line)?;
                (&caps[1] == path).then(|| rebuild_entry(None, path, version, caps.get(3)))
            }
            Block::None => {
                let caps = SINGLE_REQUIRE_RE.captures(line)?;
                (&caps[1] == path)
                    .then(|| rebuild_entry(Some("require"), path, version, caps.get(3)))
            }
            _ => None,
        })
    }

    fn update_replace(&self, old_path: &str, new_version: &str) -> Result<(), ManifestError> {
        self.rewrite(old_path, |block, line| {
            let body = match block {
                Block::Replace => line,
                Block::None => line.strip_prefix("replace ")?.trim_start(),
                _ => return None,
            };
            let caps = REPLACE_RE.captures(body)?;
            // The caller may address the directive by either of its sides;
            // local filesystem targets carry no version and stay untouched.
            if (&caps[1] != old_path && &caps[3] != old_path) || caps.get(4).is_none() {
                return None;
            }
            let mut rebuilt = match caps.get(2) {
                Some(old_version) => format!(
                    "{} {} => {} {}",
                    &caps[1],
                    old_version.as_str(),
                    &caps[3],
                    new_version
                ),
                None => format!("{} => {} {}", &caps[1], &caps[3], new_version),
            };
            if block == Block::None {
                rebuilt = format!("replace {}", rebuilt);
            }
            if let Some(comment) = caps.get(5) {
                rebuilt = format!("{} {}", rebuilt, comment.as_str());
            }
            Some(rebuilt)
        })
    }

    fn format(&self) -> Result<String, ManifestError> {
        if !self.dirty.load(Ordering::Relaxed) {
            return Err(ManifestError::NotModified);
        }
        let content = self.content.lock().unwrap_or_else(|e| e.into_inner());
        Ok(content.clone())
    }
}

fn next_block(current: Block, trimmed: &str) -> Block {
    match trimmed {
        "require (" => Block::Require,
        "replace (" => Block::Replace,
        "exclude (" => Block::Exclude,
        ")" => Block::None,
        _ => current,
    }
}

fn rebuild_entry(
    keyword: Option<&str>,
    path: &str,
    version: &str,
    comment: Option<regex::Match>,
) -> String {
    let mut line = match keyword {
        Some(keyword) => format!("{} {} {}", keyword, path, version),
        None => format!("{} {}", path, version),
    };
    if let Some(comment) = comment {
        line = format!("{} {}", line, comment.as_str());
    }
    line
}

fn parse_directives(content: &str) -> Directives {
    let mut directives = Directives::default();
    let mut block = Block::None;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        let next = next_block(block, trimmed);
        if next != block || trimmed == ")" {
            block = next;
            continue;
        }
        match block {
            Block::Require => parse_require(&mut directives, trimmed),
            Block::Replace => parse_replace(&mut directives, trimmed),
            Block::Exclude => parse_exclude(&mut directives, trimmed),
            Block::None => {
                if let Some(caps) = MODULE_RE.captures(trimmed) {
                    directives.module = Some(caps[1].to_string());
                } else if SINGLE_REQUIRE_RE.is_match(trimmed) {
                    let body = trimmed["require".len()..].trim_start();
                    parse_require(&mut directives, body);
                } else if let Some(body) = trimmed.strip_prefix("replace ") {
                    parse_replace(&mut directives, body.trim_start());
                } else if let Some(body) = trimmed.strip_prefix("exclude ") {
                    parse_exclude(&mut directives, body.trim_start());
                }
            }
        }
    }
    directives
}

fn parse_require(directives: &mut Directives, body: &str) {
    if let Some(caps) = BLOCK_ENTRY_RE.captures(body) {
        let indirect = caps
            .get(3)
            .is_some_and(|c| c.as_str().contains("indirect"));
        directives
            .requires
            .push((caps[1].to_string(), caps[2].to_string(), indirect));
    }
}

fn parse_replace(directives: &mut Directives, body: &str) {
    if let Some(caps) = REPLACE_RE.captures(body) {
        if let Some(new_version) = caps.get(4) {
            directives.replaces.push(Replace {
                old_path: caps[1].to_string(),
                new_path: caps[3].to_string(),
                new_version: new_version.as_str().to_string(),
            });
        }
    }
}

fn parse_exclude(directives: &mut Directives, body: &str) {
    if let Some(caps) = EXCLUDE_RE.captures(body) {
        directives
            .excludes
            .entry(caps[1].to_string())
            .or_default()
            .push(Tag::parse(&caps[2]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> GoModFile {
        GoModFile::parse("go.mod", content).unwrap()
    }

    #[test]
    fn test_module() {
        let file = parse("module example.com/myproject\n\ngo 1.21\n");
        assert_eq!(file.module(), "example.com/myproject");
    }

    #[test]
    fn test_missing_module_directive() {
        let err = GoModFile::parse("go.mod", "go 1.21\n").unwrap_err();
        assert!(matches!(err, ManifestError::Invalid { .. }));
    }

    #[test]
    fn test_parse_single_require() {
        let file = parse(
            "module example.com/myproject\n\nrequire github.com/pkg/errors v0.9.1\n",
        );
        let deps = file.dependencies();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].path, "github.com/pkg/errors");
        assert_eq!(deps[0].version.raw(), "v0.9.1");
        assert!(!deps[0].indirect);
    }

    #[test]
    fn test_parse_require_block_with_indirect() {
        let file = parse(
            r#"module example.com/myproject

go 1.21

require (
	github.com/pkg/errors v0.9.1
	golang.org/x/text v0.14.0 // indirect
)
"#,
        );
        let deps = file.dependencies();
        assert_eq!(deps.len(), 2);
        assert!(!deps[0].indirect);
        assert!(deps[1].indirect);
        assert_eq!(deps[1].path, "golang.org/x/text");
    }

    #[test]
    fn test_replace_overrides_require() {
        let file = parse(
            r#"module example.com/myproject

require github.com/old/lib v1.0.0

replace github.com/old/lib => github.com/new/lib v2.1.0
"#,
        );
        let deps = file.dependencies();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].path, "github.com/new/lib");
        assert_eq!(deps[0].version.raw(), "v2.1.0");
        assert!(deps[0].replacement);
    }

    #[test]
    fn test_local_replace_is_ignored() {
        let file = parse(
            r#"module example.com/myproject

require github.com/old/lib v1.0.0

replace github.com/old/lib => ../local-lib
"#,
        );
        let deps = file.dependencies();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].path, "github.com/old/lib");
        assert!(!deps[0].replacement);
    }

    #[test]
    fn test_excluded_versions_attached() {
        let file = parse(
            r#"module example.com/myproject

require github.com/pkg/errors v0.9.0

exclude github.com/pkg/errors v0.9.1
"#,
        );
        let deps = file.dependencies();
        assert_eq!(deps[0].excluded.len(), 1);
        assert_eq!(deps[0].excluded[0].raw(), "v0.9.1");
    }

    #[test]
    fn test_update_single_require() {
        let file = parse(
            "module example.com/myproject\n\nrequire github.com/pkg/errors v0.9.0\n",
        );
        file.update_require("github.com/pkg/errors", "v0.9.1")
            .unwrap();
        let out = file.format().unwrap();
        assert!(out.contains("require github.com/pkg/errors v0.9.1"));
        assert!(!out.contains("v0.9.0"));
    }

    #[test]
    fn test_update_block_entry_preserves_indent_and_comment() {
        let file = parse(
            r#"module example.com/myproject

require (
	github.com/pkg/errors v0.9.0
	golang.org/x/text v0.14.0 // indirect
)
"#,
        );
        file.update_require("golang.org/x/text", "v0.15.0").unwrap();
        let out = file.format().unwrap();
        assert!(out.contains("\tgolang.org/x/text v0.15.0 // indirect"));
        assert!(out.contains("\tgithub.com/pkg/errors v0.9.0"));
    }

    #[test]
    fn test_update_require_missing_module() {
        let file = parse(
            "module example.com/myproject\n\nrequire github.com/pkg/errors v0.9.0\n",
        );
        let err = file
            .update_require("github.com/absent/lib", "v1.0.0")
            .unwrap_err();
        assert!(matches!(err, ManifestError::MissingModule { .. }));
    }

    #[test]
    fn test_update_replace_by_either_side() {
        let content = r#"module example.com/myproject

require github.com/old/lib v1.0.0

replace github.com/old/lib => github.com/new/lib v2.0.0
"#;
        let file = parse(content);
        file.update_replace("github.com/new/lib", "v2.1.0").unwrap();
        assert!(file
            .format()
            .unwrap()
            .contains("replace github.com/old/lib => github.com/new/lib v2.1.0"));

        let file = parse(content);
        file.update_replace("github.com/old/lib", "v2.1.0").unwrap();
        assert!(file
            .format()
            .unwrap()
            .contains("replace github.com/old/lib => github.com/new/lib v2.1.0"));
    }

    #[test]
    fn test_update_replace_in_block() {
        let file = parse(
            r#"module example.com/myproject

require github.com/old/lib v1.0.0

replace (
	github.com/old/lib v1.0.0 => github.com/new/lib v2.0.0
)
"#,
        );
        file.update_replace("github.com/old/lib", "v2.1.0").unwrap();
        let out = file.format().unwrap();
        assert!(out.contains("\tgithub.com/old/lib v1.0.0 => github.com/new/lib v2.1.0"));
    }

    #[test]
    fn test_update_replace_skips_local_target() {
        let file = parse(
            r#"module example.com/myproject

require github.com/old/lib v1.0.0

replace github.com/old/lib => ../local-lib
"#,
        );
        let err = file
            .update_replace("github.com/old/lib", "v2.0.0")
            .unwrap_err();
        assert!(matches!(err, ManifestError::MissingModule { .. }));
    }

    #[test]
    fn test_format_without_edits_is_not_modified() {
        let file = parse(
            "module example.com/myproject\n\nrequire github.com/pkg/errors v0.9.0\n",
        );
        assert!(matches!(
            file.format().unwrap_err(),
            ManifestError::NotModified
        ));
    }

    #[test]
    fn test_update_to_same_version_is_not_modified() {
        let file = parse(
            "module example.com/myproject\n\nrequire github.com/pkg/errors v0.9.0\n",
        );
        file.update_require("github.com/pkg/errors", "v0.9.0")
            .unwrap();
        assert!(matches!(
            file.format().unwrap_err(),
            ManifestError::NotModified
        ));
    }
}
