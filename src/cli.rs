//! CLI argument parsing module for modup

use crate::checker::Config;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

/// Manifest file name expected in every checked directory
pub const MOD_FILENAME: &str = "go.mod";

/// Path argument asking for a recursive walk
const RECURSIVE: &str = "./...";

/// Environment variables providing insecure glob patterns
const GO_INSECURE: &str = "GOINSECURE";
const GO_PRIVATE: &str = "GOPRIVATE";

/// Parse a timeout string: bare seconds ("90") or a value with a unit
/// suffix ("90s", "2m", "1h")
fn parse_timeout(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }
    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 60 * 60)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        (s, 1)
    };
    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("invalid duration: {}", s))?;
    Ok(Duration::from_secs(num * multiplier))
}

/// Checks for updates of the dependencies in go.mod files
#[derive(Parser, Debug, Clone)]
#[command(name = "modup", about = "Check for updates of go.mod dependencies")]
pub struct CliArgs {
    /// go.mod files or directories to check; "./..." checks recursively
    #[arg(default_value = ".")]
    pub paths: Vec<String>,

    /// Exclude indirect modules
    #[arg(short = 'i', long)]
    pub exclude_indirect: bool,

    /// Ensure to have the latest major version
    #[arg(short = 'M', long)]
    pub major: bool,

    /// Ensure to have the latest couple major with minor version
    #[arg(short = 'm', long, conflicts_with = "major")]
    pub major_minor: bool,

    /// Comma-separated list of glob patterns of modules where a release tag
    /// is mandatory
    #[arg(short = 'r', long, default_value = "")]
    pub only_releases: String,

    /// Maximum time duration of a whole file check (e.g. 30s, 2m)
    #[arg(short = 't', long, value_parser = parse_timeout, default_value = "1m")]
    pub timeout: Duration,

    /// Force the update of the go.mod file as advised
    #[arg(short = 'f', long)]
    pub force_update: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Print the build version, then keep checking the given paths
    #[arg(short = 'V', long)]
    pub print_version: bool,
}

impl CliArgs {
    /// Builds the checker configuration from the arguments and environment
    pub fn config(&self) -> Config {
        Config {
            exclude_indirect: self.exclude_indirect,
            force_update: self.force_update,
            major: self.major,
            major_minor: self.major_minor,
            verbose: self.verbose,
            insecure_patterns: insecure_patterns_from_env(),
            only_releases: self.only_releases.clone(),
            timeout: self.timeout,
        }
    }

    /// Resolves the path arguments to concrete go.mod file locations
    pub fn mod_files(&self) -> Vec<PathBuf> {
        expand_paths(&self.paths)
    }
}

/// Joins the GOINSECURE and GOPRIVATE patterns into one glob list
pub fn insecure_patterns_from_env() -> String {
    patterns(&[
        std::env::var(GO_INSECURE).unwrap_or_default(),
        std::env::var(GO_PRIVATE).unwrap_or_default(),
    ])
}

fn patterns(values: &[String]) -> String {
    values
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// Maps each path argument to a go.mod location
///
/// Directories get the manifest file name appended; "./..." walks the
/// current directory for every go.mod it contains.
pub fn expand_paths(paths: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path == RECURSIVE {
            files.extend(walk_path(Path::new(".")));
        } else {
            files.push(mod_file_path(Path::new(path)));
        }
    }
    files
}

fn mod_file_path(path: &Path) -> PathBuf {
    if path.file_name().is_some_and(|n| n == MOD_FILENAME) {
        path.to_path_buf()
    } else {
        path.join(MOD_FILENAME)
    }
}

fn walk_path(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name() == MOD_FILENAME)
        .map(|entry| entry.into_path())
        .collect()
}
