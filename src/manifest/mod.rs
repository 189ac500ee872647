//! Module manifest access
//!
//! This module provides functionality to:
//! - Parse go.mod files (module, require, replace and exclude directives)
//! - List direct and indirect dependencies with replacements applied
//! - Rewrite require and replace versions in place, preserving layout
//! - Detect whether a manifest actually changed before saving it

mod go_mod;

pub use go_mod::GoModFile;

use crate::domain::Dependency;
use crate::error::ManifestError;
use std::path::PathBuf;

/// A dependency manifest that can be inspected and edited in memory
pub trait ModFile: Send + Sync {
    /// Returns the module path declared by the manifest
    fn module(&self) -> String;

    /// Returns the location of the manifest on disk
    fn name(&self) -> PathBuf;

    /// Lists the required modules, with replacements applied
    fn dependencies(&self) -> Vec<Dependency>;

    /// Sets the version of a required module
    fn update_require(&self, path: &str, version: &str) -> Result<(), ManifestError>;

    /// Sets the target version of a replace directive matching the module
    fn update_replace(&self, old_path: &str, new_version: &str) -> Result<(), ManifestError>;

    /// Renders the manifest, failing with `NotModified` when nothing changed
    fn format(&self) -> Result<String, ManifestError>;
}
