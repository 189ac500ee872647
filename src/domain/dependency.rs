//! Dependency information structures

use crate::domain::Tag;

/// A single dependency declared by a go.mod file
///
/// Owned by the manifest; read-only to the resolution engine.
#[derive(Debug, Clone)]
pub struct Dependency {
    /// Module import path, e.g. `github.com/pkg/errors`
    pub path: String,
    /// Declared version
    pub version: Tag,
    /// Not directly imported by the root module (`// indirect`)
    pub indirect: bool,
    /// Resolved via a replace directive rather than a require
    pub replacement: bool,
    /// Versions the module owner explicitly excluded upstream
    pub excluded: Vec<Tag>,
}

impl Dependency {
    /// Creates a required dependency
    pub fn new(path: impl Into<String>, version: impl AsRef<str>) -> Self {
        Dependency {
            path: path.into(),
            version: Tag::parse(version.as_ref()),
            indirect: false,
            replacement: false,
            excluded: Vec::new(),
        }
    }

    /// Marks the dependency as indirect
    pub fn indirect(mut self) -> Self {
        self.indirect = true;
        self
    }

    /// Marks the dependency as coming from a replace directive
    pub fn replacement(mut self) -> Self {
        self.replacement = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_dependency_defaults() {
        let dep = Dependency::new("example.com/group/go", "v1.0.2");
        assert_eq!(dep.path, "example.com/group/go");
        assert_eq!(dep.version.canonical(), "v1.0.2");
        assert!(!dep.indirect);
        assert!(!dep.replacement);
        assert!(dep.excluded.is_empty());
    }

    #[test]
    fn test_builder_flags() {
        let dep = Dependency::new("example.com/pkg", "v0.1.0")
            .indirect()
            .replacement();
        assert!(dep.indirect);
        assert!(dep.replacement);
    }
}
