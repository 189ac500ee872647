//! modup - go.mod dependency freshness checker library
//!
//! This library provides the core functionality to check whether the
//! dependencies of a go.mod file are up to date:
//! - go.mod parsing and in-place editing (require, replace, exclude)
//! - remote tag listing over go-get discovery or direct git
//! - semver-based update advice (patch, minor or major policy)
//! - optional write-back of the advised versions

pub mod checker;
pub mod cli;
pub mod domain;
pub mod error;
pub mod manifest;
pub mod netrc;
pub mod output;
pub mod pathmatch;
pub mod vcs;
