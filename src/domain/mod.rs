//! Core domain models for modup
//!
//! This module contains the fundamental types used throughout the tool:
//! - Go-style semantic version tags and ordered tag collections
//! - Dependency entries read from a go.mod file
//! - Typed per-dependency check outcomes with severity levels

mod dependency;
mod message;
mod version;

pub use dependency::Dependency;
pub use message::{CheckMessage, Level};
pub use version::{Tag, Tags};
