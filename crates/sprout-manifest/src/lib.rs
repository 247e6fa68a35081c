//! Package descriptor handling for the sprout build frontend
//!
//! This crate handles parsing and validation of pyproject.toml descriptors
//! in the setuptools dialect, resolution of their dynamic fields and build
//! requirements, and assembly of the final metadata record.

pub mod document;
pub mod dynamic;
pub mod metadata;
pub mod requires;

// Re-export main types
pub use document::{
    parse_pyproject, serialize_pyproject, BuildSystem, FileSource, FindSection, License,
    ProjectSection, PyProject, SetuptoolsSection,
};
pub use dynamic::{DynamicValues, ResolvedReadme};
pub use metadata::assemble;
pub use requires::ProvidedTool;

use sprout_core::error::SproutError;

/// Result type for descriptor operations
pub type ManifestResult<T> = Result<T, SproutError>;
