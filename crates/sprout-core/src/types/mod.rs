//! Core data types for the sprout workspace.

pub mod metadata;
pub mod requirement;
pub mod specifier;
pub mod version;

pub use metadata::{Contributor, CoreMetadata};
pub use requirement::{is_valid_name, normalize_name, Requirement};
pub use specifier::{CompareOp, Specifier, SpecifierSet};
pub use version::{PreRelease, PreTag, Version};
