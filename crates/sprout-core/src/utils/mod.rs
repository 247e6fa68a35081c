//! Utility functions and helpers.

pub mod path;

pub use path::{is_package_segment, is_safe_path, normalize_path, safe_join};
