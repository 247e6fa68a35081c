//! Error types and result aliases for sprout operations.
//!
//! Provides a unified error type that covers all possible error conditions
//! across the sprout workspace with actionable error messages.

use thiserror::Error;

/// Unified error type for all sprout operations
#[derive(Error, Debug)]
pub enum SproutError {
    // Descriptor errors
    #[error("Failed to parse pyproject.toml: {message}")]
    Parse { message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    Validation { field: String, reason: String },

    // Build-requirement errors
    #[error("Build tool '{tool}' ({installed}) does not satisfy '{required}'")]
    Constraint {
        tool: String,
        installed: String,
        required: String,
    },

    // Dynamic-field errors
    #[error("Dynamic field '{field}' references a missing file: {path}")]
    MissingFile { field: String, path: String },

    // Discovery errors
    #[error("Package discovery matched no packages under {where_dirs}")]
    EmptyDistribution { where_dirs: String },

    // Identifier errors
    #[error("Invalid version '{input}': {reason}")]
    InvalidVersion { input: String, reason: String },

    #[error("Invalid version specifier '{input}': {reason}")]
    InvalidSpecifier { input: String, reason: String },

    #[error("Invalid requirement '{input}': {reason}")]
    InvalidRequirement { input: String, reason: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for sprout operations
pub type SproutResult<T> = Result<T, SproutError>;

impl SproutError {
    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Check if this error may be downgraded to a warning.
    ///
    /// Only the empty-distribution case qualifies; every other error is
    /// fatal to the invocation.
    pub fn is_warning(&self) -> bool {
        matches!(self, SproutError::EmptyDistribution { .. })
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            SproutError::Parse { .. } => {
                Some("Check the TOML syntax near the reported location")
            },
            SproutError::Constraint { .. } => {
                Some("Upgrade the build tool or relax the [build-system] requires entry")
            },
            SproutError::MissingFile { .. } => {
                Some("Create the referenced file or update [tool.setuptools.dynamic]")
            },
            SproutError::EmptyDistribution { .. } => {
                Some("Check the packages.find include/exclude patterns against the source layout")
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_error_display() {
        let err = SproutError::Constraint {
            tool: "setuptools".to_string(),
            installed: "58.0.0".to_string(),
            required: "setuptools>=61.0".to_string(),
        };

        let message = err.to_string();
        assert!(message.contains("setuptools"));
        assert!(message.contains("58.0.0"));
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_only_empty_distribution_is_warning() {
        let empty = SproutError::EmptyDistribution {
            where_dirs: "src".to_string(),
        };
        assert!(empty.is_warning());

        let missing = SproutError::MissingFile {
            field: "readme".to_string(),
            path: "README.md".to_string(),
        };
        assert!(!missing.is_warning());
    }
}
