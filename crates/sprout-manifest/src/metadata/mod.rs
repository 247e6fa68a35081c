//! Metadata assembly.
//!
//! Combines the static descriptor fields, the resolved dynamic values, and
//! the discovered package set into the metadata record handed to
//! downstream installation tooling.

use crate::document::{License, PyProject};
use crate::dynamic::DynamicValues;
use crate::ManifestResult;
use sprout_core::error::SproutError;
use sprout_core::types::CoreMetadata;
use tracing::debug;

/// Assemble the metadata record for a distributable unit.
///
/// An empty package set is fatal here: a distribution that bundles nothing
/// is broken even though discovery itself only warns.
pub fn assemble(
    document: &PyProject,
    dynamic: DynamicValues,
    packages: Vec<String>,
) -> ManifestResult<CoreMetadata> {
    let project = &document.project;

    let version = project.version.clone().ok_or_else(|| SproutError::Validation {
        field: "project.version".to_string(),
        reason: "a static version is required".to_string(),
    })?;

    if packages.is_empty() {
        let find = document.find_section();
        return Err(SproutError::EmptyDistribution {
            where_dirs: find.where_dirs.join(", "),
        });
    }

    let mut metadata = CoreMetadata::new(project.name.clone(), version);
    metadata.summary = project.description.clone();
    metadata.keywords = project.keywords.clone();
    metadata.requires_python = project.requires_python.clone();
    metadata.authors = project.authors.clone();
    metadata.maintainers = project.maintainers.clone();
    metadata.classifiers = project.classifiers.clone();
    metadata.urls = project.urls.clone();
    metadata.packages = packages;

    match &project.license {
        Some(License::Expression(expression)) => metadata.license = Some(expression.clone()),
        Some(License::Text { text }) => metadata.license = Some(text.clone()),
        Some(License::File { file }) => metadata.license_file = Some(file.clone()),
        None => {},
    }

    if let Some(readme) = dynamic.readme {
        metadata.description = Some(readme.text);
        metadata.description_content_type = Some(readme.content_type);
    }

    if let Some(dependencies) = dynamic.dependencies {
        metadata.requires_dist = dependencies;
    }

    debug!(
        "assembled metadata for {} {} ({} packages, {} dependencies)",
        metadata.name,
        metadata.version,
        metadata.packages.len(),
        metadata.requires_dist.len()
    );

    Ok(metadata)
}

/// Render an assembled record as TOML
pub fn render_toml(metadata: &CoreMetadata) -> ManifestResult<String> {
    toml::to_string_pretty(metadata).map_err(|e| SproutError::Parse {
        message: format!("metadata serialization error: {}", e),
    })
}

/// Render an assembled record as JSON
pub fn render_json(metadata: &CoreMetadata) -> ManifestResult<String> {
    serde_json::to_string_pretty(metadata).map_err(|e| SproutError::Parse {
        message: format!("metadata serialization error: {}", e),
    })
}

/// Re-parse a TOML rendering back into a record
pub fn parse_toml(content: &str) -> ManifestResult<CoreMetadata> {
    toml::from_str(content).map_err(|e| SproutError::Parse {
        message: format!("metadata parsing error: {}", e),
    })
}
