//! pyproject.toml descriptor parsing and serialization

use crate::ManifestResult;
use camino::Utf8Path;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sprout_core::error::SproutError;
use sprout_core::types::{is_valid_name, Contributor, Requirement, SpecifierSet, Version};

/// Dynamic fields this dialect can resolve
pub const SUPPORTED_DYNAMIC: &[&str] = &["readme", "dependencies"];

/// Complete pyproject.toml descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PyProject {
    /// Build-system section
    #[serde(rename = "build-system")]
    pub build_system: BuildSystem,

    /// Static project metadata
    pub project: ProjectSection,

    /// Tool-specific configuration
    #[serde(default, skip_serializing_if = "ToolSection::is_empty")]
    pub tool: ToolSection,
}

/// Build-tool dependency declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSystem {
    /// Build-time tool requirements ("setuptools>=61.0")
    pub requires: Vec<String>,

    /// Backend entry point name
    #[serde(rename = "build-backend", skip_serializing_if = "Option::is_none")]
    pub build_backend: Option<String>,
}

impl BuildSystem {
    /// Parse the requires entries into typed requirements
    pub fn requirements(&self) -> ManifestResult<Vec<Requirement>> {
        self.requires.iter().map(|entry| entry.parse()).collect()
    }
}

/// Static package metadata section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSection {
    /// Package name (required)
    pub name: String,

    /// Fields resolved from auxiliary files rather than inlined
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dynamic: Vec<String>,

    /// Package version (required; never dynamic in this dialect)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,

    /// Short one-line description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// License reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,

    /// Keywords for discovery
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,

    /// Minimum language-runtime version constraint
    #[serde(rename = "requires-python", skip_serializing_if = "Option::is_none")]
    pub requires_python: Option<SpecifierSet>,

    /// Author identity records
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<Contributor>,

    /// Maintainer identity records
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maintainers: Vec<Contributor>,

    /// Classifier tags (maturity, audience, topic)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classifiers: Vec<String>,

    /// Informational links (Homepage, Repository, Issues, ...)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub urls: IndexMap<String, String>,
}

/// License reference: SPDX expression, file reference, or inline text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum License {
    Expression(String),
    File { file: String },
    Text { text: String },
}

/// Tool-specific configuration sections
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToolSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setuptools: Option<SetuptoolsSection>,
}

impl ToolSection {
    fn is_empty(&self) -> bool {
        self.setuptools.is_none()
    }
}

/// setuptools-dialect packaging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetuptoolsSection {
    /// Source-root mapping ("" = "src")
    #[serde(
        default,
        rename = "package-dir",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub package_dir: IndexMap<String, String>,

    /// Whether non-code files are bundled into the distribution
    #[serde(default = "default_true", rename = "include-package-data")]
    pub include_package_data: bool,

    /// Auxiliary-file indirections for dynamic metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic: Option<DynamicSection>,

    /// Package selection configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<PackagesSection>,
}

/// File sources backing the declared dynamic fields
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DynamicSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readme: Option<FileSource>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<FileSource>,
}

/// Indirection to exactly one auxiliary file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSource {
    pub file: String,
}

/// Package selection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackagesSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub find: Option<FindSection>,
}

/// Package-discovery configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindSection {
    /// Root directories to scan for packages
    #[serde(default = "default_where", rename = "where")]
    pub where_dirs: Vec<String>,

    /// Dotted-name patterns selecting packages to bundle
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Dotted-name patterns excluded from the bundle
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    /// Whether directories without an init module count as packages
    #[serde(default)]
    pub namespaces: bool,
}

impl Default for FindSection {
    fn default() -> Self {
        Self {
            where_dirs: default_where(),
            include: default_include(),
            exclude: Vec::new(),
            namespaces: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_where() -> Vec<String> {
    vec!["src".to_string()]
}

fn default_include() -> Vec<String> {
    vec!["*".to_string()]
}

impl PyProject {
    /// Effective discovery configuration, falling back to the dialect defaults
    pub fn find_section(&self) -> FindSection {
        self.tool
            .setuptools
            .as_ref()
            .and_then(|s| s.packages.as_ref())
            .and_then(|p| p.find.clone())
            .unwrap_or_default()
    }

    /// File sources for dynamic fields, when configured
    pub fn dynamic_section(&self) -> Option<&DynamicSection> {
        self.tool.setuptools.as_ref().and_then(|s| s.dynamic.as_ref())
    }

    /// Check if a metadata field is declared dynamic
    pub fn is_dynamic(&self, field: &str) -> bool {
        self.project.dynamic.iter().any(|f| f == field)
    }
}

/// Parse a TOML string into a validated descriptor
pub fn parse_pyproject(content: &str) -> ManifestResult<PyProject> {
    // toml_edit first for positioned syntax errors
    let _ = content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| SproutError::Parse {
            message: format!("TOML syntax error: {}", e),
        })?;

    // Then serde for type safety
    let document: PyProject = toml::from_str(content).map_err(|e| SproutError::Parse {
        message: format!("TOML parsing error: {}", e),
    })?;

    validate_document(&document)?;

    Ok(document)
}

/// Serialize a descriptor back to TOML
pub fn serialize_pyproject(document: &PyProject) -> ManifestResult<String> {
    toml::to_string_pretty(document).map_err(|e| SproutError::Parse {
        message: format!("TOML serialization error: {}", e),
    })
}

/// Load and parse a descriptor from a file path
pub async fn load_from_file(path: &Utf8Path) -> ManifestResult<PyProject> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SproutError::io(format!("Failed to read {}", path), e))?;

    tracing::debug!("parsing descriptor at {}", path);

    parse_pyproject(&content).map_err(|e| match e {
        SproutError::Parse { message } => SproutError::Parse {
            message: format!("In file {}: {}", path, message),
        },
        SproutError::Validation { field, reason } => SproutError::Validation {
            field,
            reason: format!("In file {}: {}", path, reason),
        },
        other => other,
    })
}

/// Validate descriptor completeness and invariants
pub fn validate_document(document: &PyProject) -> ManifestResult<()> {
    let project = &document.project;

    if project.name.is_empty() {
        return Err(validation("project.name", "package name is required"));
    }

    if !is_valid_name(&project.name) {
        return Err(validation(
            "project.name",
            &format!(
                "invalid package name '{}': names use letters, digits, '-', '_', '.' and start and end alphanumeric",
                project.name
            ),
        ));
    }

    // Dynamic declarations: recognized, unique, and backed by a file source
    let mut seen = Vec::new();
    for field in &project.dynamic {
        if !SUPPORTED_DYNAMIC.contains(&field.as_str()) {
            return Err(validation(
                "project.dynamic",
                &format!("unsupported dynamic field '{}'", field),
            ));
        }
        if seen.contains(&field.as_str()) {
            return Err(validation(
                "project.dynamic",
                &format!("dynamic field '{}' listed twice", field),
            ));
        }
        seen.push(field.as_str());

        let source = match (field.as_str(), document.dynamic_section()) {
            ("readme", Some(dynamic)) => dynamic.readme.as_ref(),
            ("dependencies", Some(dynamic)) => dynamic.dependencies.as_ref(),
            _ => None,
        };
        if source.is_none() {
            return Err(validation(
                "tool.setuptools.dynamic",
                &format!("dynamic field '{}' has no file source", field),
            ));
        }
    }

    // File sources without a matching dynamic declaration
    if let Some(dynamic) = document.dynamic_section() {
        if dynamic.readme.is_some() && !document.is_dynamic("readme") {
            return Err(validation(
                "tool.setuptools.dynamic.readme",
                "file source configured but 'readme' is not declared dynamic",
            ));
        }
        if dynamic.dependencies.is_some() && !document.is_dynamic("dependencies") {
            return Err(validation(
                "tool.setuptools.dynamic.dependencies",
                "file source configured but 'dependencies' is not declared dynamic",
            ));
        }
    }

    if project.version.is_none() {
        return Err(validation(
            "project.version",
            "a static version is required",
        ));
    }

    for (index, contributor) in project
        .authors
        .iter()
        .chain(project.maintainers.iter())
        .enumerate()
    {
        if !contributor.is_identified() {
            return Err(validation(
                "project.authors",
                &format!("identity record {} has neither name nor email", index),
            ));
        }
    }

    // Build requirements must parse
    if let Err(e) = document.build_system.requirements() {
        return Err(validation("build-system.requires", &e.to_string()));
    }

    // Discovery patterns must be valid globs
    let find = document.find_section();
    for pattern in find.include.iter().chain(find.exclude.iter()) {
        if let Err(e) = glob::Pattern::new(pattern) {
            return Err(validation(
                "tool.setuptools.packages.find",
                &format!("invalid pattern '{}': {}", pattern, e),
            ));
        }
    }

    Ok(())
}

fn validation(field: &str, reason: &str) -> SproutError {
    SproutError::Validation {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_DESCRIPTOR: &str = r#"
[build-system]
requires = ["setuptools>=61.0"]
build-backend = "setuptools.build_meta"

[project]
name = "post_tracking"
dynamic = ["readme", "dependencies"]
version = "0.1.0"
description = "Post tracking code for use with a custom low-cost imaging platform"
license = { file = "LICENSE" }
keywords = ["tracking", "timelapse", "imaging"]
requires-python = ">=3.10"
authors = [{ name = "A. Maintainer", email = "maintainer@example.org" }]
maintainers = [{ name = "A. Maintainer" }]
classifiers = [
    "Development Status :: 4 - Beta",
    "Intended Audience :: Science/Research",
]

[project.urls]
Homepage = "https://example.org/post-tracking"
Repository = "https://github.com/example/post-tracking"
Issues = "https://github.com/example/post-tracking/issues"

[tool.setuptools]
package-dir = { "" = "src" }
include-package-data = true

[tool.setuptools.dynamic]
readme = { file = "README.md" }
dependencies = { file = "requirements.txt" }

[tool.setuptools.packages.find]
where = ["src"]
include = ["post_tracking*"]
exclude = []
namespaces = false
"#;

    #[test]
    fn test_parse_minimal_descriptor() {
        let toml = r#"
[build-system]
requires = ["setuptools>=61.0"]

[project]
name = "post_tracking"
version = "0.1.0"
"#;

        let document = parse_pyproject(toml).unwrap();
        assert_eq!(document.project.name, "post_tracking");
        assert_eq!(document.project.version.as_ref().unwrap().to_string(), "0.1.0");
        assert!(document.tool.is_empty());
    }

    #[test]
    fn test_parse_full_descriptor() {
        let document = parse_pyproject(FULL_DESCRIPTOR).unwrap();

        assert_eq!(document.build_system.requires, vec!["setuptools>=61.0"]);
        assert_eq!(
            document.build_system.build_backend.as_deref(),
            Some("setuptools.build_meta")
        );
        assert!(document.is_dynamic("readme"));
        assert!(document.is_dynamic("dependencies"));
        assert_eq!(document.project.urls.len(), 3);
        assert_eq!(
            document.project.urls.get("Homepage").unwrap(),
            "https://example.org/post-tracking"
        );
        assert!(matches!(
            document.project.license,
            Some(License::File { .. })
        ));

        let find = document.find_section();
        assert_eq!(find.where_dirs, vec!["src"]);
        assert_eq!(find.include, vec!["post_tracking*"]);
        assert!(!find.namespaces);
    }

    #[test]
    fn test_requires_python_is_typed() {
        let document = parse_pyproject(FULL_DESCRIPTOR).unwrap();
        let requires_python = document.project.requires_python.unwrap();

        assert!(requires_python.contains(&"3.10".parse().unwrap()));
        assert!(!requires_python.contains(&"3.9".parse().unwrap()));
    }

    #[test]
    fn test_find_section_defaults() {
        let toml = r#"
[build-system]
requires = ["setuptools>=61.0"]

[project]
name = "post_tracking"
version = "0.1.0"
"#;

        let document = parse_pyproject(toml).unwrap();
        let find = document.find_section();
        assert_eq!(find.where_dirs, vec!["src"]);
        assert_eq!(find.include, vec!["*"]);
        assert!(find.exclude.is_empty());
    }

    #[test]
    fn test_invalid_package_name() {
        let toml = r#"
[build-system]
requires = []

[project]
name = "-bad-"
version = "0.1.0"
"#;

        assert!(parse_pyproject(toml).is_err());
    }

    #[test]
    fn test_missing_version() {
        let toml = r#"
[build-system]
requires = []

[project]
name = "post_tracking"
"#;

        let err = parse_pyproject(toml).unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn test_dynamic_without_file_source() {
        let toml = r#"
[build-system]
requires = []

[project]
name = "post_tracking"
version = "0.1.0"
dynamic = ["readme"]
"#;

        let err = parse_pyproject(toml).unwrap_err();
        assert!(err.to_string().contains("readme"));
    }

    #[test]
    fn test_file_source_without_dynamic_declaration() {
        let toml = r#"
[build-system]
requires = []

[project]
name = "post_tracking"
version = "0.1.0"

[tool.setuptools.dynamic]
readme = { file = "README.md" }
"#;

        assert!(parse_pyproject(toml).is_err());
    }

    #[test]
    fn test_unsupported_dynamic_field() {
        let toml = r#"
[build-system]
requires = []

[project]
name = "post_tracking"
version = "0.1.0"
dynamic = ["version"]
"#;

        let err = parse_pyproject(toml).unwrap_err();
        assert!(err.to_string().contains("unsupported"));
    }

    #[test]
    fn test_invalid_build_requirement() {
        let toml = r#"
[build-system]
requires = ["setuptools>="]

[project]
name = "post_tracking"
version = "0.1.0"
"#;

        assert!(parse_pyproject(toml).is_err());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = parse_pyproject("[project\nname = ").unwrap_err();
        assert!(matches!(err, SproutError::Parse { .. }));
    }

    #[test]
    fn test_round_trip_serialization() {
        let document = parse_pyproject(FULL_DESCRIPTOR).unwrap();
        let serialized = serialize_pyproject(&document).unwrap();
        let reparsed = parse_pyproject(&serialized).unwrap();

        assert_eq!(document, reparsed);
    }
}
