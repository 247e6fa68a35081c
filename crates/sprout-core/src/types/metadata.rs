//! Assembled package metadata types.
//!
//! Defines the record a build frontend emits after combining the static
//! descriptor fields, the resolved dynamic fields, and package discovery.

use super::{Requirement, SpecifierSet, Version};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Author or maintainer identity record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Contributor {
    /// Create a contributor with a name only
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: None,
        }
    }

    /// Check that at least one identity field is present
    pub fn is_identified(&self) -> bool {
        self.name.is_some() || self.email.is_some()
    }
}

/// Metadata record for a distributable unit.
///
/// This is the output of metadata assembly and the input to downstream
/// installation tooling. Serializing and re-parsing the record yields an
/// identical value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreMetadata {
    pub name: String,

    pub version: Version,

    /// Short one-line description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Long description text resolved from the readme file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(
        rename = "description-content-type",
        skip_serializing_if = "Option::is_none"
    )]
    pub description_content_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    /// Name of a license file shipped with the distribution
    #[serde(rename = "license-file", skip_serializing_if = "Option::is_none")]
    pub license_file: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,

    #[serde(rename = "requires-python", skip_serializing_if = "Option::is_none")]
    pub requires_python: Option<SpecifierSet>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<Contributor>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maintainers: Vec<Contributor>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classifiers: Vec<String>,

    /// Informational links keyed by label (Homepage, Repository, Issues, ...)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub urls: IndexMap<String, String>,

    /// Dependency list resolved from the requirements file
    #[serde(
        default,
        rename = "requires-dist",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub requires_dist: Vec<Requirement>,

    /// Dotted names of the packages bundled into the distribution
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<String>,
}

impl CoreMetadata {
    /// Create a metadata record with required fields only
    pub fn new(name: String, version: Version) -> Self {
        Self {
            name,
            version,
            summary: None,
            description: None,
            description_content_type: None,
            license: None,
            license_file: None,
            keywords: Vec::new(),
            requires_python: None,
            authors: Vec::new(),
            maintainers: Vec::new(),
            classifiers: Vec::new(),
            urls: IndexMap::new(),
            requires_dist: Vec::new(),
            packages: Vec::new(),
        }
    }

    /// Check if this record has a specific keyword
    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k == keyword)
    }

    /// Check if this record bundles a specific package
    pub fn has_package(&self, package: &str) -> bool {
        self.packages.iter().any(|p| p == package)
    }
}
