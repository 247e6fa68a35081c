//! Build-requirement resolution.
//!
//! The `[build-system] requires` entries constrain the tools allowed to
//! build the package. The frontend declares which tools it provides and
//! at which versions; every requirement must be satisfied by one of them
//! before a build may proceed.

use crate::document::BuildSystem;
use crate::ManifestResult;
use sprout_core::error::SproutError;
use sprout_core::types::{normalize_name, Version};
use tracing::debug;

/// Version of the setuptools configuration dialect this frontend implements
pub const SETUPTOOLS_COMPAT: &str = "68.2.0";

/// A build tool the invoking frontend provides
#[derive(Debug, Clone, PartialEq)]
pub struct ProvidedTool {
    pub name: String,
    pub version: Version,
}

impl ProvidedTool {
    pub fn new(name: &str, version: Version) -> Self {
        Self {
            name: name.to_string(),
            version,
        }
    }
}

/// Check every build requirement against the provided tools.
///
/// A requirement naming a tool the frontend does not provide is an
/// unsatisfiable constraint; the build cannot proceed without it.
pub fn check_build_requires(
    build_system: &BuildSystem,
    provided: &[ProvidedTool],
) -> ManifestResult<()> {
    for requirement in build_system.requirements()? {
        let wanted = requirement.normalized_name();
        let tool = provided
            .iter()
            .find(|tool| normalize_name(&tool.name) == wanted);

        match tool {
            Some(tool) if requirement.specifiers.contains(&tool.version) => {
                debug!(
                    "build requirement '{}' satisfied by {} {}",
                    requirement, tool.name, tool.version
                );
            },
            Some(tool) => {
                return Err(SproutError::Constraint {
                    tool: tool.name.clone(),
                    installed: tool.version.to_string(),
                    required: requirement.to_string(),
                });
            },
            None => {
                return Err(SproutError::Constraint {
                    tool: requirement.name.clone(),
                    installed: "not provided".to_string(),
                    required: requirement.to_string(),
                });
            },
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_system(requires: &[&str]) -> BuildSystem {
        BuildSystem {
            requires: requires.iter().map(|s| s.to_string()).collect(),
            build_backend: Some("setuptools.build_meta".to_string()),
        }
    }

    fn provided() -> Vec<ProvidedTool> {
        vec![ProvidedTool::new(
            "setuptools",
            SETUPTOOLS_COMPAT.parse().unwrap(),
        )]
    }

    #[test]
    fn test_satisfied_requirement() {
        let result = check_build_requires(&build_system(&["setuptools>=61.0"]), &provided());
        assert!(result.is_ok());
    }

    #[test]
    fn test_too_old_tool() {
        let old = vec![ProvidedTool::new("setuptools", Version::new(58, 0, 0))];

        let err = check_build_requires(&build_system(&["setuptools>=61.0"]), &old).unwrap_err();
        match err {
            SproutError::Constraint { tool, installed, .. } => {
                assert_eq!(tool, "setuptools");
                assert_eq!(installed, "58.0.0");
            },
            other => panic!("expected constraint error, got {:?}", other),
        }
    }

    #[test]
    fn test_unprovided_tool() {
        let err = check_build_requires(&build_system(&["maturin>=1.0"]), &provided()).unwrap_err();
        assert!(matches!(err, SproutError::Constraint { .. }));
    }

    #[test]
    fn test_name_matching_is_normalized() {
        let result = check_build_requires(&build_system(&["SetupTools>=61.0"]), &provided());
        assert!(result.is_ok());
    }

    #[test]
    fn test_empty_requires_is_ok() {
        let result = check_build_requires(&build_system(&[]), &provided());
        assert!(result.is_ok());
    }
}
