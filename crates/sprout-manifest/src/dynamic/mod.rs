//! Dynamic metadata resolution.
//!
//! Dynamic fields are metadata values supplied by auxiliary files instead
//! of being inlined in the descriptor: the readme text and the dependency
//! list. Absence of a referenced file is fatal.

use crate::document::{FileSource, PyProject};
use crate::ManifestResult;
use camino::{Utf8Path, Utf8PathBuf};
use sprout_core::error::SproutError;
use sprout_core::types::Requirement;
use sprout_core::utils::safe_join;
use tracing::debug;

/// Readme text with its inferred content type
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedReadme {
    pub text: String,
    pub content_type: String,
    pub path: Utf8PathBuf,
}

/// All dynamic values resolved for one descriptor
#[derive(Debug, Clone, Default)]
pub struct DynamicValues {
    pub readme: Option<ResolvedReadme>,
    pub dependencies: Option<Vec<Requirement>>,
}

/// Resolve every dynamic field the descriptor declares
pub async fn resolve_all(root: &Utf8Path, document: &PyProject) -> ManifestResult<DynamicValues> {
    let mut values = DynamicValues::default();

    if let Some(dynamic) = document.dynamic_section() {
        if let Some(source) = &dynamic.readme {
            values.readme = Some(resolve_readme(root, source).await?);
        }
        if let Some(source) = &dynamic.dependencies {
            values.dependencies = Some(resolve_dependencies(root, source).await?);
        }
    }

    Ok(values)
}

/// Resolve the long-description text from the configured readme file
pub async fn resolve_readme(root: &Utf8Path, source: &FileSource) -> ManifestResult<ResolvedReadme> {
    let path = source_path(root, source, "readme")?;

    let text = read_source(&path, "readme").await?;
    if text.trim().is_empty() {
        return Err(SproutError::Validation {
            field: "readme".to_string(),
            reason: format!("{} is empty", path),
        });
    }

    debug!("resolved readme from {} ({} bytes)", path, text.len());

    Ok(ResolvedReadme {
        text,
        content_type: content_type_for(&source.file).to_string(),
        path,
    })
}

/// Resolve the dependency list from the configured requirements file.
///
/// Blank lines and `#` comments are skipped; every remaining line must
/// parse as a requirement.
pub async fn resolve_dependencies(
    root: &Utf8Path,
    source: &FileSource,
) -> ManifestResult<Vec<Requirement>> {
    let path = source_path(root, source, "dependencies")?;
    let content = read_source(&path, "dependencies").await?;

    let mut requirements = Vec::new();
    for (number, line) in content.lines().enumerate() {
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let requirement: Requirement =
            line.parse()
                .map_err(|e: SproutError| SproutError::InvalidRequirement {
                    input: format!("{}:{}", path, number + 1),
                    reason: e.to_string(),
                })?;
        requirements.push(requirement);
    }

    debug!("resolved {} dependencies from {}", requirements.len(), path);

    Ok(requirements)
}

fn source_path(root: &Utf8Path, source: &FileSource, field: &str) -> ManifestResult<Utf8PathBuf> {
    let joined = safe_join(root.as_std_path(), Utf8Path::new(&source.file).as_std_path())
        .map_err(|_| SproutError::Validation {
            field: field.to_string(),
            reason: format!("file reference '{}' escapes the project root", source.file),
        })?;

    Utf8PathBuf::from_path_buf(joined).map_err(|p| SproutError::Validation {
        field: field.to_string(),
        reason: format!("non UTF-8 path: {}", p.display()),
    })
}

async fn read_source(path: &Utf8Path, field: &str) -> ManifestResult<String> {
    if !path.exists() {
        return Err(SproutError::MissingFile {
            field: field.to_string(),
            path: path.to_string(),
        });
    }

    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SproutError::io(format!("Failed to read {}", path), e))
}

/// Infer the description content type from the file extension
fn content_type_for(file: &str) -> &'static str {
    match Utf8Path::new(file).extension() {
        Some("md") => "text/markdown",
        Some("rst") => "text/x-rst",
        _ => "text/plain",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn utf8_root(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    fn readme_source() -> FileSource {
        FileSource {
            file: "README.md".to_string(),
        }
    }

    #[tokio::test]
    async fn test_resolve_readme() {
        let dir = TempDir::new().unwrap();
        let root = utf8_root(&dir);
        tokio::fs::write(root.join("README.md"), "Hello").await.unwrap();

        let readme = resolve_readme(&root, &readme_source()).await.unwrap();
        assert_eq!(readme.text, "Hello");
        assert_eq!(readme.content_type, "text/markdown");
    }

    #[tokio::test]
    async fn test_missing_readme_is_fatal() {
        let dir = TempDir::new().unwrap();
        let root = utf8_root(&dir);

        let err = resolve_readme(&root, &readme_source()).await.unwrap_err();
        assert!(matches!(err, SproutError::MissingFile { .. }));
    }

    #[tokio::test]
    async fn test_empty_readme_is_rejected() {
        let dir = TempDir::new().unwrap();
        let root = utf8_root(&dir);
        tokio::fs::write(root.join("README.md"), "  \n").await.unwrap();

        let err = resolve_readme(&root, &readme_source()).await.unwrap_err();
        assert!(matches!(err, SproutError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_escaping_file_reference_is_rejected() {
        let dir = TempDir::new().unwrap();
        let root = utf8_root(&dir);
        let source = FileSource {
            file: "../outside.md".to_string(),
        };

        let err = resolve_readme(&root, &source).await.unwrap_err();
        assert!(matches!(err, SproutError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_resolve_dependencies() {
        let dir = TempDir::new().unwrap();
        let root = utf8_root(&dir);
        let source = FileSource {
            file: "requirements.txt".to_string(),
        };
        tokio::fs::write(
            root.join("requirements.txt"),
            "# runtime dependencies\nnumpy==1.26.0\n\nopencv-python>=4.8  # vision\n",
        )
        .await
        .unwrap();

        let requirements = resolve_dependencies(&root, &source).await.unwrap();
        assert_eq!(requirements.len(), 2);
        assert_eq!(requirements[0].to_string(), "numpy==1.26.0");
        assert_eq!(requirements[1].name, "opencv-python");
    }

    #[tokio::test]
    async fn test_malformed_dependency_line() {
        let dir = TempDir::new().unwrap();
        let root = utf8_root(&dir);
        let source = FileSource {
            file: "requirements.txt".to_string(),
        };
        tokio::fs::write(root.join("requirements.txt"), "numpy==\n")
            .await
            .unwrap();

        let err = resolve_dependencies(&root, &source).await.unwrap_err();
        assert!(matches!(err, SproutError::InvalidRequirement { .. }));
    }
}
