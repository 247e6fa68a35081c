//! Package discovery over configured source roots.

use glob::Pattern;
use sprout_core::error::{SproutError, SproutResult};
use sprout_core::utils::is_package_segment;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Discovery configuration taken from the descriptor's find section
#[derive(Debug, Clone, PartialEq)]
pub struct FindConfig {
    /// Root directories to scan, relative to the project root
    pub where_dirs: Vec<String>,

    /// Dotted-name patterns selecting packages to bundle
    pub include: Vec<String>,

    /// Dotted-name patterns excluded from the bundle; exclusion wins
    pub exclude: Vec<String>,

    /// Whether directories without an `__init__.py` count as packages
    pub namespaces: bool,
}

impl Default for FindConfig {
    fn default() -> Self {
        Self {
            where_dirs: vec!["src".to_string()],
            include: vec!["*".to_string()],
            exclude: Vec::new(),
            namespaces: false,
        }
    }
}

/// One discovered package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredPackage {
    /// Dotted name relative to its source root (`post_tracking.widgets`)
    pub name: String,

    /// Directory holding the package
    pub path: PathBuf,
}

/// Scans a project root for the packages selected by a FindConfig
pub struct PackageFinder {
    root: PathBuf,
    config: FindConfig,
}

impl PackageFinder {
    /// Create a finder for a project root
    pub fn new(root: impl Into<PathBuf>, config: FindConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Discover the selected packages, sorted by dotted name.
    ///
    /// An empty result is reported as a warning here; callers that cannot
    /// tolerate an empty distribution use [`find_nonempty`].
    ///
    /// [`find_nonempty`]: PackageFinder::find_nonempty
    pub fn find(&self) -> SproutResult<Vec<DiscoveredPackage>> {
        let include = compile_patterns(&self.config.include)?;
        let exclude = compile_patterns(&self.config.exclude)?;

        let mut packages = Vec::new();

        for where_dir in &self.config.where_dirs {
            let base = self.root.join(where_dir);
            if !base.is_dir() {
                return Err(SproutError::Validation {
                    field: "tool.setuptools.packages.find.where".to_string(),
                    reason: format!("discovery root '{}' is not a directory", where_dir),
                });
            }

            self.scan_root(&base, &include, &exclude, &mut packages)?;
        }

        packages.sort_by(|a, b| a.name.cmp(&b.name));

        if packages.is_empty() {
            warn!(
                "package discovery matched no packages under {}",
                self.config.where_dirs.join(", ")
            );
        } else {
            debug!("discovered {} packages", packages.len());
        }

        Ok(packages)
    }

    /// Discover packages, failing on an empty result
    pub fn find_nonempty(&self) -> SproutResult<Vec<DiscoveredPackage>> {
        let packages = self.find()?;
        if packages.is_empty() {
            return Err(SproutError::EmptyDistribution {
                where_dirs: self.config.where_dirs.join(", "),
            });
        }
        Ok(packages)
    }

    fn scan_root(
        &self,
        base: &Path,
        include: &[Pattern],
        exclude: &[Pattern],
        packages: &mut Vec<DiscoveredPackage>,
    ) -> SproutResult<()> {
        let namespaces = self.config.namespaces;

        // Only package directories are traversed: with namespaces off, a
        // directory without __init__.py ends the descent.
        let walker = WalkDir::new(base)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || is_package_dir(entry.path(), namespaces));

        for entry in walker {
            let entry = entry.map_err(|e| {
                SproutError::io(format!("Failed to scan {}", base.display()), e.into())
            })?;

            let Some(name) = dotted_name(base, entry.path()) else {
                continue;
            };

            let included = include.iter().any(|pattern| pattern.matches(&name));
            let excluded = exclude.iter().any(|pattern| pattern.matches(&name));
            if included && !excluded {
                packages.push(DiscoveredPackage {
                    name,
                    path: entry.into_path(),
                });
            }
        }

        Ok(())
    }
}

fn compile_patterns(patterns: &[String]) -> SproutResult<Vec<Pattern>> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|e| SproutError::Validation {
                field: "tool.setuptools.packages.find".to_string(),
                reason: format!("invalid pattern '{}': {}", pattern, e),
            })
        })
        .collect()
}

fn is_package_dir(path: &Path, namespaces: bool) -> bool {
    if !path.is_dir() {
        return false;
    }

    let valid_segment = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(is_package_segment)
        .unwrap_or(false);

    valid_segment && (namespaces || path.join("__init__.py").is_file())
}

/// Dotted package name of `path` relative to `base`; None for paths with
/// non UTF-8 segments
fn dotted_name(base: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let segments: Option<Vec<&str>> = relative
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect();
    segments.map(|segments| segments.join("."))
}
