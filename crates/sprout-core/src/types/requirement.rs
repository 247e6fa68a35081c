//! Dependency requirement parsing.
//!
//! A requirement is one line of a requirements file: a distribution name,
//! optional extras, an optional specifier set, and an optional environment
//! marker kept verbatim (`numpy==1.26.0`, `requests[socks]>=2.28`).

use super::SpecifierSet;
use crate::error::SproutError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Dependency requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub extras: Vec<String>,
    pub specifiers: SpecifierSet,
    /// Environment marker after `;`, stored without evaluation
    pub marker: Option<String>,
}

impl Requirement {
    /// Create a requirement with no extras or marker
    pub fn new(name: String, specifiers: SpecifierSet) -> Self {
        Self {
            name,
            extras: Vec::new(),
            specifiers,
            marker: None,
        }
    }

    /// Normalized distribution name used for comparisons
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

/// Normalize a distribution name: lowercase, with runs of `-`, `_`, and `.`
/// collapsed to a single `-`.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;

    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            pending_sep = true;
        } else {
            if pending_sep && !out.is_empty() {
                out.push('-');
            }
            pending_sep = false;
            out.push(c.to_ascii_lowercase());
        }
    }

    out
}

/// Check if a distribution name is well-formed: ASCII letters, digits,
/// `-`, `_`, `.`, with alphanumeric first and last characters.
pub fn is_valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    !name.is_empty()
        && bytes[0].is_ascii_alphanumeric()
        && bytes[bytes.len() - 1].is_ascii_alphanumeric()
        && bytes
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

impl FromStr for Requirement {
    type Err = SproutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        if line.is_empty() {
            return Err(invalid(s, "empty requirement"));
        }

        let (body, marker) = match line.split_once(';') {
            Some((head, tail)) => (head.trim_end(), Some(tail.trim().to_string())),
            None => (line, None),
        };

        let name_end = body
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
            .unwrap_or(body.len());
        let name = &body[..name_end];
        if !is_valid_name(name) {
            return Err(invalid(s, "malformed distribution name"));
        }

        let mut rest = body[name_end..].trim_start();

        let mut extras = Vec::new();
        if let Some(stripped) = rest.strip_prefix('[') {
            let close = stripped
                .find(']')
                .ok_or_else(|| invalid(s, "unterminated extras list"))?;
            for extra in stripped[..close].split(',') {
                let extra = extra.trim();
                if !is_valid_name(extra) {
                    return Err(invalid(s, "malformed extra name"));
                }
                extras.push(extra.to_string());
            }
            rest = stripped[close + 1..].trim_start();
        }

        let specifiers: SpecifierSet = rest
            .parse()
            .map_err(|e: SproutError| invalid(s, &e.to_string()))?;

        Ok(Requirement {
            name: name.to_string(),
            extras,
            specifiers,
            marker,
        })
    }
}

fn invalid(input: &str, reason: &str) -> SproutError {
    SproutError::InvalidRequirement {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;

        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }

        if !self.specifiers.is_empty() {
            write!(f, "{}", self.specifiers)?;
        }

        if let Some(marker) = &self.marker {
            write!(f, "; {}", marker)?;
        }

        Ok(())
    }
}

impl Serialize for Requirement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Requirement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinned_requirement() {
        let req: Requirement = "numpy==1.26.0".parse().unwrap();
        assert_eq!(req.name, "numpy");
        assert!(req.extras.is_empty());
        assert_eq!(req.specifiers.to_string(), "==1.26.0");
        assert_eq!(req.to_string(), "numpy==1.26.0");
    }

    #[test]
    fn test_bare_name() {
        let req: Requirement = "scipy".parse().unwrap();
        assert_eq!(req.name, "scipy");
        assert!(req.specifiers.is_empty());
    }

    #[test]
    fn test_extras_and_marker() {
        let req: Requirement = "requests[socks,security]>=2.28; python_version < \"3.11\""
            .parse()
            .unwrap();
        assert_eq!(req.name, "requests");
        assert_eq!(req.extras, vec!["socks", "security"]);
        assert_eq!(req.marker.as_deref(), Some("python_version < \"3.11\""));
    }

    #[test]
    fn test_name_normalization() {
        assert_eq!(normalize_name("Pillow"), "pillow");
        assert_eq!(normalize_name("ruamel.yaml"), "ruamel-yaml");
        assert_eq!(normalize_name("post__tracking"), "post-tracking");

        let a: Requirement = "Post_Tracking==0.1.0".parse().unwrap();
        assert_eq!(a.normalized_name(), "post-tracking");
    }

    #[test]
    fn test_invalid_requirements() {
        assert!("".parse::<Requirement>().is_err());
        assert!("-numpy".parse::<Requirement>().is_err());
        assert!("numpy==".parse::<Requirement>().is_err());
        assert!("numpy[socks".parse::<Requirement>().is_err());
    }

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("numpy"));
        assert!(is_valid_name("post_tracking"));
        assert!(is_valid_name("ruamel.yaml"));

        assert!(!is_valid_name(""));
        assert!(!is_valid_name("-leading"));
        assert!(!is_valid_name("trailing-"));
        assert!(!is_valid_name("has space"));
    }
}
