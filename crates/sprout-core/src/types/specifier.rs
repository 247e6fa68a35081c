//! Version specifiers and specifier sets.
//!
//! A specifier is a single comparison against a version (`>=3.10`,
//! `==1.26.0`, `~=2.1`, `==3.*`); a specifier set is a comma-separated
//! conjunction of them. Both `requires-python` and build requirements
//! are expressed this way.

use super::Version;
use crate::error::SproutError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Comparison operator for version specifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equal,      // ==1.0.0
    NotEqual,   // !=1.0.0
    GreaterEq,  // >=1.0.0
    LessEq,     // <=1.0.0
    Greater,    // >1.0.0
    Less,       // <1.0.0
    Compatible, // ~=1.2.0
}

/// Single version comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specifier {
    pub op: CompareOp,
    pub version: Version,
    /// Prefix match (`==3.*`); only valid with `==` and `!=`
    pub wildcard: bool,
}

/// Comma-separated conjunction of specifiers; empty matches every version
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecifierSet {
    pub specifiers: Vec<Specifier>,
}

impl Specifier {
    /// Check if a version satisfies this specifier
    pub fn contains(&self, version: &Version) -> bool {
        match self.op {
            CompareOp::Equal if self.wildcard => self.prefix_matches(version),
            CompareOp::NotEqual if self.wildcard => !self.prefix_matches(version),
            CompareOp::Equal => version == &self.version,
            CompareOp::NotEqual => version != &self.version,
            CompareOp::GreaterEq => version >= &self.version,
            CompareOp::LessEq => version <= &self.version,
            CompareOp::Greater => version > &self.version,
            CompareOp::Less => version < &self.version,
            CompareOp::Compatible => {
                // ~=X.Y.Z means >=X.Y.Z with the leading release segments
                // (all but the last) held fixed.
                version >= &self.version && self.release_prefix_matches(version)
            },
        }
    }

    /// Zero-extended prefix match over the full declared release
    fn prefix_matches(&self, version: &Version) -> bool {
        (0..self.version.release.len())
            .all(|i| version.release_segment(i) == self.version.release_segment(i))
    }

    /// Prefix match over all but the last declared release segment
    fn release_prefix_matches(&self, version: &Version) -> bool {
        (0..self.version.release.len().saturating_sub(1))
            .all(|i| version.release_segment(i) == self.version.release_segment(i))
    }
}

impl SpecifierSet {
    /// Check if a version satisfies every specifier in the set
    pub fn contains(&self, version: &Version) -> bool {
        self.specifiers.iter().all(|spec| spec.contains(version))
    }

    /// Check if the set places no constraint at all
    pub fn is_empty(&self) -> bool {
        self.specifiers.is_empty()
    }
}

impl FromStr for Specifier {
    type Err = SproutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();

        let (op, version_str) = if let Some(stripped) = input.strip_prefix("~=") {
            (CompareOp::Compatible, stripped)
        } else if let Some(stripped) = input.strip_prefix("==") {
            (CompareOp::Equal, stripped)
        } else if let Some(stripped) = input.strip_prefix("!=") {
            (CompareOp::NotEqual, stripped)
        } else if let Some(stripped) = input.strip_prefix(">=") {
            (CompareOp::GreaterEq, stripped)
        } else if let Some(stripped) = input.strip_prefix("<=") {
            (CompareOp::LessEq, stripped)
        } else if let Some(stripped) = input.strip_prefix('>') {
            (CompareOp::Greater, stripped)
        } else if let Some(stripped) = input.strip_prefix('<') {
            (CompareOp::Less, stripped)
        } else {
            return Err(invalid(s, "missing comparison operator"));
        };

        let version_str = version_str.trim();
        let (version_str, wildcard) = match version_str.strip_suffix(".*") {
            Some(stripped) => (stripped, true),
            None => (version_str, false),
        };

        if wildcard && !matches!(op, CompareOp::Equal | CompareOp::NotEqual) {
            return Err(invalid(s, "wildcard is only valid with == and !="));
        }

        let version: Version = version_str
            .parse()
            .map_err(|e: SproutError| invalid(s, &e.to_string()))?;

        if wildcard && (version.pre.is_some() || version.post.is_some() || version.dev.is_some()) {
            return Err(invalid(s, "wildcard requires a plain release prefix"));
        }

        if op == CompareOp::Compatible && version.release.len() < 2 {
            return Err(invalid(s, "~= requires at least two release segments"));
        }

        Ok(Specifier {
            op,
            version,
            wildcard,
        })
    }
}

impl FromStr for SpecifierSet {
    type Err = SproutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Ok(SpecifierSet::default());
        }

        let specifiers = input
            .split(',')
            .map(|part| part.parse())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SpecifierSet { specifiers })
    }
}

fn invalid(input: &str, reason: &str) -> SproutError {
    SproutError::InvalidSpecifier {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            CompareOp::Equal => "==",
            CompareOp::NotEqual => "!=",
            CompareOp::GreaterEq => ">=",
            CompareOp::LessEq => "<=",
            CompareOp::Greater => ">",
            CompareOp::Less => "<",
            CompareOp::Compatible => "~=",
        };
        write!(f, "{}", op)
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.version)?;
        if self.wildcard {
            write!(f, ".*")?;
        }
        Ok(())
    }
}

impl fmt::Display for SpecifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, spec) in self.specifiers.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", spec)?;
        }
        Ok(())
    }
}

impl Serialize for SpecifierSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SpecifierSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}
