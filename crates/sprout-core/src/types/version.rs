//! Package version identifiers.
//!
//! Provides a Version type for the dotted release form used by package
//! descriptors (`1.26.0`, `3.10`, `2.0.0rc1`, `1.0.post1`, `1.0.dev3`),
//! with parsing, display, and total ordering.

use crate::error::SproutError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Package version: dotted release segments plus optional pre/post/dev parts
#[derive(Debug, Clone)]
pub struct Version {
    pub release: Vec<u64>,
    pub pre: Option<PreRelease>,
    pub post: Option<u64>,
    pub dev: Option<u64>,
}

/// Pre-release segment (`a1`, `b2`, `rc3`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PreRelease {
    pub tag: PreTag,
    pub number: u64,
}

/// Pre-release phase tag, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PreTag {
    Alpha,
    Beta,
    Rc,
}

impl Version {
    /// Create a three-segment release version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            release: vec![major, minor, patch],
            pre: None,
            post: None,
            dev: None,
        }
    }

    /// Check if this version has a pre-release or dev segment
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// Release segment at `index`, zero-extended past the declared segments
    pub fn release_segment(&self, index: usize) -> u64 {
        self.release.get(index).copied().unwrap_or(0)
    }

    /// Ordering key: release compares zero-extended, then the phase parts.
    ///
    /// At equal release the ordering is dev < pre < final < post, with a
    /// dev segment sorting a version below its non-dev form.
    fn precedence_cmp(&self, other: &Self) -> Ordering {
        let segments = self.release.len().max(other.release.len());
        for i in 0..segments {
            match self.release_segment(i).cmp(&other.release_segment(i)) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }

        phase_rank(self)
            .cmp(&phase_rank(other))
            .then_with(|| post_rank(self).cmp(&post_rank(other)))
            .then_with(|| dev_rank(self).cmp(&dev_rank(other)))
    }
}

/// Phase rank at equal release: a bare dev release sorts below every
/// pre-release, and final/post releases sort above all of them.
fn phase_rank(v: &Version) -> (u8, u8, u64) {
    match (&v.pre, v.post, v.dev) {
        (Some(pre), _, _) => (1, pre.tag as u8, pre.number),
        (None, None, Some(_)) => (0, 0, 0),
        (None, _, _) => (2, 0, 0),
    }
}

fn post_rank(v: &Version) -> (u8, u64) {
    match v.post {
        Some(n) => (1, n),
        None => (0, 0),
    }
}

fn dev_rank(v: &Version) -> (u8, u64) {
    match v.dev {
        Some(n) => (0, n),
        None => (1, 0),
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.precedence_cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.precedence_cmp(other)
    }
}

impl FromStr for Version {
    type Err = SproutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_ascii_lowercase();
        let mut rest = input.strip_prefix('v').unwrap_or(&input);

        if rest.is_empty() {
            return Err(invalid(s, "empty version string"));
        }

        let dev = match split_numeric_suffix(rest, ".dev") {
            Some((head, number)) => {
                rest = head;
                Some(number.map_err(|reason| invalid(s, reason))?)
            },
            None => None,
        };

        let post = match split_numeric_suffix(rest, ".post") {
            Some((head, number)) => {
                rest = head;
                Some(number.map_err(|reason| invalid(s, reason))?)
            },
            None => None,
        };

        let pre = match rest.find(|c: char| c.is_ascii_alphabetic()) {
            Some(pos) => {
                let (head, tail) = rest.split_at(pos);
                rest = head;
                Some(parse_pre(tail).map_err(|reason| invalid(s, reason))?)
            },
            None => None,
        };

        if rest.is_empty() {
            return Err(invalid(s, "missing release segments"));
        }

        let mut release = Vec::new();
        for segment in rest.split('.') {
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid(s, "release segments must be numeric"));
            }
            let value = segment
                .parse()
                .map_err(|_| invalid(s, "release segment out of range"))?;
            release.push(value);
        }

        Ok(Version {
            release,
            pre,
            post,
            dev,
        })
    }
}

fn invalid(input: &str, reason: &str) -> SproutError {
    SproutError::InvalidVersion {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

/// Split a trailing `{marker}{digits}` suffix, returning the head and the
/// parsed number. `None` when the marker is absent.
fn split_numeric_suffix<'a>(
    input: &'a str,
    marker: &str,
) -> Option<(&'a str, Result<u64, &'static str>)> {
    let pos = input.rfind(marker)?;
    let digits = &input[pos + marker.len()..];

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Some((input, Err("expected digits after the segment marker")));
    }

    let number = digits.parse().map_err(|_| "segment number out of range");
    Some((&input[..pos], number))
}

fn parse_pre(tail: &str) -> Result<PreRelease, &'static str> {
    let (tag, digits) = if let Some(stripped) = tail.strip_prefix("rc") {
        (PreTag::Rc, stripped)
    } else if let Some(stripped) = tail.strip_prefix('a') {
        (PreTag::Alpha, stripped)
    } else if let Some(stripped) = tail.strip_prefix('b') {
        (PreTag::Beta, stripped)
    } else {
        return Err("unknown pre-release tag (expected a, b, or rc)");
    };

    if digits.is_empty() {
        return Ok(PreRelease { tag, number: 0 });
    }

    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err("expected digits after the pre-release tag");
    }

    let number = digits.parse().map_err(|_| "pre-release number out of range")?;
    Ok(PreRelease { tag, number })
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.release.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
        }

        if let Some(pre) = &self.pre {
            write!(f, "{}{}", pre.tag, pre.number)?;
        }

        if let Some(post) = self.post {
            write!(f, ".post{}", post)?;
        }

        if let Some(dev) = self.dev {
            write!(f, ".dev{}", dev)?;
        }

        Ok(())
    }
}

impl fmt::Display for PreTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreTag::Alpha => write!(f, "a"),
            PreTag::Beta => write!(f, "b"),
            PreTag::Rc => write!(f, "rc"),
        }
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        let v: Version = "1.26.0".parse().unwrap();
        assert_eq!(v.release, vec![1, 26, 0]);
        assert_eq!(v.pre, None);
        assert_eq!(v.post, None);
        assert_eq!(v.dev, None);
    }

    #[test]
    fn test_two_segment_release() {
        let v: Version = "3.10".parse().unwrap();
        assert_eq!(v.release, vec![3, 10]);
        assert_eq!(v.release_segment(2), 0);
    }

    #[test]
    fn test_version_with_pre_release() {
        let v: Version = "2.0.0rc1".parse().unwrap();
        assert_eq!(v.release, vec![2, 0, 0]);
        assert_eq!(
            v.pre,
            Some(PreRelease {
                tag: PreTag::Rc,
                number: 1
            })
        );
    }

    #[test]
    fn test_version_with_post_and_dev() {
        let v: Version = "1.0a1.post2.dev3".parse().unwrap();
        assert_eq!(v.release, vec![1, 0]);
        assert_eq!(
            v.pre,
            Some(PreRelease {
                tag: PreTag::Alpha,
                number: 1
            })
        );
        assert_eq!(v.post, Some(2));
        assert_eq!(v.dev, Some(3));
        assert_eq!(v.to_string(), "1.0a1.post2.dev3");
    }

    #[test]
    fn test_invalid_versions() {
        assert!("".parse::<Version>().is_err());
        assert!("abc".parse::<Version>().is_err());
        assert!("1..0".parse::<Version>().is_err());
        assert!("1.0x1".parse::<Version>().is_err());
        assert!("1.0.dev".parse::<Version>().is_err());
    }

    #[test]
    fn test_version_display() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.to_string(), "1.2.3");
    }

    #[test]
    fn test_zero_extended_equality() {
        let short: Version = "3.10".parse().unwrap();
        let long: Version = "3.10.0".parse().unwrap();
        assert_eq!(short, long);
    }

    #[test]
    fn test_phase_ordering() {
        let dev: Version = "1.0.dev1".parse().unwrap();
        let alpha: Version = "1.0a1".parse().unwrap();
        let beta: Version = "1.0b1".parse().unwrap();
        let rc: Version = "1.0rc1".parse().unwrap();
        let released: Version = "1.0".parse().unwrap();
        let post: Version = "1.0.post1".parse().unwrap();

        assert!(dev < alpha);
        assert!(alpha < beta);
        assert!(beta < rc);
        assert!(rc < released);
        assert!(released < post);
    }

    #[test]
    fn test_dev_sorts_below_its_release() {
        let pre_dev: Version = "1.0a1.dev1".parse().unwrap();
        let pre: Version = "1.0a1".parse().unwrap();
        assert!(pre_dev < pre);

        let post_dev: Version = "1.0.post1.dev1".parse().unwrap();
        let post: Version = "1.0.post1".parse().unwrap();
        let released: Version = "1.0".parse().unwrap();
        assert!(released < post_dev);
        assert!(post_dev < post);
    }

    #[test]
    fn test_release_comparison() {
        let a: Version = "1.9.0".parse().unwrap();
        let b: Version = "1.10.0".parse().unwrap();
        assert!(a < b);
    }
}
