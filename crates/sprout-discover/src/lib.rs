//! # sprout-discover
//!
//! Package discovery over a source tree.
//!
//! Implements the `packages.find` contract of the descriptor: scan the
//! configured root directories for packages, keep the ones whose dotted
//! names match the include patterns, and drop the excluded ones.

pub mod find;

pub use find::{DiscoveredPackage, FindConfig, PackageFinder};
