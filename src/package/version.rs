//! Package versions.
//!
//! Versions are strict semantic versions. Mirror directories name them
//! without a `v` prefix (`1.2.3`, `2.0.0-beta.1`).

use serde::Serialize;
use std::ops::Deref;

use crate::error::ParseError;

pub use semver::Version;

/// Parse a version segment.
pub fn parse_version(given: &str) -> Result<Version, ParseError> {
    Version::parse(given).map_err(|source| ParseError::Version {
        given: given.to_string(),
        source,
    })
}

/// Versions of one provider, without duplicates.
///
/// Order is insertion order until [`VersionList::sort`] is called.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VersionList(Vec<Version>);

impl VersionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `version` unless it is already present.
    pub fn push(&mut self, version: Version) -> bool {
        if self.0.contains(&version) {
            return false;
        }
        self.0.push(version);
        true
    }

    /// Sort ascending by semantic version precedence.
    pub fn sort(&mut self) {
        self.0.sort();
    }

    pub fn newest(&self) -> Option<&Version> {
        self.0.iter().max()
    }

    pub fn into_vec(self) -> Vec<Version> {
        self.0
    }
}

impl Deref for VersionList {
    type Target = [Version];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<Version> for VersionList {
    fn from_iter<I: IntoIterator<Item = Version>>(iter: I) -> Self {
        let mut list = VersionList::new();
        for version in iter {
            list.push(version);
        }
        list
    }
}
