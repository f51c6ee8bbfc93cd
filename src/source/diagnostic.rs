//! Warnings for mirror entries that were skipped during a walk.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::addr::{Hostname, ResolveError};
use crate::error::ParseError;

/// Why an entry under the mirror root is not a usable package.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error(transparent)]
    InvalidHostname(ParseError),

    #[error("legacy provider namespace on {0}, which is not the default registry host")]
    LegacyNamespaceOffRegistry(Hostname),

    #[error(transparent)]
    InvalidProviderPart(ParseError),

    #[error(transparent)]
    InvalidVersion(ParseError),

    #[error(transparent)]
    InvalidPlatform(ParseError),

    #[error("expected a directory, found a file")]
    UnexpectedFile,

    #[error("unrecognized package archive: {0}")]
    UnrecognizedArchive(#[source] ParseError),

    #[error("name is not valid UTF-8")]
    NonUtf8Name,
}

impl From<ResolveError> for SkipReason {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Hostname(e) => SkipReason::InvalidHostname(e),
            ResolveError::LegacyOffRegistry(hostname) => {
                SkipReason::LegacyNamespaceOffRegistry(hostname)
            }
            ResolveError::Part(e) => SkipReason::InvalidProviderPart(e),
        }
    }
}

/// A warning-level record of one skipped entry.
#[derive(Debug)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub reason: SkipReason,
}

impl Diagnostic {
    pub fn new(path: PathBuf, reason: SkipReason) -> Self {
        Self { path, reason }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ignoring local provider path {}: {}",
            self.path.display(),
            self.reason
        )
    }
}
