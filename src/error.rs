//! Error types shared across the crate.
//!
//! Two tiers exist: [`ParseError`] is produced by the pure decoders and is
//! always recoverable during a walk (the offending entry is skipped), while
//! [`SourceError`] is what the package source operations return to callers.

use std::path::PathBuf;

use thiserror::Error;

use crate::addr::ProviderAddress;
use crate::package::Version;
use crate::platform::Platform;

/// Failure to decode one of the naming-convention components.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid hostname {given:?}: {reason}")]
    Hostname { given: String, reason: String },

    #[error("invalid provider {part} {given:?}: {reason}")]
    ProviderPart {
        part: &'static str,
        given: String,
        reason: &'static str,
    },

    #[error("invalid provider address {given:?}: {reason}")]
    ProviderAddress { given: String, reason: &'static str },

    #[error("invalid version {given:?}: {source}")]
    Version {
        given: String,
        #[source]
        source: semver::Error,
    },

    #[error("invalid platform {given:?}: {reason}")]
    Platform { given: String, reason: &'static str },

    #[error("invalid package filename {given:?}: {reason}")]
    PackedFilename { given: String, reason: String },
}

/// Failure of a package source operation.
#[derive(Debug, Error)]
pub enum SourceError {
    /// A directory under the mirror root could not be listed. This aborts the
    /// whole operation; no partial result is returned.
    #[error("cannot search {}: {source}", path.display())]
    Search {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The requested provider version is not present for the target platform.
    #[error("provider {provider} {version} is not available for {platform}")]
    NotFound {
        provider: ProviderAddress,
        version: Version,
        platform: Platform,
    },
}

impl SourceError {
    pub(crate) fn search(path: impl Into<PathBuf>, source: anyhow::Error) -> Self {
        SourceError::Search {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_error_message_includes_path_and_cause() {
        let err = SourceError::search("/mirror/example.com", anyhow::anyhow!("permission denied"));
        assert_eq!(
            err.to_string(),
            "cannot search /mirror/example.com: permission denied"
        );
        assert!(!err.is_not_found());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_not_found_error() {
        let err = SourceError::NotFound {
            provider: ProviderAddress::new("example.com".parse().unwrap(), "acme", "widget"),
            version: Version::new(1, 2, 3),
            platform: Platform::new("linux", "amd64"),
        };
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "provider example.com/acme/widget 1.2.3 is not available for linux_amd64"
        );
    }
}
