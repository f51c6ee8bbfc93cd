//! Package source abstraction.
//!
//! A [`Source`] answers which versions of a provider exist and where the
//! package for one version and platform can be found. This crate implements
//! it for a local directory tree; registry- or network-mirror-backed sources
//! implement the same trait elsewhere.

mod diagnostic;
mod filesystem;
mod layout;

use crate::addr::ProviderAddress;
use crate::error::SourceError;
use crate::package::{PackageMeta, Version, VersionList};
use crate::platform::Platform;

pub use diagnostic::{Diagnostic, SkipReason};
pub use filesystem::{FilesystemMirrorSource, PackageMap, Scan};
pub use layout::{Classification, EntryKind, classify};

/// Trait for package sources.
#[cfg_attr(test, mockall::automock)]
pub trait Source: Send + Sync {
    /// All versions of `provider` this source can supply.
    fn available_versions(&self, provider: &ProviderAddress) -> Result<VersionList, SourceError>;

    /// Metadata for the package of `provider` at `version` for `target`.
    ///
    /// Returns [`SourceError::NotFound`] when no such package exists.
    fn package_meta(
        &self,
        provider: &ProviderAddress,
        version: &Version,
        target: &Platform,
    ) -> Result<PackageMeta, SourceError>;
}
