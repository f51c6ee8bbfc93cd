use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::addr::ProviderAddress;
use crate::platform::Platform;

use super::naming::package_filename;
use super::version::{Version, VersionList};

/// How a package is stored in the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageLayout {
    /// Extracted into `<host>/<namespace>/<type>/<version>/<os>_<arch>/`.
    Unpacked,
    /// Stored as `<host>/<namespace>/<type>/<archive>.zip`.
    Packed,
}

/// Where a discovered package lives on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum PackageLocation {
    /// An already-extracted package directory.
    LocalDir(PathBuf),
    /// A distribution archive that still has to be extracted.
    LocalArchive(PathBuf),
}

impl PackageLocation {
    pub fn path(&self) -> &Path {
        match self {
            PackageLocation::LocalDir(path) | PackageLocation::LocalArchive(path) => path,
        }
    }

    pub fn is_archive(&self) -> bool {
        matches!(self, PackageLocation::LocalArchive(_))
    }

    pub fn layout(&self) -> PackageLayout {
        match self {
            PackageLocation::LocalDir(_) => PackageLayout::Unpacked,
            PackageLocation::LocalArchive(_) => PackageLayout::Packed,
        }
    }
}

/// Metadata about one package (a provider version built for one platform).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageMeta {
    pub provider: ProviderAddress,
    pub version: Version,

    /// Plugin protocol versions the package supports. Unknown at discovery
    /// time: it needs the package's own manifest.
    pub protocol_versions: Option<VersionList>,
    pub target_platform: Platform,

    /// Archive filename. For an unpacked package this is derived from the
    /// naming convention and does not exist on disk.
    pub filename: String,
    pub location: PackageLocation,

    /// SHA-256 of the archive. Never set by discovery; an unpacked package
    /// has no archive to hash at all.
    pub sha256_sum: Option<[u8; 32]>,
}

impl PackageMeta {
    /// Metadata for a package already extracted into `dir`.
    pub fn unpacked(
        provider: ProviderAddress,
        version: Version,
        target_platform: Platform,
        dir: PathBuf,
    ) -> Self {
        let filename = package_filename(&provider.type_name, &version, &target_platform);
        Self {
            provider,
            version,
            protocol_versions: None,
            target_platform,
            filename,
            location: PackageLocation::LocalDir(dir),
            sha256_sum: None,
        }
    }

    /// Metadata for a distribution archive at `archive`.
    pub fn packed(
        provider: ProviderAddress,
        version: Version,
        target_platform: Platform,
        filename: String,
        archive: PathBuf,
    ) -> Self {
        Self {
            provider,
            version,
            protocol_versions: None,
            target_platform,
            filename,
            location: PackageLocation::LocalArchive(archive),
            sha256_sum: None,
        }
    }

    /// Whether `filename` was derived rather than observed on disk.
    pub fn is_filename_synthetic(&self) -> bool {
        !self.location.is_archive()
    }
}
