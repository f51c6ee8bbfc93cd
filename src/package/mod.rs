//! Package metadata module
//!
//! This module provides the values produced by discovery: versions, package
//! metadata, package locations, and the filename convention shared by packed
//! and unpacked layouts.

mod meta;
mod naming;
mod version;

pub use meta::{PackageLayout, PackageLocation, PackageMeta};
pub use naming::{PackedFilename, package_filename, parse_package_filename};
pub use version::{Version, VersionList, parse_version};
