//! Package filename conventions.
//!
//! Distribution archives are named
//! `plugin-provider-<type>_<version>_<os>_<arch>.zip`. Unpacked packages have
//! no archive on disk, so their filename is derived from the same convention.

use crate::error::ParseError;
use crate::platform::Platform;

use super::version::{Version, parse_version};

const FILENAME_PREFIX: &str = "plugin-provider-";
const FILENAME_SUFFIX: &str = ".zip";

/// Generate the conventional archive filename for a package.
///
/// # Examples
///
/// ```
/// use pvmirror::package::{Version, package_filename};
/// use pvmirror::platform::Platform;
///
/// assert_eq!(
///     package_filename("widget", &Version::new(1, 2, 0), &Platform::new("linux", "amd64")),
///     "plugin-provider-widget_1.2.0_linux_amd64.zip"
/// );
/// ```
pub fn package_filename(type_name: &str, version: &Version, platform: &Platform) -> String {
    format!(
        "{}{}_{}_{}{}",
        FILENAME_PREFIX, type_name, version, platform, FILENAME_SUFFIX
    )
}

/// Components decoded from a conventional archive filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedFilename {
    pub type_name: String,
    pub version: Version,
    pub platform: Platform,
}

/// Decode an archive filename produced by [`package_filename`].
pub fn parse_package_filename(filename: &str) -> Result<PackedFilename, ParseError> {
    let invalid = |reason: String| ParseError::PackedFilename {
        given: filename.to_string(),
        reason,
    };

    let stem = filename
        .strip_prefix(FILENAME_PREFIX)
        .and_then(|rest| rest.strip_suffix(FILENAME_SUFFIX))
        .ok_or_else(|| {
            invalid(format!(
                "expected {}<type>_<version>_<os>_<arch>{}",
                FILENAME_PREFIX, FILENAME_SUFFIX
            ))
        })?;

    let parts: Vec<&str> = stem.split('_').collect();
    let [type_name, version, os, arch] = parts.as_slice() else {
        return Err(invalid(
            "expected type, version, OS and architecture separated by underscores".to_string(),
        ));
    };

    if type_name.is_empty() {
        return Err(invalid("type name is empty".to_string()));
    }
    let version = parse_version(version).map_err(|e| invalid(e.to_string()))?;
    let platform =
        Platform::parse(&format!("{}_{}", os, arch)).map_err(|e| invalid(e.to_string()))?;

    Ok(PackedFilename {
        type_name: type_name.to_string(),
        version,
        platform,
    })
}
