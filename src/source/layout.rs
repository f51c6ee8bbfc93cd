//! Classification of mirror paths.
//!
//! Paths below the mirror root follow one of two layouts:
//!
//! - Unpacked: `<host>/<namespace>/<type>/<version>/<os>_<arch>/` (a directory)
//! - Packed: `<host>/<namespace>/<type>/plugin-provider-<type>_<version>_<os>_<arch>.zip` (a file)
//!
//! [`classify`] maps the segments of one relative path to what the walker
//! should do with it. It performs no I/O.

use std::path::Path;

use crate::addr::{ProviderAddress, resolve};
use crate::error::ParseError;
use crate::package::{PackageMeta, parse_package_filename, parse_version};
use crate::platform::Platform;

use super::diagnostic::SkipReason;

/// Segments in a provider address prefix (`host/namespace/type`).
pub const ADDRESS_DEPTH: usize = 3;
/// Segments in a packed package path.
pub const PACKED_DEPTH: usize = 4;
/// Segments in an unpacked package path. Nothing below this depth is visited.
pub const UNPACKED_DEPTH: usize = 5;

/// Kind of a filesystem entry, following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    File,
    /// Anything else, including entries that vanished before they could be
    /// inspected.
    Other,
}

/// What the walker should do with one entry.
#[derive(Debug)]
pub enum Classification {
    /// A prefix of a deeper package path; walk into it.
    Descend,
    /// Not part of any layout. Nothing to report and nothing to walk into.
    Ignore,
    /// Malformed entry; report it and do not walk into it.
    Skip(SkipReason),
    /// A package.
    Package(PackageMeta),
}

/// Classify the entry at `path`, whose path relative to the mirror root is
/// `segments`.
pub fn classify(segments: &[&str], kind: EntryKind, path: &Path) -> Classification {
    if segments.len() < ADDRESS_DEPTH {
        return match kind {
            EntryKind::Dir => Classification::Descend,
            _ => Classification::Ignore,
        };
    }
    if segments.len() > UNPACKED_DEPTH {
        return Classification::Ignore;
    }

    let provider = match resolve(segments[0], segments[1], segments[2]) {
        Ok(provider) => provider,
        Err(e) => return Classification::Skip(e.into()),
    };

    match (segments.len(), kind) {
        (ADDRESS_DEPTH, EntryKind::Dir) => Classification::Descend,
        (ADDRESS_DEPTH, EntryKind::File) => Classification::Skip(SkipReason::UnexpectedFile),

        // A version directory of the unpacked layout.
        (PACKED_DEPTH, EntryKind::Dir) => match parse_version(segments[3]) {
            Ok(_) => Classification::Descend,
            Err(e) => Classification::Skip(SkipReason::InvalidVersion(e)),
        },
        (PACKED_DEPTH, EntryKind::File) => classify_packed(provider, segments[3], path),

        (UNPACKED_DEPTH, EntryKind::Dir) => classify_unpacked(provider, segments, path),
        (UNPACKED_DEPTH, EntryKind::File) => Classification::Skip(SkipReason::UnexpectedFile),

        _ => Classification::Ignore,
    }
}

fn classify_unpacked(provider: ProviderAddress, segments: &[&str], path: &Path) -> Classification {
    let version = match parse_version(segments[3]) {
        Ok(version) => version,
        Err(e) => return Classification::Skip(SkipReason::InvalidVersion(e)),
    };
    let platform = match Platform::parse(segments[4]) {
        Ok(platform) => platform,
        Err(e) => return Classification::Skip(SkipReason::InvalidPlatform(e)),
    };

    Classification::Package(PackageMeta::unpacked(
        provider,
        version,
        platform,
        path.to_path_buf(),
    ))
}

fn classify_packed(provider: ProviderAddress, filename: &str, path: &Path) -> Classification {
    let parsed = match parse_package_filename(filename) {
        Ok(parsed) => parsed,
        Err(e) => return Classification::Skip(SkipReason::UnrecognizedArchive(e)),
    };

    if !parsed.type_name.eq_ignore_ascii_case(&provider.type_name) {
        return Classification::Skip(SkipReason::UnrecognizedArchive(
            ParseError::PackedFilename {
                given: filename.to_string(),
                reason: format!(
                    "archive is for provider type {:?} but is stored under {:?}",
                    parsed.type_name, provider.type_name
                ),
            },
        ));
    }

    Classification::Package(PackageMeta::packed(
        provider,
        parsed.version,
        parsed.platform,
        filename.to_string(),
        path.to_path_buf(),
    ))
}
