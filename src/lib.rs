//! Discovery of plugin provider packages stored in a local directory tree.
//!
//! A mirror root holds packages in one of two layouts:
//!
//! - Unpacked: `<host>/<namespace>/<type>/<version>/<os>_<arch>/`
//! - Packed: `<host>/<namespace>/<type>/plugin-provider-<type>_<version>_<os>_<arch>.zip`
//!
//! [`source::FilesystemMirrorSource`] walks such a tree and reports what it
//! finds as [`package::PackageMeta`] values.

pub mod addr;
pub mod commands;
pub mod error;
pub mod package;
pub mod platform;
pub mod runtime;
pub mod source;
