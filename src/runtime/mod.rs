//! Runtime abstraction for system operations.
//!
//! This module provides a trait-based abstraction over the read-only
//! filesystem queries discovery needs, enabling dependency injection and
//! testability.
//!
//! # Structure
//!
//! - `env` - System information (home directory)
//! - `fs` - File system queries (existence, entry kind, directory listing)

mod env;
mod fs;

use anyhow::Result;
use std::path::{Path, PathBuf};

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // File System
    fn exists(&self, path: &Path) -> bool;

    /// True for directories, following symlinks.
    fn is_dir(&self, path: &Path) -> bool;

    /// True for regular files, following symlinks.
    fn is_file(&self, path: &Path) -> bool;

    /// List the entries of a directory as full paths, in no particular order.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    // Directories
    fn home_dir(&self) -> Option<PathBuf>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.is_dir_impl(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.is_file_impl(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.read_dir_impl(path)
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home_dir_impl()
    }
}
