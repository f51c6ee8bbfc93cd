use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::runtime::Runtime;

use super::paths::default_mirror_root;

/// Settings resolved once per invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding the mirrored packages.
    pub root: PathBuf,
}

impl Config {
    /// Resolve configuration. An explicit root (from `--root` or
    /// `PVMIRROR_ROOT`) wins over the per-user default.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, root: Option<PathBuf>) -> Result<Self> {
        let root = match root {
            Some(path) => path,
            None => default_mirror_root(runtime)?,
        };

        debug!("Using mirror root: {}", root.display());
        Ok(Self { root })
    }
}
