use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::{
    addr::ProviderAddress,
    runtime::Runtime,
    source::{FilesystemMirrorSource, Source},
};

use super::config::Config;

/// List the mirrored versions of one provider, oldest first
#[tracing::instrument(skip(runtime, root))]
pub fn versions<R: Runtime>(runtime: R, root: Option<PathBuf>, provider: &str) -> Result<()> {
    let provider: ProviderAddress = provider.parse()?;
    let config = Config::load(&runtime, root)?;
    let source = FilesystemMirrorSource::new(runtime, config.root);

    print!("{}", render_versions(&source, &provider)?);
    Ok(())
}

fn render_versions<S: Source>(source: &S, provider: &ProviderAddress) -> Result<String> {
    let mut versions = source
        .available_versions(provider)
        .with_context(|| format!("Failed to list versions of {}", provider))?;

    if versions.is_empty() {
        return Ok(format!(
            "No versions of {} found.\n",
            provider.for_display()
        ));
    }

    versions.sort();
    Ok(versions.iter().map(|v| format!("{}\n", v)).collect())
}
