use anyhow::Result;
use std::path::PathBuf;

use crate::{
    addr::ProviderAddress,
    package::{PackageMeta, Version, parse_version},
    platform::Platform,
    runtime::Runtime,
    source::{FilesystemMirrorSource, Source},
};

use super::config::Config;
use super::list::layout_name;

/// Show the package of one provider version for a platform
///
/// The platform defaults to the one this binary runs on.
#[tracing::instrument(skip(runtime, root))]
pub fn show<R: Runtime>(
    runtime: R,
    root: Option<PathBuf>,
    provider: &str,
    version: &str,
    platform: Option<&str>,
    json: bool,
) -> Result<()> {
    let provider: ProviderAddress = provider.parse()?;
    let version: Version = parse_version(version)?;
    let platform = match platform {
        Some(p) => p.parse()?,
        None => Platform::current(),
    };

    let config = Config::load(&runtime, root)?;
    let source = FilesystemMirrorSource::new(runtime, config.root);

    let meta = source.package_meta(&provider, &version, &platform)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&meta)?);
    } else {
        print!("{}", render_meta(&meta));
    }
    Ok(())
}

fn render_meta(meta: &PackageMeta) -> String {
    let filename_note = if meta.is_filename_synthetic() {
        " (derived)"
    } else {
        ""
    };

    format!(
        "Provider: {}\nVersion:  {}\nPlatform: {}\nLayout:   {}\nFilename: {}{}\nLocation: {}\n",
        meta.provider,
        meta.version,
        meta.target_platform,
        layout_name(meta.location.layout()),
        meta.filename,
        filename_note,
        meta.location.path().display()
    )
}
