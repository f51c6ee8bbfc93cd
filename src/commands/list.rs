use anyhow::{Context, Result};
use log::debug;
use std::path::PathBuf;

use crate::{
    package::{PackageLayout, PackageMeta},
    runtime::Runtime,
    source::{FilesystemMirrorSource, Scan},
};

use super::config::Config;

/// List every package in the mirror
#[tracing::instrument(skip(runtime, root))]
pub fn list<R: Runtime>(
    runtime: R,
    root: Option<PathBuf>,
    json: bool,
    show_diagnostics: bool,
) -> Result<()> {
    let config = Config::load(&runtime, root)?;
    let source = FilesystemMirrorSource::new(runtime, config.root);

    debug!("Listing packages from {:?}", source.root());

    let scan = source
        .scan()
        .with_context(|| format!("Failed to scan mirror {}", source.root().display()))?;

    if show_diagnostics {
        for diagnostic in &scan.diagnostics {
            eprintln!("warning: {}", diagnostic);
        }
    }

    if json {
        println!("{}", render_json(&scan)?);
    } else {
        print!("{}", render_text(&scan, &source.root().display().to_string()));
    }

    Ok(())
}

fn packages(scan: &Scan) -> impl Iterator<Item = &PackageMeta> {
    scan.packages.values().flatten()
}

fn render_json(scan: &Scan) -> Result<String> {
    let packages: Vec<&PackageMeta> = packages(scan).collect();
    Ok(serde_json::to_string_pretty(&packages)?)
}

fn render_text(scan: &Scan, root: &str) -> String {
    if scan.packages.is_empty() {
        return format!("No packages found in {}.\n", root);
    }

    packages(scan)
        .map(|meta| {
            format!(
                "{} {} {} {} {}\n",
                meta.provider.for_display(),
                meta.version,
                meta.target_platform,
                layout_name(meta.location.layout()),
                meta.location.path().display()
            )
        })
        .collect()
}

pub(crate) fn layout_name(layout: PackageLayout) -> &'static str {
    match layout {
        PackageLayout::Unpacked => "unpacked",
        PackageLayout::Packed => "packed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, RealRuntime};
    use mockall::predicate::*;
    use tempfile::tempdir;

    fn scan_of(paths: &[&str]) -> (tempfile::TempDir, Scan) {
        let dir = tempdir().unwrap();
        for path in paths {
            std::fs::create_dir_all(dir.path().join(path)).unwrap();
        }
        let scan = FilesystemMirrorSource::new(RealRuntime, dir.path())
            .scan()
            .unwrap();
        (dir, scan)
    }

    #[test]
    fn test_render_text() {
        let (dir, scan) = scan_of(&[
            "example.com/acme/widget/1.0.0/linux_amd64",
            "registry.pvmirror.io/acme/gadget/0.2.0/darwin_arm64",
        ]);

        let text = render_text(&scan, "/mirror");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        // Sorted by provider address, hostname first
        assert!(lines[0].starts_with("example.com/acme/widget 1.0.0 linux_amd64 unpacked "));
        assert_eq!(
            lines[1],
            format!(
                "acme/gadget 0.2.0 darwin_arm64 unpacked {}",
                dir.path()
                    .join("registry.pvmirror.io/acme/gadget/0.2.0/darwin_arm64")
                    .display()
            )
        );
    }

    #[test]
    fn test_render_text_empty() {
        let (_dir, scan) = scan_of(&[]);
        assert_eq!(render_text(&scan, "/mirror"), "No packages found in /mirror.\n");
    }

    #[test]
    fn test_render_json() {
        let (_dir, scan) = scan_of(&["example.com/acme/widget/1.0.0/linux_amd64"]);

        let json: serde_json::Value = serde_json::from_str(&render_json(&scan).unwrap()).unwrap();
        let first = &json[0];
        assert_eq!(first["provider"]["hostname"], "example.com");
        assert_eq!(first["provider"]["type"], "widget");
        assert_eq!(first["version"], "1.0.0");
        assert_eq!(first["target_platform"]["os"], "linux");
        assert_eq!(first["filename"], "plugin-provider-widget_1.0.0_linux_amd64.zip");
        assert_eq!(first["location"]["kind"], "local_dir");
        assert!(first["sha256_sum"].is_null());
    }

    #[test]
    fn test_list_with_custom_root() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("example.com/acme/widget/1.0.0/linux_amd64"))
            .unwrap();

        let result = list(RealRuntime, Some(dir.path().to_path_buf()), false, true);
        assert!(result.is_ok());
    }

    #[test]
    fn test_list_default_root() {
        let mut runtime = MockRuntime::new();
        let root = PathBuf::from("/home/user/.pvmirror/plugins");

        runtime
            .expect_home_dir()
            .returning(|| Some(PathBuf::from("/home/user")));
        runtime
            .expect_read_dir()
            .with(eq(root))
            .returning(|_| Ok(vec![]));

        let result = list(runtime, None, true, false);
        assert!(result.is_ok());
    }

    #[test]
    fn test_list_unreadable_root_fails() {
        let mut runtime = MockRuntime::new();

        runtime
            .expect_read_dir()
            .returning(|_| Err(anyhow::anyhow!("permission denied")));

        let result = list(runtime, Some(PathBuf::from("/mirror")), false, false);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to scan mirror /mirror"));
    }
}
