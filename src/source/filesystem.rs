use log::{debug, warn};
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use crate::addr::{Hostname, ProviderAddress};
use crate::error::SourceError;
use crate::package::{PackageMeta, Version, VersionList};
use crate::platform::Platform;
use crate::runtime::Runtime;

use super::Source;
use super::diagnostic::{Diagnostic, SkipReason};
use super::layout::{ADDRESS_DEPTH, Classification, EntryKind, UNPACKED_DEPTH, classify};

/// Discovered packages keyed by provider, in walk order within each provider.
pub type PackageMap = BTreeMap<ProviderAddress, Vec<PackageMeta>>;

/// Everything a full walk of the mirror found.
#[derive(Debug, Default)]
pub struct Scan {
    pub packages: PackageMap,
    pub diagnostics: Vec<Diagnostic>,
}

enum Event {
    Package(PackageMeta),
    Skipped(Diagnostic),
}

/// Package source backed by a directory tree of locally-mirrored packages.
///
/// Holds nothing but the root path: every operation walks the tree again, so
/// results always reflect what is currently on disk.
pub struct FilesystemMirrorSource<R: Runtime> {
    runtime: R,
    root: PathBuf,
}

impl<R: Runtime> FilesystemMirrorSource<R> {
    pub fn new(runtime: R, root: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the whole mirror, collecting packages and skip diagnostics.
    ///
    /// Fails only if a directory cannot be listed, including the root itself.
    #[tracing::instrument(skip(self), fields(root = %self.root.display()))]
    pub fn scan(&self) -> Result<Scan, SourceError> {
        let mut scan = Scan::default();
        self.walk(None, &mut |event| {
            match event {
                Event::Package(meta) => scan
                    .packages
                    .entry(meta.provider.clone())
                    .or_default()
                    .push(meta),
                Event::Skipped(diagnostic) => scan.diagnostics.push(diagnostic),
            }
            ControlFlow::Continue(())
        })?;

        debug!(
            "Found {} provider(s) with {} skipped path(s) under {}",
            scan.packages.len(),
            scan.diagnostics.len(),
            self.root.display()
        );
        Ok(scan)
    }

    /// All packages in the mirror, keyed by provider.
    ///
    /// Packages that share a version and platform are all kept.
    pub fn all_available_packages(&self) -> Result<PackageMap, SourceError> {
        Ok(self.scan()?.packages)
    }

    fn walk<F>(&self, scope: Option<&ProviderAddress>, visit: &mut F) -> Result<(), SourceError>
    where
        F: FnMut(Event) -> ControlFlow<()>,
    {
        let mut segments = Vec::new();
        self.walk_dir(&self.root, &mut segments, scope, visit)?;
        Ok(())
    }

    fn walk_dir<F>(
        &self,
        dir: &Path,
        segments: &mut Vec<String>,
        scope: Option<&ProviderAddress>,
        visit: &mut F,
    ) -> Result<ControlFlow<()>, SourceError>
    where
        F: FnMut(Event) -> ControlFlow<()>,
    {
        let mut entries = self
            .runtime
            .read_dir(dir)
            .map_err(|e| SourceError::search(dir, e))?;
        entries.sort();

        for path in entries {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                // Such a name never matches a provider address segment, and
                // paths shorter than an address are not reported.
                let depth = segments.len() + 1;
                if depth < ADDRESS_DEPTH || (scope.is_some() && depth <= ADDRESS_DEPTH) {
                    continue;
                }
                let flow = self.skip(Diagnostic::new(path.clone(), SkipReason::NonUtf8Name), visit);
                if flow.is_break() {
                    return Ok(flow);
                }
                continue;
            };

            segments.push(name.to_string());
            if scope.is_some_and(|provider| !in_scope(provider, segments)) {
                segments.pop();
                continue;
            }

            let kind = self.entry_kind(&path);
            let classification = {
                let parts: Vec<&str> = segments.iter().map(String::as_str).collect();
                classify(&parts, kind, &path)
            };

            let flow = match classification {
                // Never look inside a package, whatever the classifier says.
                Classification::Descend if segments.len() < UNPACKED_DEPTH => {
                    self.walk_dir(&path, segments, scope, visit)?
                }
                Classification::Descend | Classification::Ignore => ControlFlow::Continue(()),
                Classification::Skip(reason) => self.skip(Diagnostic::new(path, reason), visit),
                Classification::Package(meta) => {
                    debug!(
                        "Found {} v{} for {} at {}",
                        meta.provider,
                        meta.version,
                        meta.target_platform,
                        meta.location.path().display()
                    );
                    visit(Event::Package(meta))
                }
            };

            segments.pop();
            if flow.is_break() {
                return Ok(flow);
            }
        }

        Ok(ControlFlow::Continue(()))
    }

    fn skip<F>(&self, diagnostic: Diagnostic, visit: &mut F) -> ControlFlow<()>
    where
        F: FnMut(Event) -> ControlFlow<()>,
    {
        warn!("{}", diagnostic);
        visit(Event::Skipped(diagnostic))
    }

    fn entry_kind(&self, path: &Path) -> EntryKind {
        if self.runtime.is_dir(path) {
            EntryKind::Dir
        } else if self.runtime.is_file(path) {
            EntryKind::File
        } else {
            EntryKind::Other
        }
    }
}

/// Whether the newest segment still lies on the directory path of `provider`.
/// Earlier segments were checked when their own directories were entered.
fn in_scope(provider: &ProviderAddress, segments: &[String]) -> bool {
    match segments {
        [hostname] => Hostname::for_comparison(hostname).is_ok_and(|h| h == provider.hostname),
        [_, namespace] => namespace.eq_ignore_ascii_case(&provider.namespace),
        [_, _, type_name] => type_name.eq_ignore_ascii_case(&provider.type_name),
        _ => true,
    }
}

impl<R: Runtime> Source for FilesystemMirrorSource<R> {
    /// Versions of `provider` present in the mirror, in walk order.
    ///
    /// Only the provider's own directories are walked. A mirror without
    /// that provider, or without a root directory at all, has no versions.
    #[tracing::instrument(skip(self))]
    fn available_versions(&self, provider: &ProviderAddress) -> Result<VersionList, SourceError> {
        let mut versions = VersionList::new();
        if !self.runtime.exists(&self.root) {
            debug!("Mirror root {} does not exist", self.root.display());
            return Ok(versions);
        }

        self.walk(Some(provider), &mut |event| {
            if let Event::Package(meta) = event {
                if meta.provider == *provider {
                    versions.push(meta.version);
                }
            }
            ControlFlow::Continue(())
        })?;

        Ok(versions)
    }

    /// The package for `provider` at exactly `version` built for `target`.
    ///
    /// If the mirror holds more than one, the first in walk order wins.
    #[tracing::instrument(skip(self))]
    fn package_meta(
        &self,
        provider: &ProviderAddress,
        version: &Version,
        target: &Platform,
    ) -> Result<PackageMeta, SourceError> {
        let not_found = || SourceError::NotFound {
            provider: provider.clone(),
            version: version.clone(),
            platform: target.clone(),
        };

        if !self.runtime.exists(&self.root) {
            return Err(not_found());
        }

        let mut found = None;
        self.walk(Some(provider), &mut |event| match event {
            Event::Package(meta)
                if meta.provider == *provider
                    && meta.version == *version
                    && meta.target_platform == *target =>
            {
                found = Some(meta);
                ControlFlow::Break(())
            }
            _ => ControlFlow::Continue(()),
        })?;

        found.ok_or_else(not_found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{PackageLayout, PackageLocation};
    use crate::runtime::{MockRuntime, RealRuntime};
    use mockall::predicate::eq;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    /// Build a mirror from relative paths. Paths ending in `/` become
    /// directories, everything else an empty file.
    fn mirror(paths: &[&str]) -> TempDir {
        let dir = tempdir().unwrap();
        for path in paths {
            let full = dir.path().join(path.trim_end_matches('/'));
            if path.ends_with('/') {
                fs::create_dir_all(&full).unwrap();
            } else {
                fs::create_dir_all(full.parent().unwrap()).unwrap();
                fs::write(&full, b"").unwrap();
            }
        }
        dir
    }

    fn source(dir: &TempDir) -> FilesystemMirrorSource<RealRuntime> {
        FilesystemMirrorSource::new(RealRuntime, dir.path())
    }

    fn widget() -> ProviderAddress {
        "example.com/acme/widget".parse().unwrap()
    }

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test_log::test]
    fn test_all_available_packages_unpacked() {
        let dir = mirror(&[
            "example.com/acme/widget/1.0.0/linux_amd64/",
            "example.com/acme/widget/1.0.0/darwin_arm64/",
            "example.com/acme/widget/2.0.0/linux_amd64/",
            "registry.pvmirror.io/-/legacy/0.1.0/windows_386/",
        ]);

        let packages = source(&dir).all_available_packages().unwrap();
        assert_eq!(packages.len(), 2);

        let widgets = &packages[&widget()];
        assert_eq!(widgets.len(), 3);
        // Lexical walk order
        assert_eq!(widgets[0].version, v("1.0.0"));
        assert_eq!(widgets[0].target_platform, Platform::new("darwin", "arm64"));
        assert_eq!(widgets[1].target_platform, Platform::new("linux", "amd64"));
        assert_eq!(widgets[2].version, v("2.0.0"));
        assert_eq!(
            widgets[2].location,
            PackageLocation::LocalDir(dir.path().join("example.com/acme/widget/2.0.0/linux_amd64"))
        );

        let legacy = &packages[&ProviderAddress::legacy("legacy")];
        assert_eq!(legacy.len(), 1);
        assert_eq!(legacy[0].filename, "plugin-provider-legacy_0.1.0_windows_386.zip");
    }

    #[test_log::test]
    fn test_all_available_packages_packed() {
        let dir = mirror(&[
            "example.com/acme/widget/plugin-provider-widget_1.0.0_linux_amd64.zip",
            "example.com/acme/widget/1.0.0/darwin_arm64/",
        ]);

        let packages = source(&dir).all_available_packages().unwrap();
        let widgets = &packages[&widget()];
        assert_eq!(widgets.len(), 2);
        assert_eq!(widgets[0].location.layout(), PackageLayout::Unpacked);
        assert_eq!(widgets[1].location.layout(), PackageLayout::Packed);
        assert_eq!(widgets[1].target_platform, Platform::new("linux", "amd64"));
    }

    #[test_log::test]
    fn test_scan_skips_malformed_entries() {
        let dir = mirror(&[
            "example.com/acme/widget/1.0.0/linux_amd64/",
            "bad_host.example/acme/widget/1.0.0/linux_amd64/",
            "example.com/-/widget/1.0.0/linux_amd64/",
            "example.com/acme/gadget/latest/linux_amd64/",
            "example.com/acme/gadget/1.0.0/linux/",
            "example.com/acme/gadget/1.0.0/linux_arm64",
            "example.com/acme/gadget/README.md",
        ]);

        let scan = source(&dir).scan().unwrap();
        assert_eq!(scan.packages.len(), 1);
        assert_eq!(scan.packages[&widget()].len(), 1);

        let reasons: Vec<&SkipReason> = scan.diagnostics.iter().map(|d| &d.reason).collect();
        assert_eq!(reasons.len(), 6);
        assert!(
            reasons
                .iter()
                .any(|r| matches!(r, SkipReason::InvalidHostname(_)))
        );
        assert!(
            reasons
                .iter()
                .any(|r| matches!(r, SkipReason::LegacyNamespaceOffRegistry(_)))
        );
        assert!(
            reasons
                .iter()
                .any(|r| matches!(r, SkipReason::InvalidVersion(_)))
        );
        assert!(
            reasons
                .iter()
                .any(|r| matches!(r, SkipReason::InvalidPlatform(_)))
        );
        assert!(
            reasons
                .iter()
                .any(|r| matches!(r, SkipReason::UnexpectedFile))
        );
        assert!(
            reasons
                .iter()
                .any(|r| matches!(r, SkipReason::UnrecognizedArchive(_)))
        );
    }

    #[test]
    fn test_scan_ignores_short_paths() {
        let dir = mirror(&["README", "example.com/NOTES", "example.com/acme/"]);

        let scan = source(&dir).scan().unwrap();
        assert!(scan.packages.is_empty());
        assert!(scan.diagnostics.is_empty());
    }

    #[test]
    fn test_scan_does_not_look_inside_packages() {
        let dir = mirror(&[
            "example.com/acme/widget/1.0.0/linux_amd64/plugin-provider-widget",
            "example.com/acme/widget/1.0.0/linux_amd64/docs/1.0.0/linux_amd64/",
        ]);

        let scan = source(&dir).scan().unwrap();
        assert_eq!(scan.packages[&widget()].len(), 1);
        assert!(scan.diagnostics.is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_names_outside_addresses_are_ignored() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = mirror(&["example.com/acme/widget/1.0.0/linux_amd64/"]);
        fs::write(dir.path().join(OsStr::from_bytes(b"notes\xff")), b"").unwrap();
        fs::create_dir_all(dir.path().join("example.com").join(OsStr::from_bytes(b"ac\xffme")))
            .unwrap();

        let scan = source(&dir).scan().unwrap();
        assert_eq!(scan.packages[&widget()].len(), 1);
        assert!(scan.diagnostics.is_empty());

        let versions = source(&dir).available_versions(&widget()).unwrap();
        assert_eq!(versions.to_vec(), vec![v("1.0.0")]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_names_inside_addresses_are_reported() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = mirror(&["example.com/acme/widget/"]);
        let odd = dir
            .path()
            .join("example.com/acme/widget")
            .join(OsStr::from_bytes(b"1.0\xff"));
        fs::create_dir_all(&odd).unwrap();

        let scan = source(&dir).scan().unwrap();
        assert!(scan.packages.is_empty());
        assert_eq!(scan.diagnostics.len(), 1);
        assert_eq!(scan.diagnostics[0].path, odd);
        assert!(matches!(scan.diagnostics[0].reason, SkipReason::NonUtf8Name));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_keeps_duplicates_across_hostname_spellings() {
        let dir = mirror(&[
            "example.com/acme/widget/1.0.0/linux_amd64/",
            "example.com:443/acme/widget/1.0.0/linux_amd64/",
        ]);

        let packages = source(&dir).all_available_packages().unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[&widget()].len(), 2);
    }

    #[test]
    fn test_all_available_packages_missing_root_fails() {
        let dir = tempdir().unwrap();
        let source = FilesystemMirrorSource::new(RealRuntime, dir.path().join("missing"));

        let err = source.all_available_packages().unwrap_err();
        assert!(matches!(err, SourceError::Search { .. }));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_scan_fails_when_subdirectory_unreadable() {
        let mut runtime = MockRuntime::new();
        let root = PathBuf::from("/mirror");
        let host_dir = root.join("example.com");

        runtime
            .expect_read_dir()
            .with(eq(root.clone()))
            .returning(|p| Ok(vec![p.join("example.com")]));
        runtime
            .expect_is_dir()
            .with(eq(host_dir.clone()))
            .returning(|_| true);
        runtime
            .expect_read_dir()
            .with(eq(host_dir.clone()))
            .returning(|_| Err(anyhow::anyhow!("permission denied")));

        let source = FilesystemMirrorSource::new(runtime, root);
        match source.scan() {
            Err(SourceError::Search { path, .. }) => assert_eq!(path, host_dir),
            other => panic!("Expected search error, got {:?}", other.map(|s| s.packages)),
        }
    }

    #[test]
    fn test_scan_skips_vanished_entries() {
        let mut runtime = MockRuntime::new();
        let root = PathBuf::from("/mirror");

        // Listed, then removed before it could be inspected
        runtime
            .expect_read_dir()
            .with(eq(root.clone()))
            .returning(|p| Ok(vec![p.join("example.com")]));
        runtime.expect_is_dir().returning(|_| false);
        runtime.expect_is_file().returning(|_| false);

        let scan = FilesystemMirrorSource::new(runtime, root).scan().unwrap();
        assert!(scan.packages.is_empty());
        assert!(scan.diagnostics.is_empty());
    }

    #[test]
    fn test_available_versions() {
        let dir = mirror(&[
            "example.com/acme/widget/2.0.0/linux_amd64/",
            "example.com/acme/widget/1.0.0/linux_amd64/",
            "example.com/acme/widget/1.0.0/darwin_arm64/",
            "example.com/acme/widget/plugin-provider-widget_3.0.0_linux_amd64.zip",
            "example.com/acme/gadget/9.0.0/linux_amd64/",
            "other.example/acme/widget/8.0.0/linux_amd64/",
        ]);

        let versions = source(&dir).available_versions(&widget()).unwrap();
        assert_eq!(versions.into_vec(), vec![v("1.0.0"), v("2.0.0"), v("3.0.0")]);
    }

    #[test]
    fn test_available_versions_matches_hostname_by_comparison_form() {
        let dir = mirror(&["Example.COM/Acme/widget/1.0.0/linux_amd64/"]);

        let versions = source(&dir).available_versions(&widget()).unwrap();
        assert_eq!(versions.into_vec(), vec![v("1.0.0")]);
    }

    #[test]
    fn test_available_versions_unknown_provider() {
        let dir = mirror(&["example.com/acme/gadget/1.0.0/linux_amd64/"]);

        let versions = source(&dir).available_versions(&widget()).unwrap();
        assert!(versions.is_empty());
    }

    #[test]
    fn test_available_versions_missing_root() {
        let dir = tempdir().unwrap();
        let source = FilesystemMirrorSource::new(RealRuntime, dir.path().join("missing"));

        let versions = source.available_versions(&widget()).unwrap();
        assert!(versions.is_empty());
    }

    #[test]
    fn test_available_versions_only_walks_provider_subtree() {
        let mut runtime = MockRuntime::new();
        let root = PathBuf::from("/mirror");

        runtime
            .expect_exists()
            .with(eq(root.clone()))
            .returning(|_| true);
        runtime
            .expect_read_dir()
            .with(eq(root.clone()))
            .returning(|p| Ok(vec![p.join("example.com"), p.join("other.example")]));
        runtime
            .expect_is_dir()
            .with(eq(root.join("example.com")))
            .returning(|_| true);
        runtime
            .expect_read_dir()
            .with(eq(root.join("example.com")))
            .returning(|p| Ok(vec![p.join("acme"), p.join("other")]));
        runtime
            .expect_is_dir()
            .with(eq(root.join("example.com/acme")))
            .returning(|_| true);
        runtime
            .expect_read_dir()
            .with(eq(root.join("example.com/acme")))
            .returning(|_| Ok(vec![]));

        // No expectations for other.example or example.com/other: touching
        // them fails the test.
        let versions = FilesystemMirrorSource::new(runtime, root)
            .available_versions(&widget())
            .unwrap();
        assert!(versions.is_empty());
    }

    #[test]
    fn test_package_meta() {
        let dir = mirror(&[
            "example.com/acme/widget/1.0.0/linux_amd64/",
            "example.com/acme/widget/1.0.0/darwin_arm64/",
        ]);

        let meta = source(&dir)
            .package_meta(&widget(), &v("1.0.0"), &Platform::new("linux", "amd64"))
            .unwrap();
        assert_eq!(meta.provider, widget());
        assert_eq!(
            meta.location,
            PackageLocation::LocalDir(dir.path().join("example.com/acme/widget/1.0.0/linux_amd64"))
        );
        assert!(meta.is_filename_synthetic());
    }

    #[test]
    fn test_package_meta_first_match_wins() {
        let dir = mirror(&[
            "example.com/acme/widget/plugin-provider-widget_1.0.0_linux_amd64.zip",
            "example.com/acme/widget/1.0.0/linux_amd64/",
        ]);

        let meta = source(&dir)
            .package_meta(&widget(), &v("1.0.0"), &Platform::new("linux", "amd64"))
            .unwrap();
        // "1.0.0" sorts before "plugin-provider-..."
        assert_eq!(meta.location.layout(), PackageLayout::Unpacked);
    }

    #[test]
    fn test_package_meta_not_found() {
        let dir = mirror(&["example.com/acme/widget/1.0.0/linux_amd64/"]);
        let source = source(&dir);

        let err = source
            .package_meta(&widget(), &v("1.0.0"), &Platform::new("windows", "amd64"))
            .unwrap_err();
        assert!(err.is_not_found());

        let err = source
            .package_meta(&widget(), &v("2.0.0"), &Platform::new("linux", "amd64"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_package_meta_missing_root() {
        let dir = tempdir().unwrap();
        let source = FilesystemMirrorSource::new(RealRuntime, dir.path().join("missing"));

        let err = source
            .package_meta(&widget(), &v("1.0.0"), &Platform::new("linux", "amd64"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_follows_symlinked_package_directory() {
        let dir = mirror(&["store/widget-1.0.0/", "example.com/acme/widget/1.0.0/"]);
        std::os::unix::fs::symlink(
            dir.path().join("store/widget-1.0.0"),
            dir.path().join("example.com/acme/widget/1.0.0/linux_amd64"),
        )
        .unwrap();

        let packages = source(&dir).all_available_packages().unwrap();
        assert_eq!(packages[&widget()].len(), 1);
    }
}
