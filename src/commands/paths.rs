use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::runtime::Runtime;

/// Get the default mirror root directory
#[tracing::instrument(skip(runtime))]
pub fn default_mirror_root<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    let home_dir = runtime
        .home_dir()
        .context("Could not find home directory")?;
    Ok(home_dir.join(".pvmirror").join("plugins"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use crate::test_utils::{configure_mock_runtime_basics, test_root};

    #[test]
    fn test_default_mirror_root() {
        let mut runtime = MockRuntime::new();
        configure_mock_runtime_basics(&mut runtime);

        assert_eq!(default_mirror_root(&runtime).unwrap(), test_root());
    }

    #[test]
    fn test_default_mirror_root_no_home() {
        let mut runtime = MockRuntime::new();
        runtime.expect_home_dir().returning(|| None);

        let err = default_mirror_root(&runtime).unwrap_err();
        assert!(err.to_string().contains("home directory"));
    }
}
