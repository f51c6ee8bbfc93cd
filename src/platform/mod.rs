//! Target platforms.
//!
//! A platform is an operating system and CPU architecture pair, written on
//! disk as `os_arch` (e.g. `linux_amd64`).

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Operating system and architecture a package is built for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Parse an `os_arch` string.
    ///
    /// The string is split at the first underscore. Both halves must be
    /// non-empty and consist of lowercase ASCII letters and digits.
    pub fn parse(given: &str) -> Result<Self, ParseError> {
        let invalid = |reason| ParseError::Platform {
            given: given.to_string(),
            reason,
        };

        let (os, arch) = given
            .split_once('_')
            .ok_or_else(|| invalid("must be two words separated by an underscore"))?;

        if os.is_empty() || arch.is_empty() {
            return Err(invalid("must be two words separated by an underscore"));
        }
        if !is_platform_word(os) {
            return Err(invalid("OS must contain only lowercase letters and digits"));
        }
        if !is_platform_word(arch) {
            return Err(invalid(
                "architecture must contain only lowercase letters and digits",
            ));
        }

        Ok(Self::new(os, arch))
    }

    /// The platform this binary was compiled for, in on-disk naming.
    pub fn current() -> Self {
        Self {
            os: Self::detect_os(),
            arch: Self::detect_arch(),
        }
    }

    fn detect_os() -> String {
        #[cfg(target_os = "macos")]
        {
            "darwin".to_string()
        }
        #[cfg(target_os = "linux")]
        {
            "linux".to_string()
        }
        #[cfg(target_os = "windows")]
        {
            "windows".to_string()
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            std::env::consts::OS.to_string()
        }
    }

    fn detect_arch() -> String {
        #[cfg(target_arch = "x86_64")]
        {
            "amd64".to_string()
        }
        #[cfg(target_arch = "aarch64")]
        {
            "arm64".to_string()
        }
        #[cfg(target_arch = "x86")]
        {
            "386".to_string()
        }
        #[cfg(target_arch = "arm")]
        {
            "arm".to_string()
        }
        #[cfg(not(any(
            target_arch = "x86_64",
            target_arch = "aarch64",
            target_arch = "x86",
            target_arch = "arm"
        )))]
        {
            std::env::consts::ARCH.replace('_', "")
        }
    }
}

fn is_platform_word(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.os, self.arch)
    }
}

impl FromStr for Platform {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::parse(s)
    }
}
