//! Hostname normalization.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Hostname of the registry that serves legacy (namespace-less) providers.
pub const DEFAULT_REGISTRY_HOST: &str = "registry.pvmirror.io";

const DEFAULT_PORT: u16 = 443;

/// A hostname in comparison form.
///
/// Two hostnames that refer to the same registry compare equal once
/// normalized: ASCII-lowercased, internationalized labels converted to their
/// punycode form, and the default HTTPS port dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Hostname(String);

impl Hostname {
    /// Normalize `given` into comparison form.
    pub fn for_comparison(given: &str) -> Result<Self, ParseError> {
        let invalid = |reason: &str| ParseError::Hostname {
            given: given.to_string(),
            reason: reason.to_string(),
        };

        if given.is_empty() {
            return Err(invalid("hostname is empty"));
        }

        let (host, port) = match given.rsplit_once(':') {
            Some((host, port)) => {
                let port: u16 = port
                    .parse()
                    .map_err(|_| invalid("port must be a decimal number"))?;
                (host, Some(port).filter(|p| *p != DEFAULT_PORT))
            }
            None => (given, None),
        };

        // The host parser decodes percent escapes, so screen the raw text first.
        if !host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '.')
        {
            return Err(invalid("hostname contains characters outside letters, digits, dashes and dots"));
        }

        let domain = match url::Host::parse(host) {
            Ok(url::Host::Domain(domain)) => domain,
            Ok(_) => return Err(invalid("IP addresses are not allowed")),
            Err(e) => return Err(invalid(&e.to_string())),
        };

        for label in domain.split('.') {
            if label.is_empty() {
                return Err(invalid("hostname contains an empty label"));
            }
            if label.starts_with('-') || label.ends_with('-') {
                return Err(invalid("labels must not begin or end with a dash"));
            }
            if !label
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            {
                return Err(invalid("labels may contain only letters, digits and dashes"));
            }
        }

        Ok(match port {
            Some(port) => Hostname(format!("{}:{}", domain, port)),
            None => Hostname(domain),
        })
    }

    pub fn default_registry() -> Self {
        Hostname(DEFAULT_REGISTRY_HOST.to_string())
    }

    pub fn is_default_registry(&self) -> bool {
        self.0 == DEFAULT_REGISTRY_HOST
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Hostname {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hostname::for_comparison(s)
    }
}
