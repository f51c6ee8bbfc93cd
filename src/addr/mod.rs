//! Provider addresses.
//!
//! A provider is identified by a three-part address: the hostname of the
//! registry it originates from, a namespace, and a type name. Addresses that
//! predate the three-part scheme use the reserved [`LEGACY_NAMESPACE`] and are
//! only valid on the default registry host.

mod hostname;

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::error::ParseError;

pub use hostname::{DEFAULT_REGISTRY_HOST, Hostname};

/// Namespace marker for providers addressed by type name alone.
pub const LEGACY_NAMESPACE: &str = "-";

/// Fully-qualified provider address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ProviderAddress {
    pub hostname: Hostname,
    pub namespace: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl ProviderAddress {
    pub fn new(
        hostname: Hostname,
        namespace: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            hostname,
            namespace: namespace.into(),
            type_name: type_name.into(),
        }
    }

    /// Address of a legacy provider, which always lives on the default registry.
    pub fn legacy(type_name: impl Into<String>) -> Self {
        Self::new(Hostname::default_registry(), LEGACY_NAMESPACE, type_name)
    }

    pub fn is_legacy(&self) -> bool {
        self.namespace == LEGACY_NAMESPACE
    }

    /// Short form for user-facing output: the hostname is omitted when it is
    /// the default registry.
    pub fn for_display(&self) -> String {
        if self.hostname.is_default_registry() {
            format!("{}/{}", self.namespace, self.type_name)
        } else {
            self.to_string()
        }
    }
}

impl fmt::Display for ProviderAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.hostname, self.namespace, self.type_name)
    }
}

/// Why a (hostname, namespace, type) triple does not form a provider address.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Hostname(ParseError),

    #[error("legacy provider namespace is only valid on the default registry host, not {0}")]
    LegacyOffRegistry(Hostname),

    #[error(transparent)]
    Part(ParseError),
}

/// Build a provider address from raw path segments.
///
/// The hostname is normalized into comparison form. A legacy namespace is
/// accepted only when the hostname is the default registry host.
pub fn resolve(
    hostname: &str,
    namespace: &str,
    type_name: &str,
) -> Result<ProviderAddress, ResolveError> {
    let hostname = Hostname::for_comparison(hostname).map_err(ResolveError::Hostname)?;
    let type_name = parse_provider_part("type", type_name).map_err(ResolveError::Part)?;

    if namespace == LEGACY_NAMESPACE {
        if !hostname.is_default_registry() {
            return Err(ResolveError::LegacyOffRegistry(hostname));
        }
        return Ok(ProviderAddress::legacy(type_name));
    }

    let namespace = parse_provider_part("namespace", namespace).map_err(ResolveError::Part)?;
    Ok(ProviderAddress::new(hostname, namespace, type_name))
}

/// Validate and normalize a namespace or type name.
///
/// Parts are case-insensitive and stored lowercase. Only ASCII letters,
/// digits and dashes are allowed, and a part may not begin or end with a dash.
pub fn parse_provider_part(part: &'static str, given: &str) -> Result<String, ParseError> {
    let invalid = |reason| ParseError::ProviderPart {
        part,
        given: given.to_string(),
        reason,
    };

    if given.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if !given.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(invalid("must contain only letters, digits and dashes"));
    }
    if given.starts_with('-') || given.ends_with('-') {
        return Err(invalid("must not begin or end with a dash"));
    }

    Ok(given.to_ascii_lowercase())
}

impl FromStr for ProviderAddress {
    type Err = ParseError;

    /// Parses `type`, `namespace/type` or `hostname/namespace/type`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [type_name] => Ok(ProviderAddress::legacy(parse_provider_part(
                "type", type_name,
            )?)),
            [namespace, type_name] => resolve(DEFAULT_REGISTRY_HOST, namespace, type_name)
                .map_err(|e| address_error(s, e)),
            [hostname, namespace, type_name] => {
                resolve(hostname, namespace, type_name).map_err(|e| address_error(s, e))
            }
            _ => Err(ParseError::ProviderAddress {
                given: s.to_string(),
                reason: "expected at most three parts separated by slashes",
            }),
        }
    }
}

fn address_error(given: &str, err: ResolveError) -> ParseError {
    match err {
        ResolveError::Hostname(e) | ResolveError::Part(e) => e,
        ResolveError::LegacyOffRegistry(_) => ParseError::ProviderAddress {
            given: given.to_string(),
            reason: "the legacy namespace is only valid on the default registry host",
        },
    }
}
