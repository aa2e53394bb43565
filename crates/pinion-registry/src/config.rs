//! Registry configuration.
//!
//! ```toml
//! [resolver]
//! namespace-policy = "reject"
//!
//! [publish]
//! max-attempts = 3
//!
//! [storage]
//! root = "/var/lib/pinion"
//! ```
//!
//! Every section and key is optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

/// What to do when a bare name exists under several namespaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamespacePolicy {
    /// Refuse to guess.
    #[default]
    Reject,
    /// Take the smallest candidate, un-namespaced first.
    FirstMatch,
}

/// Top-level registry configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub publish: PublishConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// `[resolver]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ResolverConfig {
    #[serde(default)]
    pub namespace_policy: NamespacePolicy,
}

/// `[publish]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PublishConfig {
    /// Total attempts per publish, counting the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for PublishConfig {
    fn default() -> Self {
        PublishConfig {
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

/// `[storage]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Root directory of a local registry.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

impl RegistryConfig {
    /// Parse a configuration from a TOML string.
    pub fn parse(input: &str) -> Result<Self> {
        let config: RegistryConfig = toml::from_str(input)?;

        if config.publish.max_attempts == 0 {
            return Err(RegistryError::InvalidConfig {
                detail: "publish.max-attempts must be at least 1".to_string(),
            });
        }

        Ok(config)
    }

    /// Load a configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }
}
