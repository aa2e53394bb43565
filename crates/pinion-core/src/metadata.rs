//! Kind-specific payloads carried by [`crate::VersionedArtifact`].
//!
//! Resolution never looks inside these; they only travel with the release.

use serde::{Deserialize, Serialize};

/// A reusable build template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateMetadata {
    #[serde(default)]
    pub description: String,
    /// Maintainer's email.
    #[serde(default)]
    pub maintainer: String,
    /// The template's job configuration.
    #[serde(default)]
    pub config: serde_json::Value,
    /// Pipeline that published the template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_id: Option<u64>,
}

/// How a command is executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandFormat {
    #[default]
    Binary,
    Docker,
    Habitat,
}

/// A shared command alias.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandMetadata {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub maintainer: String,
    #[serde(default)]
    pub format: CommandFormat,
    /// Format-specific settings (image, package, binary path).
    #[serde(default)]
    pub config: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_id: Option<u64>,
}
