//! Registry error types.
//!
//! "Not found" is not an error here: lookups return `Ok(None)`.

use pinion_core::ReferenceError;

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The reference string or artifact name is malformed.
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    /// A publish selector is not in the version grammar.
    #[error("invalid version '{selector}': expected major[.minor[.patch]]")]
    InvalidVersion { selector: String },

    /// A release line already holds the highest representable patch.
    #[error("release line {line} has no patch numbers left")]
    LineExhausted { line: String },

    /// A publish request carries an unusable label.
    #[error("invalid label '{label}' for '{name}'")]
    InvalidLabel { name: String, label: String },

    /// A tag label that a reference could never select.
    #[error("invalid tag '{tag}': {detail}")]
    InvalidTag { tag: String, detail: String },

    /// Another publisher created this version first. Retry from a fresh snapshot.
    #[error("'{name}@{version}' already published")]
    Conflict { name: String, version: String },

    /// A bare name exists under several namespaces.
    #[error("'{name}' is ambiguous: found in namespaces {}", .candidates.join(", "))]
    AmbiguousNamespace { name: String, candidates: Vec<String> },

    /// A tag write targets a version that was never published.
    #[error("cannot tag '{tag}': {name}@{version} does not exist")]
    TagTargetMissing {
        name: String,
        tag: String,
        version: String,
    },

    /// Invalid registry configuration.
    #[error("invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    /// Backend failure with no more specific variant.
    #[error("storage error: {detail}")]
    Storage { detail: String },

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegistryError {
    /// Whether repeating the operation from a fresh snapshot can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RegistryError::Conflict { .. })
    }
}

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_conflicts_are_retryable() {
        let conflict = RegistryError::Conflict {
            name: "foo".to_string(),
            version: "1.0.0".to_string(),
        };
        assert!(conflict.is_retryable());
        assert!(!RegistryError::InvalidVersion {
            selector: "stable".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn ambiguous_message_lists_candidates() {
        let err = RegistryError::AmbiguousNamespace {
            name: "knife".to_string(),
            candidates: vec!["chefdk".to_string(), "tools".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "'knife' is ambiguous: found in namespaces chefdk, tools"
        );
    }
}
