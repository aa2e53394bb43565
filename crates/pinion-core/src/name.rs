//! Artifact family names.
//!
//! An [`ArtifactName`] identifies every release of one template or command,
//! optionally qualified by a namespace (`chefdk/knife`, `nodejs`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ReferenceError, Result};

/// Check whether a token is a valid namespace or name identifier.
pub fn is_identifier(token: &str) -> bool {
    !token.is_empty()
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// The family identity shared by all releases of an artifact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArtifactName {
    /// Optional owning namespace.
    #[serde(default)]
    pub namespace: Option<String>,
    /// Bare artifact name.
    pub name: String,
}

impl ArtifactName {
    /// Build a validated name.
    pub fn new(namespace: Option<&str>, name: &str) -> Result<Self> {
        if let Some(ns) = namespace {
            validate("namespace", ns)?;
        }
        validate("name", name)?;
        Ok(ArtifactName {
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
        })
    }

    /// A name with no namespace.
    pub fn bare(name: &str) -> Result<Self> {
        Self::new(None, name)
    }

    /// A namespaced name.
    pub fn namespaced(namespace: &str, name: &str) -> Result<Self> {
        Self::new(Some(namespace), name)
    }

    /// The same bare name under a different namespace.
    pub fn with_namespace(&self, namespace: Option<String>) -> Self {
        ArtifactName {
            namespace,
            name: self.name.clone(),
        }
    }

    /// Validate both components of an already-constructed name.
    pub fn validate(&self) -> Result<()> {
        if let Some(ns) = &self.namespace {
            validate("namespace", ns)?;
        }
        validate("name", &self.name)
    }
}

fn validate(kind: &'static str, value: &str) -> Result<()> {
    if is_identifier(value) {
        Ok(())
    } else {
        Err(ReferenceError::InvalidIdentifier {
            kind,
            value: value.to_string(),
        })
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{ns}/{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}
