//! Published artifacts and the tags that point at them.
//!
//! A [`VersionedArtifact`] is immutable once created. Every artifact is
//! content-addressed by its family name and version, so the same release
//! always gets the same [`ArtifactId`].

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::name::ArtifactName;
use crate::version::Version;

/// A SHA-256 hex digest identifying one published release.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(String);

impl ArtifactId {
    /// Derive the id of `name@version`.
    pub fn derive(name: &ArtifactName, version: &Version) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(format!("{name}@{version}").as_bytes());
        ArtifactId(hex_encode(&hasher.finalize()))
    }

    /// Get the hex string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Encode bytes as lowercase hex string.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// One immutable release of an artifact family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedArtifact<M> {
    pub id: ArtifactId,
    #[serde(flatten)]
    pub name: ArtifactName,
    pub version: Version,
    /// Opaque selection labels attached at publish time.
    #[serde(default)]
    pub labels: BTreeSet<String>,
    /// Kind-specific payload; see [`crate::metadata`].
    pub metadata: M,
    pub create_time: DateTime<Utc>,
}

impl<M> VersionedArtifact<M> {
    /// Assemble a new release, deriving its id.
    pub fn new(
        name: ArtifactName,
        version: Version,
        labels: BTreeSet<String>,
        metadata: M,
        create_time: DateTime<Utc>,
    ) -> Self {
        VersionedArtifact {
            id: ArtifactId::derive(&name, &version),
            name,
            version,
            labels,
            metadata,
            create_time,
        }
    }

    /// Whether the release carries a label.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// The exact reference string for this release.
    pub fn reference(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

/// The unique key of a tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TagKey {
    #[serde(flatten)]
    pub name: ArtifactName,
    pub tag: String,
}

impl TagKey {
    pub fn new(name: ArtifactName, tag: impl Into<String>) -> Self {
        TagKey {
            name,
            tag: tag.into(),
        }
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.tag)
    }
}

/// A mutable alias from `(namespace, name, tag)` to a version.
///
/// Writing a tag again replaces its target; the last write wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(flatten)]
    pub key: TagKey,
    pub version: Version,
    pub update_time: DateTime<Utc>,
}

impl Tag {
    pub fn new(key: TagKey, version: Version, update_time: DateTime<Utc>) -> Self {
        Tag {
            key,
            version,
            update_time,
        }
    }

    pub fn name(&self) -> &ArtifactName {
        &self.key.name
    }

    pub fn label(&self) -> &str {
        &self.key.tag
    }
}
