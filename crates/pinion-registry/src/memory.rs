//! In-memory registry backend.
//!
//! Used by tests and by embedders that keep their own persistence. All
//! writes take a single lock, so `create` is atomic with respect to the
//! uniqueness check.

use std::collections::HashMap;

use parking_lot::RwLock;
use pinion_core::{ArtifactId, Tag, TagKey, VersionedArtifact};

use crate::backend::{ListFilter, RegistryBackend};
use crate::error::{RegistryError, Result};

/// A registry held entirely in memory.
#[derive(Debug)]
pub struct MemoryRegistry<M> {
    artifacts: RwLock<HashMap<ArtifactId, VersionedArtifact<M>>>,
    tags: RwLock<HashMap<TagKey, Tag>>,
}

impl<M> MemoryRegistry<M> {
    pub fn new() -> Self {
        MemoryRegistry {
            artifacts: RwLock::new(HashMap::new()),
            tags: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored releases.
    pub fn len(&self) -> usize {
        self.artifacts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.read().is_empty()
    }

    /// Drop a release. Simulates collaborator-side deletion.
    pub fn remove(&self, id: &ArtifactId) -> Option<VersionedArtifact<M>> {
        self.artifacts.write().remove(id)
    }
}

impl<M> Default for MemoryRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Clone> RegistryBackend for MemoryRegistry<M> {
    type Metadata = M;

    fn get(&self, id: &ArtifactId) -> Result<Option<VersionedArtifact<M>>> {
        Ok(self.artifacts.read().get(id).cloned())
    }

    fn list(&self, filter: &ListFilter) -> Result<Vec<VersionedArtifact<M>>> {
        Ok(self
            .artifacts
            .read()
            .values()
            .filter(|a| filter.matches(&a.name))
            .cloned()
            .collect())
    }

    fn create(&self, artifact: &VersionedArtifact<M>) -> Result<ArtifactId> {
        // Key on the derived id so a caller-supplied id cannot dodge uniqueness.
        let id = ArtifactId::derive(&artifact.name, &artifact.version);
        let mut artifacts = self.artifacts.write();
        if artifacts.contains_key(&id) {
            return Err(RegistryError::Conflict {
                name: artifact.name.to_string(),
                version: artifact.version.to_string(),
            });
        }
        let mut stored = artifact.clone();
        stored.id = id.clone();
        artifacts.insert(id.clone(), stored);
        Ok(id)
    }

    fn get_tag(&self, key: &TagKey) -> Result<Option<Tag>> {
        Ok(self.tags.read().get(key).cloned())
    }

    fn list_tags(&self, filter: &ListFilter) -> Result<Vec<Tag>> {
        Ok(self
            .tags
            .read()
            .values()
            .filter(|t| filter.matches(t.name()))
            .cloned()
            .collect())
    }

    fn save_tag(&self, tag: &Tag) -> Result<()> {
        self.tags.write().insert(tag.key.clone(), tag.clone());
        Ok(())
    }

    fn delete_tag(&self, key: &TagKey) -> Result<bool> {
        Ok(self.tags.write().remove(key).is_some())
    }
}
