//! The registry facade.
//!
//! A [`Registry`] bundles one backend with its configuration. Build it once
//! at startup and hand out references; it holds no other state, so
//! concurrent resolution needs no coordination beyond the backend's own.

use pinion_core::{ArtifactName, Reference, Tag, Version, VersionedArtifact};

use crate::audit::{self, HistoryReport};
use crate::backend::RegistryBackend;
use crate::config::RegistryConfig;
use crate::error::Result;
use crate::namespace;
use crate::publish::{self, PublishOptions, PublishRequest};
use crate::resolution;
use crate::tags;

/// Resolver and publisher over one backend.
#[derive(Debug)]
pub struct Registry<B> {
    backend: B,
    config: RegistryConfig,
}

impl<B: RegistryBackend> Registry<B> {
    pub fn new(backend: B, config: RegistryConfig) -> Self {
        Registry { backend, config }
    }

    /// A registry with the default configuration.
    pub fn with_backend(backend: B) -> Self {
        Self::new(backend, RegistryConfig::default())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Resolve `[namespace/]name@selector`, optionally requiring a label.
    ///
    /// `Ok(None)` means nothing matched.
    pub fn resolve(
        &self,
        reference: &str,
        label: Option<&str>,
    ) -> Result<Option<VersionedArtifact<B::Metadata>>> {
        resolution::resolve(
            reference,
            label,
            &self.backend,
            self.config.resolver.namespace_policy,
        )
    }

    /// Resolve an already-parsed reference.
    pub fn resolve_reference(
        &self,
        reference: &Reference,
        label: Option<&str>,
    ) -> Result<Option<VersionedArtifact<B::Metadata>>> {
        resolution::resolve_reference(
            reference,
            label,
            &self.backend,
            self.config.resolver.namespace_policy,
        )
    }

    /// The namespace a bare name would resolve under.
    pub fn infer_namespace(&self, name: &str) -> Result<Option<String>> {
        namespace::infer_namespace(&self.backend, name, self.config.resolver.namespace_policy)
    }

    /// Every release of a family, newest first.
    pub fn versions(&self, name: &ArtifactName) -> Result<Vec<VersionedArtifact<B::Metadata>>> {
        resolution::list_versions(&self.backend, name)
    }

    /// Point a tag at an existing release.
    pub fn set_tag(&self, name: &ArtifactName, tag: &str, version: &Version) -> Result<Tag> {
        tags::set_tag(&self.backend, name, tag, version)
    }

    /// Remove a tag. Returns whether it existed.
    pub fn remove_tag(&self, name: &ArtifactName, tag: &str) -> Result<bool> {
        tags::remove_tag(&self.backend, name, tag)
    }

    /// All tags of a family, sorted by label.
    pub fn tags(&self, name: &ArtifactName) -> Result<Vec<Tag>> {
        tags::list_tags(&self.backend, name)
    }

    /// Audit a family's release history.
    pub fn audit(&self, name: &ArtifactName) -> Result<HistoryReport> {
        audit::audit(&self.backend, name)
    }
}

impl<B> Registry<B>
where
    B: RegistryBackend,
    B::Metadata: Clone,
{
    /// Publish a release, retrying conflicts per `[publish] max-attempts`.
    pub fn publish(
        &self,
        request: &PublishRequest<B::Metadata>,
    ) -> Result<VersionedArtifact<B::Metadata>> {
        let options = PublishOptions {
            dry_run: false,
            max_attempts: self.config.publish.max_attempts,
        };
        publish::publish(request, &self.backend, &options)
    }

    /// Publish with explicit options.
    pub fn publish_with(
        &self,
        request: &PublishRequest<B::Metadata>,
        options: &PublishOptions,
    ) -> Result<VersionedArtifact<B::Metadata>> {
        publish::publish(request, &self.backend, options)
    }
}

/// Registries specialised to the two artifact kinds.
pub mod kinds {
    use pinion_core::{CommandMetadata, TemplateMetadata};

    use super::Registry;
    use crate::memory::MemoryRegistry;

    /// In-memory template registry.
    pub type MemoryTemplateRegistry = Registry<MemoryRegistry<TemplateMetadata>>;

    /// In-memory command registry.
    pub type MemoryCommandRegistry = Registry<MemoryRegistry<CommandMetadata>>;
}
