//! Registry backend trait.
//!
//! The `RegistryBackend` trait is the whole storage contract the resolver
//! relies on: point lookups, unordered listing, an atomic create for
//! releases, and an upsert for tags. Implementations live in
//! [`crate::memory`] and [`crate::local`].

use pinion_core::{ArtifactId, ArtifactName, Tag, TagKey, VersionedArtifact};

use crate::error::Result;

/// Which namespaces a listing covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NamespaceFilter {
    /// Every namespace, including none.
    #[default]
    Any,
    /// Exactly this namespace (`None` means un-namespaced records only).
    Exact(Option<String>),
}

impl NamespaceFilter {
    pub fn matches(&self, namespace: Option<&str>) -> bool {
        match self {
            NamespaceFilter::Any => true,
            NamespaceFilter::Exact(expected) => expected.as_deref() == namespace,
        }
    }
}

/// Listing parameters shared by artifacts and tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilter {
    pub name: String,
    pub namespace: NamespaceFilter,
}

impl ListFilter {
    /// Records of exactly one family.
    pub fn family(name: &ArtifactName) -> Self {
        ListFilter {
            name: name.name.clone(),
            namespace: NamespaceFilter::Exact(name.namespace.clone()),
        }
    }

    /// Records with this bare name in any namespace.
    pub fn any_namespace(name: &str) -> Self {
        ListFilter {
            name: name.to_string(),
            namespace: NamespaceFilter::Any,
        }
    }

    pub fn matches(&self, name: &ArtifactName) -> bool {
        self.name == name.name && self.namespace.matches(name.namespace.as_deref())
    }
}

/// Abstract registry backend.
///
/// Listings come back in no particular order; ordering is the resolver's
/// job.
pub trait RegistryBackend {
    /// Kind-specific payload of the stored artifacts.
    type Metadata;

    /// Fetch one release by id.
    fn get(&self, id: &ArtifactId) -> Result<Option<VersionedArtifact<Self::Metadata>>>;

    /// List releases matching a filter.
    fn list(&self, filter: &ListFilter) -> Result<Vec<VersionedArtifact<Self::Metadata>>>;

    /// Atomically store a new release.
    ///
    /// Must fail with [`crate::RegistryError::Conflict`] when the family
    /// already holds this version, and must never overwrite it.
    fn create(&self, artifact: &VersionedArtifact<Self::Metadata>) -> Result<ArtifactId>;

    /// Fetch a tag by its unique key.
    fn get_tag(&self, key: &TagKey) -> Result<Option<Tag>>;

    /// List tags matching a filter.
    fn list_tags(&self, filter: &ListFilter) -> Result<Vec<Tag>>;

    /// Insert or replace a tag.
    fn save_tag(&self, tag: &Tag) -> Result<()>;

    /// Remove a tag. Returns whether it existed.
    fn delete_tag(&self, key: &TagKey) -> Result<bool>;
}
