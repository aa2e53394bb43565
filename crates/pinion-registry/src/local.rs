//! Local filesystem registry backend.
//!
//! Layout:
//! ```text
//! <root>/
//!   artifacts/
//!     <namespace | @root>/
//!       <name>/
//!         <version>.json
//!   tags/
//!     <namespace | @root>/
//!       <name>/
//!         <hex(tag)>.json
//! ```
//!
//! Releases are linked into place from a temporary file, so a second
//! create of the same version fails without touching the first. Tags are
//! replaced with a rename. Lookups by id scan the tree; this backend is
//! meant for development and single-host use.

use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use pinion_core::artifact::hex_encode;
use pinion_core::{ArtifactId, ArtifactName, Tag, TagKey, VersionedArtifact};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::backend::{ListFilter, NamespaceFilter, RegistryBackend};
use crate::config::StorageConfig;
use crate::error::{RegistryError, Result};

/// Directory name used for records without a namespace. `@` never appears
/// in an identifier, so it cannot collide with a real namespace.
const ROOT_NAMESPACE_DIR: &str = "@root";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A registry stored as JSON files under one directory.
#[derive(Debug)]
pub struct LocalRegistry<M> {
    root: PathBuf,
    _metadata: PhantomData<fn() -> M>,
}

impl<M> LocalRegistry<M> {
    /// Create a local registry rooted at the given directory.
    pub fn new(root: PathBuf) -> Self {
        LocalRegistry {
            root,
            _metadata: PhantomData,
        }
    }

    /// Open the registry named by a `[storage]` config section.
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let root = config.root.clone().ok_or_else(|| RegistryError::InvalidConfig {
            detail: "storage.root is required for a local registry".to_string(),
        })?;
        Ok(Self::new(root))
    }

    /// Get the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn artifacts_root(&self) -> PathBuf {
        self.root.join("artifacts")
    }

    fn tags_root(&self) -> PathBuf {
        self.root.join("tags")
    }

    fn artifact_path(&self, artifact: &VersionedArtifact<M>) -> PathBuf {
        family_dir(&self.artifacts_root(), &artifact.name)
            .join(format!("{}.json", artifact.version))
    }

    fn tag_path(&self, key: &TagKey) -> PathBuf {
        family_dir(&self.tags_root(), &key.name)
            .join(format!("{}.json", hex_encode(key.tag.as_bytes())))
    }
}

fn namespace_dir(namespace: Option<&str>) -> &str {
    namespace.unwrap_or(ROOT_NAMESPACE_DIR)
}

fn family_dir(base: &Path, name: &ArtifactName) -> PathBuf {
    base.join(namespace_dir(name.namespace.as_deref()))
        .join(&name.name)
}

/// Family directories under `base` that a filter can match.
fn matching_dirs(base: &Path, filter: &ListFilter) -> Result<Vec<PathBuf>> {
    let namespaces = match &filter.namespace {
        NamespaceFilter::Exact(ns) => vec![base.join(namespace_dir(ns.as_deref()))],
        NamespaceFilter::Any => {
            if !base.is_dir() {
                return Ok(Vec::new());
            }
            let mut dirs = Vec::new();
            for entry in std::fs::read_dir(base)? {
                let entry = entry?;
                if entry.path().is_dir() {
                    dirs.push(entry.path());
                }
            }
            dirs
        }
    };

    Ok(namespaces
        .into_iter()
        .map(|ns| ns.join(&filter.name))
        .filter(|dir| dir.is_dir())
        .collect())
}

/// Read every `*.json` record in the given directories.
fn read_records<T: DeserializeOwned>(dirs: &[PathBuf]) -> Result<Vec<T>> {
    let mut records = Vec::new();
    for dir in dirs {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let data = std::fs::read_to_string(&path)?;
            records.push(serde_json::from_str(&data)?);
        }
    }
    Ok(records)
}

/// Write `data` to a fresh temporary file next to `target`.
fn write_temp(target: &Path, data: &[u8]) -> Result<PathBuf> {
    let dir = target.parent().ok_or_else(|| RegistryError::Storage {
        detail: format!("no parent directory for {}", target.display()),
    })?;
    std::fs::create_dir_all(dir)?;
    let temp = dir.join(format!(
        ".tmp-{}-{}",
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::write(&temp, data)?;
    Ok(temp)
}

impl<M: Serialize + DeserializeOwned> RegistryBackend for LocalRegistry<M> {
    type Metadata = M;

    fn get(&self, id: &ArtifactId) -> Result<Option<VersionedArtifact<M>>> {
        let base = self.artifacts_root();
        if !base.is_dir() {
            return Ok(None);
        }
        for ns in std::fs::read_dir(&base)? {
            let ns = ns?.path();
            if !ns.is_dir() {
                continue;
            }
            for family in std::fs::read_dir(&ns)? {
                let family = family?.path();
                if !family.is_dir() {
                    continue;
                }
                let records: Vec<VersionedArtifact<M>> = read_records(&[family])?;
                if let Some(found) = records.into_iter().find(|a| &a.id == id) {
                    return Ok(Some(found));
                }
            }
        }
        Ok(None)
    }

    fn list(&self, filter: &ListFilter) -> Result<Vec<VersionedArtifact<M>>> {
        let dirs = matching_dirs(&self.artifacts_root(), filter)?;
        let records: Vec<VersionedArtifact<M>> = read_records(&dirs)?;
        Ok(records
            .into_iter()
            .filter(|a| filter.matches(&a.name))
            .collect())
    }

    fn create(&self, artifact: &VersionedArtifact<M>) -> Result<ArtifactId> {
        // Store under the derived id whatever the caller put in `artifact.id`.
        let id = ArtifactId::derive(&artifact.name, &artifact.version);
        let mut record = serde_json::to_value(artifact)?;
        record["id"] = serde_json::to_value(&id)?;

        let path = self.artifact_path(artifact);
        let temp = write_temp(&path, &serde_json::to_vec_pretty(&record)?)?;

        // hard_link refuses to replace an existing file, which gives the
        // create-if-absent semantics without exposing a half-written record.
        let linked = std::fs::hard_link(&temp, &path);
        if let Err(e) = std::fs::remove_file(&temp) {
            warn!(path = %temp.display(), error = %e, "failed to remove temporary file");
        }
        match linked {
            Ok(()) => {
                debug!(name = %artifact.name, version = %artifact.version, "stored release");
                Ok(id)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(RegistryError::Conflict {
                name: artifact.name.to_string(),
                version: artifact.version.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn get_tag(&self, key: &TagKey) -> Result<Option<Tag>> {
        match std::fs::read_to_string(self.tag_path(key)) {
            Ok(data) => Ok(Some(serde_json::from_str(&data)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list_tags(&self, filter: &ListFilter) -> Result<Vec<Tag>> {
        let dirs = matching_dirs(&self.tags_root(), filter)?;
        let tags: Vec<Tag> = read_records(&dirs)?;
        Ok(tags.into_iter().filter(|t| filter.matches(t.name())).collect())
    }

    fn save_tag(&self, tag: &Tag) -> Result<()> {
        let path = self.tag_path(&tag.key);
        let temp = write_temp(&path, &serde_json::to_vec_pretty(tag)?)?;
        std::fs::rename(&temp, &path)?;
        Ok(())
    }

    fn delete_tag(&self, key: &TagKey) -> Result<bool> {
        match std::fs::remove_file(self.tag_path(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
