//! Tag lookup and maintenance.
//!
//! A tag is an exact-key pointer; there is no fallback search when one is
//! missing.

use chrono::Utc;
use pinion_core::{is_version, ArtifactName, Tag, TagKey, Version};
use tracing::{debug, info};

use crate::backend::{ListFilter, RegistryBackend};
use crate::error::{RegistryError, Result};

/// Resolve `name@tag` to the version it points at.
pub fn resolve_tag<B: RegistryBackend + ?Sized>(
    backend: &B,
    name: &ArtifactName,
    tag: &str,
) -> Result<Option<Version>> {
    name.validate()?;
    let key = TagKey::new(name.clone(), tag);
    let found = backend.get_tag(&key)?.map(|t| t.version);
    debug!(tag = %key, target = ?found.as_ref().map(|v| v.to_string()), "tag lookup");
    Ok(found)
}

/// Check that a label can be selected by a reference.
pub fn validate_tag_label(tag: &str) -> Result<()> {
    let invalid = |detail: &str| RegistryError::InvalidTag {
        tag: tag.to_string(),
        detail: detail.to_string(),
    };
    if tag.is_empty() {
        return Err(invalid("tag labels must not be empty"));
    }
    if tag.chars().any(char::is_whitespace) {
        return Err(invalid("tag labels must not contain whitespace"));
    }
    if is_version(tag) {
        return Err(invalid("tag labels must not look like versions"));
    }
    Ok(())
}

/// Point `name@tag` at `version`, replacing any previous target.
///
/// The target release must already exist.
pub fn set_tag<B: RegistryBackend + ?Sized>(
    backend: &B,
    name: &ArtifactName,
    tag: &str,
    version: &Version,
) -> Result<Tag> {
    name.validate()?;
    validate_tag_label(tag)?;

    let exists = backend
        .list(&ListFilter::family(name))?
        .iter()
        .any(|a| &a.version == version);
    if !exists {
        return Err(RegistryError::TagTargetMissing {
            name: name.to_string(),
            tag: tag.to_string(),
            version: version.to_string(),
        });
    }

    let record = Tag::new(TagKey::new(name.clone(), tag), version.clone(), Utc::now());
    backend.save_tag(&record)?;
    info!(tag = %record.key, %version, "tag updated");
    Ok(record)
}

/// Remove `name@tag`. Returns whether it existed.
pub fn remove_tag<B: RegistryBackend + ?Sized>(
    backend: &B,
    name: &ArtifactName,
    tag: &str,
) -> Result<bool> {
    name.validate()?;
    let removed = backend.delete_tag(&TagKey::new(name.clone(), tag))?;
    if removed {
        info!(%name, tag, "tag removed");
    }
    Ok(removed)
}

/// All tags of one family, sorted by label.
pub fn list_tags<B: RegistryBackend + ?Sized>(
    backend: &B,
    name: &ArtifactName,
) -> Result<Vec<Tag>> {
    name.validate()?;
    let mut tags = backend.list_tags(&ListFilter::family(name))?;
    tags.sort_by(|a, b| a.key.tag.cmp(&b.key.tag));
    Ok(tags)
}
