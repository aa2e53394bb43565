//! Publishing new releases.
//!
//! The publisher names a release line; the registry allocates the patch.
//! Allocation reads a snapshot of the family and the create is a separate
//! write, so two publishers racing on one line can pick the same version.
//! The backend refuses the second create with a conflict and the publish
//! is retried from a fresh snapshot, up to `max_attempts` times.

use std::collections::BTreeSet;

use chrono::Utc;
use pinion_core::{ArtifactName, VersionSelector, VersionedArtifact};
use tracing::{debug, info, warn};

use crate::allocator::{allocate_next, parse_proposed};
use crate::backend::{ListFilter, RegistryBackend};
use crate::error::{RegistryError, Result};

/// A release to publish.
#[derive(Debug, Clone)]
pub struct PublishRequest<M> {
    pub name: ArtifactName,
    /// `major` or `major.minor`; a patch component is ignored.
    pub version: String,
    pub labels: BTreeSet<String>,
    pub metadata: M,
}

impl<M> PublishRequest<M> {
    pub fn new(name: ArtifactName, version: impl Into<String>, metadata: M) -> Self {
        PublishRequest {
            name,
            version: version.into(),
            labels: BTreeSet::new(),
            metadata,
        }
    }

    /// Attach a selection label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.insert(label.into());
        self
    }
}

/// Options for the publish operation.
#[derive(Debug, Clone)]
pub struct PublishOptions {
    /// Allocate and build the release but don't store it.
    pub dry_run: bool,
    /// Total attempts when the backend reports a conflict.
    pub max_attempts: u32,
}

impl Default for PublishOptions {
    fn default() -> Self {
        PublishOptions {
            dry_run: false,
            max_attempts: 1,
        }
    }
}

/// Validate a request before anything is read or written.
pub fn validate_request<M>(request: &PublishRequest<M>) -> Result<VersionSelector> {
    request.name.validate()?;
    let selector = parse_proposed(&request.version)?;

    if let Some(label) = request.labels.iter().find(|l| l.trim().is_empty()) {
        return Err(RegistryError::InvalidLabel {
            name: request.name.to_string(),
            label: label.clone(),
        });
    }

    if selector.patch.is_some() {
        debug!(name = %request.name, requested = %selector, "ignoring requested patch");
    }
    Ok(selector)
}

/// Publish a release, allocating its version.
pub fn publish<B>(
    request: &PublishRequest<B::Metadata>,
    backend: &B,
    options: &PublishOptions,
) -> Result<VersionedArtifact<B::Metadata>>
where
    B: RegistryBackend + ?Sized,
    B::Metadata: Clone,
{
    let selector = validate_request(request)?;
    let max_attempts = options.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let existing = backend.list(&ListFilter::family(&request.name))?;
        let version = allocate_next(existing.iter().map(|a| &a.version), &selector)?;
        let artifact = VersionedArtifact::new(
            request.name.clone(),
            version,
            request.labels.clone(),
            request.metadata.clone(),
            Utc::now(),
        );

        if options.dry_run {
            debug!(reference = %artifact.reference(), "dry run, not stored");
            return Ok(artifact);
        }

        match backend.create(&artifact) {
            Ok(_) => {
                info!(reference = %artifact.reference(), id = %artifact.id, "published");
                return Ok(artifact);
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                warn!(
                    reference = %artifact.reference(),
                    attempt,
                    max_attempts,
                    "version taken by a concurrent publish, retrying"
                );
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
