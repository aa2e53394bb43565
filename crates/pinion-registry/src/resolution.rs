//! Reference resolution.
//!
//! Turns `[namespace/]name@selector` plus an optional label into at most one
//! release:
//!
//! 1. parse the reference
//! 2. infer the namespace if it was left out
//! 3. follow a tag to its exact version (a missing tag ends resolution)
//! 4. list the family, keep versions matching the selector
//! 5. order newest first and take the first, or the first carrying `label`
//!
//! Resolution only reads from the backend.

use pinion_core::{compare, ArtifactName, Reference, Selector, VersionSelector, VersionedArtifact};
use tracing::debug;

use crate::backend::{ListFilter, RegistryBackend};
use crate::config::NamespacePolicy;
use crate::error::Result;
use crate::namespace::infer_namespace;
use crate::tags::resolve_tag;

/// Resolve a reference string.
pub fn resolve<B: RegistryBackend + ?Sized>(
    reference: &str,
    label: Option<&str>,
    backend: &B,
    policy: NamespacePolicy,
) -> Result<Option<VersionedArtifact<B::Metadata>>> {
    let reference = Reference::parse(reference)?;
    resolve_reference(&reference, label, backend, policy)
}

/// Resolve an already-parsed reference.
pub fn resolve_reference<B: RegistryBackend + ?Sized>(
    reference: &Reference,
    label: Option<&str>,
    backend: &B,
    policy: NamespacePolicy,
) -> Result<Option<VersionedArtifact<B::Metadata>>> {
    let name = if reference.omits_namespace() {
        let namespace = infer_namespace(backend, &reference.name.name, policy)?;
        reference.name.with_namespace(namespace)
    } else {
        reference.name.clone()
    };

    let selector = match &reference.selector {
        Selector::Version(selector) => *selector,
        Selector::Tag(tag) => match resolve_tag(backend, &name, tag)? {
            Some(version) => VersionSelector::exact(&version),
            None => {
                debug!(%name, tag = %tag, "tag not found");
                return Ok(None);
            }
        },
    };

    let candidates = matching_versions(backend.list(&ListFilter::family(&name))?, &selector);
    let selected = select(candidates, label);
    debug!(
        %name,
        %selector,
        label = ?label,
        selected = ?selected.as_ref().map(|a| a.version.to_string()),
        "resolved reference"
    );
    Ok(selected)
}

/// Keep artifacts matching `selector`, newest first.
pub fn matching_versions<M>(
    artifacts: Vec<VersionedArtifact<M>>,
    selector: &VersionSelector,
) -> Vec<VersionedArtifact<M>> {
    let mut matching: Vec<_> = artifacts
        .into_iter()
        .filter(|a| selector.matches(&a.version))
        .collect();
    sort_newest_first(&mut matching);
    matching
}

/// Order artifacts by descending version.
pub fn sort_newest_first<M>(artifacts: &mut [VersionedArtifact<M>]) {
    artifacts.sort_by(|a, b| compare(&b.version, &a.version));
}

/// Take the first artifact of a newest-first sequence, or the first that
/// carries `label`.
pub fn select<M>(
    sorted: Vec<VersionedArtifact<M>>,
    label: Option<&str>,
) -> Option<VersionedArtifact<M>> {
    match label {
        Some(label) => sorted.into_iter().find(|a| a.has_label(label)),
        None => sorted.into_iter().next(),
    }
}

/// Every release of a family, newest first.
pub fn list_versions<B: RegistryBackend + ?Sized>(
    backend: &B,
    name: &ArtifactName,
) -> Result<Vec<VersionedArtifact<B::Metadata>>> {
    name.validate()?;
    let mut artifacts = backend.list(&ListFilter::family(name))?;
    sort_newest_first(&mut artifacts);
    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Utc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use pinion_core::{ArtifactId, ReferenceError, Tag, TagKey, Version};

    use super::*;
    use crate::error::RegistryError;
    use crate::memory::MemoryRegistry;
    use crate::tags::set_tag;

    fn publish_version(
        registry: &MemoryRegistry<()>,
        name: &str,
        version: (u64, u64, u64),
        labels: &[&str],
    ) {
        let name: ArtifactName = match name.split_once('/') {
            Some((ns, n)) => ArtifactName::namespaced(ns, n).unwrap(),
            None => ArtifactName::bare(name).unwrap(),
        };
        registry
            .create(&VersionedArtifact::new(
                name,
                Version::new(version.0, version.1, version.2),
                labels.iter().map(|l| l.to_string()).collect::<BTreeSet<_>>(),
                (),
                Utc::now(),
            ))
            .unwrap();
    }

    fn resolved(
        registry: &MemoryRegistry<()>,
        reference: &str,
        label: Option<&str>,
    ) -> Option<Version> {
        resolve(reference, label, registry, NamespacePolicy::Reject)
            .unwrap()
            .map(|a| a.version)
    }

    #[test]
    fn partial_version_picks_highest_match() {
        let registry = MemoryRegistry::new();
        publish_version(&registry, "foo", (1, 0, 0), &[]);
        publish_version(&registry, "foo", (1, 2, 0), &[]);
        publish_version(&registry, "foo", (1, 10, 1), &[]);
        publish_version(&registry, "foo", (2, 0, 0), &[]);

        assert_eq!(resolved(&registry, "foo@1", None), Some(Version::new(1, 10, 1)));
        assert_eq!(resolved(&registry, "foo@1.2", None), Some(Version::new(1, 2, 0)));
        assert_eq!(resolved(&registry, "foo@2", None), Some(Version::new(2, 0, 0)));
    }

    #[test]
    fn major_prefix_does_not_match_longer_major() {
        let registry = MemoryRegistry::new();
        publish_version(&registry, "foo", (10, 0, 0), &[]);
        assert_eq!(resolved(&registry, "foo@1", None), None);
    }

    #[test]
    fn exact_version() {
        let registry = MemoryRegistry::new();
        publish_version(&registry, "foo", (1, 0, 0), &[]);
        publish_version(&registry, "foo", (1, 0, 1), &[]);
        assert_eq!(resolved(&registry, "foo@1.0.0", None), Some(Version::new(1, 0, 0)));
        assert_eq!(resolved(&registry, "foo@1.0.2", None), None);
    }

    #[test]
    fn tag_wins_over_newer_versions() {
        let registry = MemoryRegistry::new();
        publish_version(&registry, "foo", (1, 0, 1), &[]);
        publish_version(&registry, "foo", (1, 0, 2), &[]);
        let foo = ArtifactName::bare("foo").unwrap();
        set_tag(&registry, &foo, "stable", &Version::new(1, 0, 1)).unwrap();

        assert_eq!(resolved(&registry, "foo@stable", None), Some(Version::new(1, 0, 1)));
    }

    #[test]
    fn missing_tag_has_no_fallback() {
        let registry = MemoryRegistry::new();
        publish_version(&registry, "foo", (1, 0, 0), &[]);
        assert_eq!(resolved(&registry, "foo@latest", None), None);
    }

    #[test]
    fn label_skips_unlabeled_releases() {
        let registry = MemoryRegistry::new();
        publish_version(&registry, "foo", (1, 0, 0), &[]);
        publish_version(&registry, "foo", (1, 0, 1), &[]);
        publish_version(&registry, "foo", (1, 0, 2), &["beta"]);
        publish_version(&registry, "foo", (1, 1, 0), &[]);

        assert_eq!(resolved(&registry, "foo@1.0", Some("beta")), Some(Version::new(1, 0, 2)));
        assert_eq!(resolved(&registry, "foo@1.0", Some("gamma")), None);
    }

    #[test]
    fn label_picks_newest_labeled() {
        let registry = MemoryRegistry::new();
        publish_version(&registry, "foo", (1, 0, 0), &["beta"]);
        publish_version(&registry, "foo", (1, 0, 1), &["beta"]);
        publish_version(&registry, "foo", (1, 0, 2), &[]);
        assert_eq!(resolved(&registry, "foo@1", Some("beta")), Some(Version::new(1, 0, 1)));
    }

    #[test]
    fn label_applies_after_tag() {
        let registry = MemoryRegistry::new();
        publish_version(&registry, "foo", (1, 0, 0), &[]);
        let foo = ArtifactName::bare("foo").unwrap();
        set_tag(&registry, &foo, "stable", &Version::new(1, 0, 0)).unwrap();
        assert_eq!(resolved(&registry, "foo@stable", Some("beta")), None);
    }

    #[test]
    fn bare_name_uses_inferred_namespace() {
        let registry = MemoryRegistry::new();
        publish_version(&registry, "chefdk/knife", (1, 2, 3), &[]);
        assert_eq!(resolved(&registry, "knife@1", None), Some(Version::new(1, 2, 3)));
        assert_eq!(
            resolved(&registry, "chefdk/knife@1.2", None),
            Some(Version::new(1, 2, 3))
        );
        assert_eq!(resolved(&registry, "other/knife@1", None), None);
    }

    #[test]
    fn bare_family_is_not_shadowed_by_namespaced_sibling() {
        let registry = MemoryRegistry::new();
        publish_version(&registry, "foo", (1, 0, 0), &[]);
        publish_version(&registry, "ns/foo", (5, 0, 0), &[]);

        let bare = ArtifactName::bare("foo").unwrap();
        let resolved_bare = resolve(
            &format!("{bare}@1"),
            None,
            &registry,
            NamespacePolicy::Reject,
        )
        .unwrap()
        .unwrap();
        assert_eq!(resolved_bare.name, bare);
        assert_eq!(resolved_bare.version, Version::new(1, 0, 0));
        assert_eq!(resolved(&registry, "foo@5", None), None);
        assert_eq!(resolved(&registry, "ns/foo@5", None), Some(Version::new(5, 0, 0)));
    }

    #[test]
    fn unknown_name_is_none() {
        let registry = MemoryRegistry::new();
        publish_version(&registry, "foo", (1, 0, 0), &[]);
        assert_eq!(resolved(&registry, "bar@1.0", None), None);
    }

    #[test]
    fn malformed_reference_is_an_error() {
        let registry: MemoryRegistry<()> = MemoryRegistry::new();
        let err = resolve("foo", None, &registry, NamespacePolicy::Reject).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Reference(ReferenceError::Malformed { .. })
        ));
    }

    #[test]
    fn list_versions_is_newest_first() {
        let registry = MemoryRegistry::new();
        publish_version(&registry, "foo", (1, 9, 0), &[]);
        publish_version(&registry, "foo", (1, 10, 0), &[]);
        publish_version(&registry, "foo", (0, 1, 0), &[]);
        let versions: Vec<_> = list_versions(&registry, &ArtifactName::bare("foo").unwrap())
            .unwrap()
            .into_iter()
            .map(|a| a.version)
            .collect();
        assert_eq!(
            versions,
            [Version::new(1, 10, 0), Version::new(1, 9, 0), Version::new(0, 1, 0)]
        );
    }

    #[test]
    fn list_versions_rejects_invalid_name() {
        let registry: MemoryRegistry<()> = MemoryRegistry::new();
        let name = ArtifactName {
            namespace: None,
            name: "..".into(),
        };
        let err = list_versions(&registry, &name).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Reference(ReferenceError::InvalidIdentifier { .. })
        ));
    }

    /// Backend whose every operation fails with a storage error.
    #[derive(Default)]
    struct FailingBackend {
        calls: AtomicU32,
    }

    impl FailingBackend {
        fn fail<T>(&self) -> Result<T> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(RegistryError::Storage {
                detail: "disk unavailable".to_string(),
            })
        }
    }

    impl RegistryBackend for FailingBackend {
        type Metadata = ();

        fn get(&self, _: &ArtifactId) -> Result<Option<VersionedArtifact<()>>> {
            self.fail()
        }

        fn list(&self, _: &ListFilter) -> Result<Vec<VersionedArtifact<()>>> {
            self.fail()
        }

        fn create(&self, _: &VersionedArtifact<()>) -> Result<ArtifactId> {
            self.fail()
        }

        fn get_tag(&self, _: &TagKey) -> Result<Option<Tag>> {
            self.fail()
        }

        fn list_tags(&self, _: &ListFilter) -> Result<Vec<Tag>> {
            self.fail()
        }

        fn save_tag(&self, _: &Tag) -> Result<()> {
            self.fail()
        }

        fn delete_tag(&self, _: &TagKey) -> Result<bool> {
            self.fail()
        }
    }

    #[test]
    fn storage_failure_propagates() {
        let backend = FailingBackend::default();
        for reference in ["foo@1", "ns/foo@1", "ns/foo@stable"] {
            let err = resolve(reference, None, &backend, NamespacePolicy::Reject).unwrap_err();
            assert!(matches!(err, RegistryError::Storage { .. }), "{reference}: {err}");
        }
        assert!(!RegistryError::Storage {
            detail: String::new()
        }
        .is_retryable());
    }
}
