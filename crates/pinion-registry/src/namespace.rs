//! Namespace inference for bare names.
//!
//! `knife@stable` is accepted as shorthand for `chefdk/knife@stable` when
//! `chefdk` is the only namespace holding a `knife`. The registry is searched
//! for both releases and tags with the bare name. An un-namespaced `knife`
//! always takes precedence over namespaced ones.

use std::collections::BTreeSet;

use tracing::debug;

use crate::backend::{ListFilter, RegistryBackend};
use crate::config::NamespacePolicy;
use crate::error::{RegistryError, Result};

/// Namespaces (with `None` for un-namespaced records) holding `name`.
///
/// `None` sorts first.
pub fn candidate_namespaces<B: RegistryBackend + ?Sized>(
    backend: &B,
    name: &str,
) -> Result<BTreeSet<Option<String>>> {
    let filter = ListFilter::any_namespace(name);
    let mut candidates: BTreeSet<Option<String>> = backend
        .list(&filter)?
        .into_iter()
        .map(|a| a.name.namespace)
        .collect();
    candidates.extend(
        backend
            .list_tags(&filter)?
            .into_iter()
            .map(|t| t.key.name.namespace),
    );
    Ok(candidates)
}

/// Infer the namespace a bare `name` refers to.
///
/// Returns `None` when nothing matches or when the un-namespaced family
/// itself holds records; a bare reference always reaches the bare family
/// first. Otherwise several namespaced candidates are handled per `policy`.
pub fn infer_namespace<B: RegistryBackend + ?Sized>(
    backend: &B,
    name: &str,
    policy: NamespacePolicy,
) -> Result<Option<String>> {
    let candidates = candidate_namespaces(backend, name)?;
    if candidates.contains(&None) {
        debug!(name, "bare family exists, no namespace inferred");
        return Ok(None);
    }

    let namespaced: Vec<String> = candidates.into_iter().flatten().collect();
    if namespaced.len() > 1 && policy == NamespacePolicy::Reject {
        return Err(RegistryError::AmbiguousNamespace {
            name: name.to_string(),
            candidates: namespaced,
        });
    }

    let inferred = namespaced.into_iter().next();
    debug!(name, namespace = ?inferred, "inferred namespace");
    Ok(inferred)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet as Set;

    use chrono::Utc;
    use pinion_core::{ArtifactName, Tag, TagKey, Version, VersionedArtifact};

    use super::*;
    use crate::memory::MemoryRegistry;

    fn seed(registry: &MemoryRegistry<()>, ns: Option<&str>, name: &str) {
        registry
            .create(&VersionedArtifact::new(
                ArtifactName::new(ns, name).unwrap(),
                Version::new(1, 0, 0),
                Set::new(),
                (),
                Utc::now(),
            ))
            .unwrap();
    }

    #[test]
    fn nothing_found_means_no_namespace() {
        let registry: MemoryRegistry<()> = MemoryRegistry::new();
        assert_eq!(
            infer_namespace(&registry, "foo", NamespacePolicy::Reject).unwrap(),
            None
        );
    }

    #[test]
    fn single_namespace_is_adopted() {
        let registry = MemoryRegistry::new();
        seed(&registry, Some("chefdk"), "knife");
        seed(&registry, Some("other"), "spoon");
        assert_eq!(
            infer_namespace(&registry, "knife", NamespacePolicy::Reject).unwrap(),
            Some("chefdk".to_string())
        );
    }

    #[test]
    fn tags_count_as_evidence() {
        let registry: MemoryRegistry<()> = MemoryRegistry::new();
        registry
            .save_tag(&Tag::new(
                TagKey::new(ArtifactName::namespaced("tools", "fmt").unwrap(), "stable"),
                Version::new(1, 0, 0),
                Utc::now(),
            ))
            .unwrap();
        assert_eq!(
            infer_namespace(&registry, "fmt", NamespacePolicy::Reject).unwrap(),
            Some("tools".to_string())
        );
    }

    #[test]
    fn un_namespaced_only_stays_bare() {
        let registry = MemoryRegistry::new();
        seed(&registry, None, "foo");
        assert_eq!(
            infer_namespace(&registry, "foo", NamespacePolicy::Reject).unwrap(),
            None
        );
    }

    #[test]
    fn bare_family_wins_over_namespaced_siblings() {
        let registry = MemoryRegistry::new();
        seed(&registry, None, "foo");
        seed(&registry, Some("ns"), "foo");
        seed(&registry, Some("other"), "foo");
        assert_eq!(
            infer_namespace(&registry, "foo", NamespacePolicy::Reject).unwrap(),
            None
        );
    }

    #[test]
    fn bare_tag_alone_pins_bare_family() {
        let registry: MemoryRegistry<()> = MemoryRegistry::new();
        seed(&registry, Some("ns"), "foo");
        registry
            .save_tag(&Tag::new(
                TagKey::new(ArtifactName::bare("foo").unwrap(), "stable"),
                Version::new(1, 0, 0),
                Utc::now(),
            ))
            .unwrap();
        assert_eq!(
            infer_namespace(&registry, "foo", NamespacePolicy::Reject).unwrap(),
            None
        );
    }

    #[test]
    fn several_namespaces_are_rejected() {
        let registry = MemoryRegistry::new();
        seed(&registry, Some("b"), "knife");
        seed(&registry, Some("a"), "knife");
        let err = infer_namespace(&registry, "knife", NamespacePolicy::Reject).unwrap_err();
        match err {
            RegistryError::AmbiguousNamespace { candidates, .. } => {
                assert_eq!(candidates, ["a", "b"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn first_match_is_deterministic() {
        let registry = MemoryRegistry::new();
        seed(&registry, Some("b"), "knife");
        seed(&registry, Some("a"), "knife");
        assert_eq!(
            infer_namespace(&registry, "knife", NamespacePolicy::FirstMatch).unwrap(),
            Some("a".to_string())
        );

        seed(&registry, None, "knife");
        assert_eq!(
            infer_namespace(&registry, "knife", NamespacePolicy::FirstMatch).unwrap(),
            None
        );
    }
}
