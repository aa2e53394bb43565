//! Core data model for the Pinion artifact registry.
//!
//! Pinion stores versioned build templates and command aliases. This crate
//! holds everything that does not touch storage:
//!
//! - **Names**: `[namespace/]name` families with identifier validation
//! - **Versions**: the `major[.minor[.patch]]` grammar, numeric ordering,
//!   and component-wise prefix matching
//! - **References**: `[namespace/]name@selector` parsing, where the
//!   selector is a version prefix or a tag label
//! - **Artifacts and tags**: immutable releases and the mutable aliases
//!   pointing at them

pub mod artifact;
pub mod error;
pub mod metadata;
pub mod name;
pub mod reference;
pub mod version;

pub use artifact::{ArtifactId, Tag, TagKey, VersionedArtifact};
pub use error::{ReferenceError, Result};
pub use metadata::{CommandFormat, CommandMetadata, TemplateMetadata};
pub use name::{is_identifier, ArtifactName};
pub use reference::{Reference, Selector};
pub use version::{compare, is_version, parse_version, Version, VersionSelector};
