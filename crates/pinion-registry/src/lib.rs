//! Versioned template and command registry.
//!
//! Resolves references like `chefdk/knife@1.2`, `nodejs@stable` or
//! `foo@1.0` (optionally filtered by label) to one published release, and
//! allocates versions when new releases are published.
//!
//! # Architecture
//!
//! - **Backend**: the storage contract ([`RegistryBackend`]) with an
//!   in-memory and a local filesystem implementation
//! - **Allocator**: picks the next patch on a `(major, minor)` line
//! - **Tags**: exact-key aliases to versions
//! - **Namespace inference**: fills in the namespace of a bare name
//! - **Resolution / publishing**: the pipelines composing the above
//! - **Audit**: checks a family's history against the invariants
//!
//! [`Registry`] wires a backend to a [`RegistryConfig`].

pub mod allocator;
pub mod audit;
pub mod backend;
pub mod config;
pub mod error;
pub mod local;
pub mod memory;
pub mod namespace;
pub mod publish;
pub mod registry;
pub mod resolution;
pub mod tags;

// Re-exports for convenience.
pub use allocator::allocate_next;
pub use audit::{audit, format_report, HistoryReport, ReleaseLine};
pub use backend::{ListFilter, NamespaceFilter, RegistryBackend};
pub use config::{NamespacePolicy, RegistryConfig};
pub use error::{RegistryError, Result};
pub use local::LocalRegistry;
pub use memory::MemoryRegistry;
pub use namespace::infer_namespace;
pub use publish::{publish, PublishOptions, PublishRequest};
pub use registry::Registry;
pub use resolution::{resolve, resolve_reference};
pub use tags::{resolve_tag, set_tag};
