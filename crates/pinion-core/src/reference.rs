//! Reference parsing.
//!
//! A reference names one artifact family and selects releases from it:
//!
//! ```text
//! reference := [namespace "/"] name "@" selector
//! selector  := version-prefix | tag-label
//! ```
//!
//! `chefdk/knife@1.2`, `nodejs@stable` and `foo@1.0.3` are all references.

use std::fmt;
use std::str::FromStr;

use crate::error::{ReferenceError, Result};
use crate::name::ArtifactName;
use crate::version::VersionSelector;

/// What the part after `@` asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// A partial or full version prefix.
    Version(VersionSelector),
    /// A mutable tag such as `stable` or `latest`.
    Tag(String),
}

impl Selector {
    /// Classify a raw selector token. Anything outside the version grammar
    /// is a tag label.
    pub fn classify(raw: &str) -> Self {
        match VersionSelector::parse(raw) {
            Some(version) => Selector::Version(version),
            None => Selector::Tag(raw.to_string()),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Version(version) => write!(f, "{version}"),
            Selector::Tag(tag) => write!(f, "{tag}"),
        }
    }
}

/// A parsed reference. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub name: ArtifactName,
    pub selector: Selector,
}

impl Reference {
    /// Parse a reference string.
    pub fn parse(input: &str) -> Result<Self> {
        let malformed = |detail: &str| ReferenceError::Malformed {
            input: input.to_string(),
            detail: detail.to_string(),
        };

        let (path, selector) = input
            .split_once('@')
            .ok_or_else(|| malformed("expected 'name@selector'"))?;

        if selector.is_empty() {
            return Err(malformed("empty selector after '@'"));
        }
        if selector.chars().any(char::is_whitespace) {
            return Err(malformed("selector contains whitespace"));
        }

        let (namespace, name) = match path.split_once('/') {
            Some((namespace, name)) => (Some(namespace), name),
            None => (None, path),
        };
        if name.is_empty() {
            return Err(malformed("missing name before '@'"));
        }

        Ok(Reference {
            name: ArtifactName::new(namespace, name)?,
            selector: Selector::classify(selector),
        })
    }

    /// Whether the reference left the namespace out.
    pub fn omits_namespace(&self) -> bool {
        self.name.namespace.is_none()
    }
}

impl FromStr for Reference {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self> {
        Reference::parse(s)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.selector)
    }
}
