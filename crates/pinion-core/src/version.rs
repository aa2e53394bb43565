//! Version grammar and ordering.
//!
//! Stored artifacts always carry a full `major.minor.patch` version. Callers
//! may ask for a partial one (`1`, `1.2`), which selects every version whose
//! leading components are equal. Matching is component-wise, so `1` never
//! selects `10.0.0`.

use std::cmp::Ordering;
use std::fmt;

/// A full release version. Pre-release and build metadata are never set.
pub type Version = semver::Version;

/// A partial or full version used to select releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionSelector {
    pub major: u64,
    pub minor: Option<u64>,
    pub patch: Option<u64>,
}

impl VersionSelector {
    /// Parse `major`, `major.minor` or `major.minor.patch`.
    ///
    /// Returns `None` when the token is not in the version grammar, in which
    /// case callers treat it as a tag label.
    pub fn parse(token: &str) -> Option<Self> {
        let mut parts = token.split('.');
        let major = component(parts.next()?)?;
        let minor = match parts.next() {
            Some(part) => Some(component(part)?),
            None => None,
        };
        let patch = match parts.next() {
            Some(part) => Some(component(part)?),
            None => None,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(VersionSelector {
            major,
            minor,
            patch,
        })
    }

    /// A selector matching exactly one version.
    pub fn exact(version: &Version) -> Self {
        VersionSelector {
            major: version.major,
            minor: Some(version.minor),
            patch: Some(version.patch),
        }
    }

    /// Whether all three components are given.
    pub fn is_exact(&self) -> bool {
        self.minor.is_some() && self.patch.is_some()
    }

    /// Component-wise prefix match.
    pub fn matches(&self, version: &Version) -> bool {
        self.major == version.major
            && self.minor.map_or(true, |minor| minor == version.minor)
            && self.patch.map_or(true, |patch| patch == version.patch)
    }

    /// The `(major, minor)` release line this selector names; minor defaults to 0.
    pub fn release_line(&self) -> (u64, u64) {
        (self.major, self.minor.unwrap_or(0))
    }

    /// The full version, if this selector is exact.
    pub fn to_version(&self) -> Option<Version> {
        match (self.minor, self.patch) {
            (Some(minor), Some(patch)) => Some(Version::new(self.major, minor, patch)),
            _ => None,
        }
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major)?;
        if let Some(minor) = self.minor {
            write!(f, ".{minor}")?;
            if let Some(patch) = self.patch {
                write!(f, ".{patch}")?;
            }
        }
        Ok(())
    }
}

fn component(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Whether a token is in the version grammar.
pub fn is_version(token: &str) -> bool {
    VersionSelector::parse(token).is_some()
}

/// Numeric ordering over `(major, minor, patch)`.
pub fn compare(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch).cmp(&(b.major, b.minor, b.patch))
}

/// Parse a full version string like "1.2.3".
pub fn parse_version(s: &str) -> Option<Version> {
    VersionSelector::parse(s)?.to_version()
}

/// The `(major, minor)` release line of a version.
pub fn release_line(version: &Version) -> (u64, u64) {
    (version.major, version.minor)
}
