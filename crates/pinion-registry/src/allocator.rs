//! Version allocation for new releases.
//!
//! Publishers name a release line (`1` or `1.2`); the allocator owns the
//! patch number. Each `(major, minor)` line counts up from 0 on its own.

use pinion_core::version::release_line;
use pinion_core::{Version, VersionSelector};

use crate::error::{RegistryError, Result};

/// Parse a publish selector, which must be in the version grammar.
pub fn parse_proposed(selector: &str) -> Result<VersionSelector> {
    VersionSelector::parse(selector).ok_or_else(|| RegistryError::InvalidVersion {
        selector: selector.to_string(),
    })
}

/// Compute the next version on the line named by `proposed`.
///
/// A patch component in `proposed` is ignored. The result is
/// `(major, minor, 0)` for an empty line and one past the highest existing
/// patch otherwise. Fails with [`RegistryError::LineExhausted`] when the
/// highest patch is `u64::MAX`.
pub fn allocate_next<'a, I>(existing: I, proposed: &VersionSelector) -> Result<Version>
where
    I: IntoIterator<Item = &'a Version>,
{
    let (major, minor) = proposed.release_line();
    let highest = existing
        .into_iter()
        .filter(|v| release_line(v) == (major, minor))
        .map(|v| v.patch)
        .max();
    let patch = match highest {
        None => 0,
        Some(highest) => highest
            .checked_add(1)
            .ok_or_else(|| RegistryError::LineExhausted {
                line: format!("{major}.{minor}"),
            })?,
    };
    Ok(Version::new(major, minor, patch))
}
