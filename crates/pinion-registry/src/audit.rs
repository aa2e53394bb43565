//! Release history auditing.
//!
//! Checks one artifact family against the registry's invariants: every
//! release line counts patches 0, 1, 2, ... without gaps, and every tag
//! points at a release that still exists. Deletions happen outside the
//! resolver, so both can drift.

use std::collections::{BTreeMap, BTreeSet};

use pinion_core::{ArtifactName, Tag, Version};

use crate::backend::{ListFilter, RegistryBackend};
use crate::error::Result;

/// All releases sharing one `(major, minor)` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseLine {
    pub major: u64,
    pub minor: u64,
    /// Existing patch numbers, ascending.
    pub patches: Vec<u64>,
}

impl ReleaseLine {
    /// The newest release on this line.
    pub fn latest(&self) -> Option<Version> {
        self.patches
            .last()
            .map(|&patch| Version::new(self.major, self.minor, patch))
    }

    /// Patch numbers below the highest one that are absent.
    pub fn missing_patches(&self) -> Vec<u64> {
        let Some(&highest) = self.patches.last() else {
            return Vec::new();
        };
        let present: BTreeSet<u64> = self.patches.iter().copied().collect();
        (0..highest).filter(|p| !present.contains(p)).collect()
    }
}

/// An audit report for one family.
#[derive(Debug, Clone)]
pub struct HistoryReport {
    pub name: ArtifactName,
    /// Release lines, ascending.
    pub lines: Vec<ReleaseLine>,
    /// Tags of the family, sorted by label.
    pub tags: Vec<Tag>,
    /// Tags whose target release no longer exists.
    pub dangling_tags: Vec<Tag>,
    /// Human-readable findings.
    pub issues: Vec<String>,
}

impl HistoryReport {
    /// Whether the history satisfies every invariant.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Total number of releases across all lines.
    pub fn release_count(&self) -> usize {
        self.lines.iter().map(|l| l.patches.len()).sum()
    }
}

/// Audit the release history of a family.
pub fn audit<B: RegistryBackend + ?Sized>(
    backend: &B,
    name: &ArtifactName,
) -> Result<HistoryReport> {
    name.validate()?;
    let filter = ListFilter::family(name);
    let versions: BTreeSet<Version> = backend
        .list(&filter)?
        .into_iter()
        .map(|a| a.version)
        .collect();

    let mut grouped: BTreeMap<(u64, u64), Vec<u64>> = BTreeMap::new();
    for version in &versions {
        grouped
            .entry((version.major, version.minor))
            .or_default()
            .push(version.patch);
    }

    let mut issues = Vec::new();
    let lines: Vec<ReleaseLine> = grouped
        .into_iter()
        .map(|((major, minor), mut patches)| {
            patches.sort_unstable();
            ReleaseLine {
                major,
                minor,
                patches,
            }
        })
        .collect();

    for line in &lines {
        let missing = line.missing_patches();
        if !missing.is_empty() {
            let list: Vec<String> = missing.iter().map(u64::to_string).collect();
            issues.push(format!(
                "release line {}.{} is missing patches {}",
                line.major,
                line.minor,
                list.join(", ")
            ));
        }
    }

    let mut tags = backend.list_tags(&filter)?;
    tags.sort_by(|a, b| a.key.tag.cmp(&b.key.tag));

    let dangling_tags: Vec<Tag> = tags
        .iter()
        .filter(|t| !versions.contains(&t.version))
        .cloned()
        .collect();
    for tag in &dangling_tags {
        issues.push(format!(
            "tag '{}' points at missing version {}",
            tag.label(),
            tag.version
        ));
    }

    Ok(HistoryReport {
        name: name.clone(),
        lines,
        tags,
        dangling_tags,
        issues,
    })
}

/// Format a history report as a human-readable string.
///
/// ```text
/// foo (4 releases, 2 lines)
/// ├── 1.0  1.0.0 .. 1.0.2
/// └── 2.0  2.0.0
/// ```
pub fn format_report(report: &HistoryReport) -> String {
    let mut out = format!(
        "{} ({} releases, {} lines)\n",
        report.name,
        report.release_count(),
        report.lines.len()
    );

    let count = report.lines.len();
    for (i, line) in report.lines.iter().enumerate() {
        let connector = if i == count - 1 { "└── " } else { "├── " };
        let first = line.patches.first().copied().unwrap_or(0);
        let span = match line.latest() {
            Some(latest) if latest.patch != first => {
                format!("{}.{}.{first} .. {latest}", line.major, line.minor)
            }
            Some(latest) => latest.to_string(),
            None => String::new(),
        };
        out.push_str(&format!("{connector}{}.{}  {span}\n", line.major, line.minor));
    }

    if !report.tags.is_empty() {
        out.push_str("\ntags:\n");
        for tag in &report.tags {
            out.push_str(&format!("  {} -> {}\n", tag.label(), tag.version));
        }
    }

    for issue in &report.issues {
        out.push_str(&format!("  ! {issue}\n"));
    }

    out.push('\n');
    if report.is_clean() {
        out.push_str("History: CLEAN\n");
    } else {
        out.push_str("History: ISSUES FOUND\n");
    }

    out
}
