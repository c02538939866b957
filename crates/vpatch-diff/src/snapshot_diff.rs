//! Snapshot-level diff: lines of the current snapshot absent from the previous.
//!
//! Removals are not reported. A file moved to a new path shows up as an
//! addition at the new path and its old path silently disappears; the patch
//! model is append-only.

use std::collections::HashSet;

use vpatch_snapshot::ContentSnapshot;
use vpatch_types::FileRecord;

/// Records of the current snapshot that are new or changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    /// Added or changed records, in the current snapshot's order.
    pub changed: Vec<FileRecord>,
}

impl SnapshotDiff {
    /// Create an empty diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    /// Number of changed records.
    pub fn len(&self) -> usize {
        self.changed.len()
    }

    /// The changed records as `path|fingerprint` lines.
    pub fn lines(&self) -> Vec<String> {
        self.changed.iter().map(FileRecord::to_line).collect()
    }

    /// Relative paths of the changed records.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.changed.iter().map(|r| r.relative_path.as_str())
    }
}

/// Every line of `current` not present anywhere in `previous`, in `current`'s
/// order.
///
/// Duplicate lines in `current` are kept as they occur.
pub fn diff_lines<P, C>(previous: &[P], current: &[C]) -> Vec<String>
where
    P: AsRef<str>,
    C: AsRef<str>,
{
    let known: HashSet<&str> = previous.iter().map(AsRef::as_ref).collect();
    current
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| !known.contains(line))
        .map(str::to_string)
        .collect()
}

/// Compute the added-or-changed records between two snapshots.
///
/// An empty result is valid and logged as a warning: the build succeeds with
/// an empty patch.
pub fn diff_snapshots(previous: &ContentSnapshot, current: &ContentSnapshot) -> SnapshotDiff {
    let known: HashSet<&FileRecord> = previous.records().iter().collect();
    let changed: Vec<FileRecord> = current
        .records()
        .iter()
        .filter(|record| !known.contains(record))
        .cloned()
        .collect();

    if changed.is_empty() {
        tracing::warn!(
            previous = previous.len(),
            current = current.len(),
            "snapshots are identical, patch will be empty"
        );
    } else {
        tracing::debug!(changed = changed.len(), "snapshot diff computed");
    }

    SnapshotDiff { changed }
}
