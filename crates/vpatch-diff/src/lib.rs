//! Diff engine for vpatch.
//!
//! Compares two content snapshots and produces the records that were added
//! or changed. Comparison is pure set membership on whole `path|fingerprint`
//! lines: a changed fingerprint yields a new line, an unchanged one does not.
//!
//! # Key Types
//!
//! - [`diff_lines`] -- Raw line-level diff
//! - [`SnapshotDiff`] / [`diff_snapshots`] -- Typed diff over [`ContentSnapshot`](vpatch_snapshot::ContentSnapshot)s

pub mod snapshot_diff;

pub use snapshot_diff::{diff_lines, diff_snapshots, SnapshotDiff};
