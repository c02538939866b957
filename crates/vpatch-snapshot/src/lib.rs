//! Content snapshots for vpatch.
//!
//! Walks a built output tree, fingerprints every hot-updatable file, and
//! serializes the result as a flat, diffable `path|fingerprint` ledger.
//!
//! # Key Types
//!
//! - [`HashRecorder`] -- Walks a content root and produces a snapshot
//! - [`ContentSnapshot`] -- Ordered list of [`FileRecord`](vpatch_types::FileRecord)s
//! - [`ConflictWarning`] -- Two assets mapping to the same logical path
//!
//! Bundle files are fingerprinted from the hash recorded in their `.manifest`
//! sidecar instead of re-hashing their bytes; every other file is MD5-hashed.

pub mod conflict;
pub mod error;
pub mod manifest;
pub mod recorder;
pub mod snapshot;

pub use conflict::{check_conflicts, check_conflicts_in_file, ConflictWarning};
pub use error::{SnapshotError, SnapshotResult};
pub use manifest::{
    is_sidecar, parse_bundle_hash, read_bundle_hash, sidecar_path, MANIFEST_EXTENSION,
    META_EXTENSION,
};
pub use recorder::HashRecorder;
pub use snapshot::ContentSnapshot;
