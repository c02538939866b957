//! Build orchestration for vpatch.
//!
//! [`PatchBuilder`] runs one build of a target version through
//! validate → snapshot → package → persist, writing everything into the
//! versioned output tree described by [`BuildLayout`]. The shared `Diff/`
//! directory and last-version marker are only replaced once everything else
//! is written, and a failed build is rolled back so that no partial state
//! stays on disk.
//!
//! # Key Types
//!
//! - [`BuildConfig`] -- Output root, content root, raw records (`vpatch.toml`)
//! - [`BuildLayout`] -- Paths of a target's versioned output tree
//! - [`PatchBuilder`] / [`BuildReport`] / [`BuildState`] -- The build pipeline
//! - [`BuildError`] / [`ErrorKind`] -- Failures, classified as validation or I/O

pub mod builder;
pub mod config;
pub mod error;
pub mod layout;
mod publish;
pub mod version_file;

pub use builder::{BuildReport, BuildState, PatchBuilder};
pub use config::{BuildConfig, CONFIG_FILE_NAME};
pub use error::{BuildError, BuildResult, ErrorKind};
pub use layout::BuildLayout;
pub use version_file::{read_last_version, stage_last_version, write_last_version, PendingVersion};

pub use vpatch_ledger::{PatchEntry, ReleaseLine, VersionLedger};
pub use vpatch_types::{BuildTarget, VersionIdentifier, VersionPromotion};
