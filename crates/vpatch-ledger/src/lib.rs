//! Version ledger for vpatch.
//!
//! The ledger is the document shipped next to every build (`PatchInfo.json`)
//! telling clients which patches exist for each release line. This crate
//! provides:
//! - `PatchEntry` / `ReleaseLine` records with their JSON field names
//! - `VersionLedger` load/save with whole-file replacement
//! - Revision validation (no overwrites, no gaps) and trim-then-append updates
//! - Density checking of a release line's patch sequence

pub mod entry;
pub mod error;
pub mod ledger;
pub mod validation;

pub use entry::{PatchEntry, ReleaseLine};
pub use error::{LedgerError, LedgerResult};
pub use ledger::{VersionLedger, LEDGER_FILE_NAME};
pub use validation::{check_dense, check_ledger, DensityReport, Violation, ViolationKind};
