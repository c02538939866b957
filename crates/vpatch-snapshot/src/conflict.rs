//! Logical-path conflict detection over the raw-file ledger.
//!
//! The asset-tagging layer writes one line per asset packed into a bundle:
//! `pathWithoutExtension|extension|flag|bundleName`. Assets are loaded by
//! their extension-less path, so two assets that differ only by extension
//! shadow each other at runtime.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::error::{SnapshotError, SnapshotResult};

/// Two assets map to the same logical path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConflictWarning {
    /// The shared extension-less path.
    pub logical_path: String,
    /// Extension and bundle of the first asset seen.
    pub first: (String, String),
    /// Extension and bundle of the conflicting asset.
    pub second: (String, String),
}

impl fmt::Display for ConflictWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is provided as {}{} (bundle {}) and {}{} (bundle {})",
            self.logical_path,
            self.logical_path,
            self.first.0,
            self.first.1,
            self.logical_path,
            self.second.0,
            self.second.1,
        )
    }
}

/// Scan raw-file ledger text for logical-path conflicts.
///
/// Every conflict is also logged as a warning. Conflicts are a data-quality
/// problem for the asset-tagging layer and never abort a build. Lines with
/// fewer than two fields are ignored.
pub fn check_conflicts(raw_records: &str) -> Vec<ConflictWarning> {
    let mut seen: HashMap<&str, (&str, &str)> = HashMap::new();
    let mut warnings = Vec::new();

    for line in raw_records.lines() {
        let mut fields = line.trim_end_matches('\r').split('|');
        let (Some(path), Some(ext)) = (fields.next(), fields.next()) else {
            continue;
        };
        let bundle = fields.nth(1).unwrap_or_default();

        match seen.get(path) {
            Some(&(first_ext, first_bundle)) if first_ext != ext => {
                let warning = ConflictWarning {
                    logical_path: path.to_string(),
                    first: (first_ext.to_string(), first_bundle.to_string()),
                    second: (ext.to_string(), bundle.to_string()),
                };
                tracing::warn!(%warning, "asset path conflict");
                warnings.push(warning);
            }
            Some(_) => {}
            None => {
                seen.insert(path, (ext, bundle));
            }
        }
    }

    warnings
}

/// Read a raw-file ledger and scan it for conflicts.
pub fn check_conflicts_in_file(path: &Path) -> SnapshotResult<Vec<ConflictWarning>> {
    let text = std::fs::read_to_string(path).map_err(|e| SnapshotError::io(path, e))?;
    Ok(check_conflicts(&text))
}
