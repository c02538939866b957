use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use vpatch_crypto::ContentHasher;
use vpatch_types::VersionIdentifier;

use crate::entry::{PatchEntry, ReleaseLine};
use crate::error::{LedgerError, LedgerResult};

/// File name of the ledger document inside a build's `Snapshot/` directory.
pub const LEDGER_FILE_NAME: &str = "PatchInfo.json";

/// The version ledger document.
///
/// Release lines are kept newest first. Serialized as
/// `{"versionUpdateItems": [{"version": "M.N.R", "patches": [...]}]}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionLedger {
    #[serde(rename = "versionUpdateItems", default)]
    lines: Vec<ReleaseLine>,
}

impl VersionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lines(lines: Vec<ReleaseLine>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[ReleaseLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Load a ledger document.
    ///
    /// A missing file is an empty ledger. So is a malformed one, with a
    /// warning: a ledger that cannot be read must not block the next build
    /// of a fresh release line.
    pub fn load(path: &Path) -> LedgerResult<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no ledger document, starting empty");
                return Ok(Self::new());
            }
            Err(e) => return Err(LedgerError::io(path, e)),
        };

        match Self::from_json(&text) {
            Ok(ledger) => {
                tracing::debug!(path = %path.display(), lines = ledger.lines.len(), "ledger loaded");
                Ok(ledger)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "malformed ledger document, starting empty");
                Ok(Self::new())
            }
        }
    }

    /// Write the ledger, replacing any previous document in one rename.
    pub fn save(&self, path: &Path) -> LedgerResult<()> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| LedgerError::io(dir, e))?;

        let json = self.to_json()?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| LedgerError::io(dir, e))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| LedgerError::io(tmp.path(), e))?;
        tmp.persist(path)
            .map_err(|e| LedgerError::io(path, e.error))?;

        tracing::debug!(path = %path.display(), "ledger saved");
        Ok(())
    }

    pub fn from_json(text: &str) -> LedgerResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Pretty-printed JSON document.
    pub fn to_json(&self) -> LedgerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// BLAKE3 digest of the serialized document, for change detection.
    pub fn digest(&self) -> LedgerResult<String> {
        Ok(ContentHasher::LEDGER.hash_hex(self.to_json()?.as_bytes()))
    }

    /// The release line `version` belongs to.
    pub fn find_line(&self, version: &VersionIdentifier) -> Option<&ReleaseLine> {
        self.lines.iter().find(|l| l.version.same_release_line(version))
    }

    fn find_line_mut(&mut self, version: &VersionIdentifier) -> Option<&mut ReleaseLine> {
        self.lines
            .iter_mut()
            .find(|l| l.version.same_release_line(version))
    }

    /// Highest version recorded across all release lines.
    pub fn latest_version(&self) -> Option<VersionIdentifier> {
        self.lines.iter().map(|l| l.version).max()
    }

    /// Revision of the newest release line, if any.
    pub fn latest_revision(&self) -> Option<u16> {
        self.latest_version().map(|v| v.revision())
    }

    /// Check that `target` may be built on top of this ledger and stage it.
    ///
    /// Rejected when the line already holds `target` or something newer, or
    /// when a non-zero `target` does not directly follow the line's current
    /// revision (an absent line counts as revision 0). On success the line's
    /// version is advanced to `target`, or a new line is inserted first.
    pub fn validate_and_stage(&mut self, target: VersionIdentifier) -> LedgerResult<()> {
        let previous = match self.find_line(&target) {
            Some(line) if line.version > target => {
                return Err(LedgerError::NewerVersionExists {
                    existing: line.version,
                    target,
                });
            }
            Some(line) if line.version == target => {
                return Err(LedgerError::AlreadyReleased(target));
            }
            Some(line) => line.version,
            None => target.base(),
        };

        if target.revision() != 0 && previous.revision().checked_add(1) != Some(target.revision()) {
            return Err(LedgerError::RevisionGap { previous, target });
        }

        match self.find_line_mut(&target) {
            Some(line) => line.version = target,
            None => self.lines.insert(0, ReleaseLine::new(target)),
        }
        tracing::debug!(version = %target, %previous, "version staged");
        Ok(())
    }

    /// Record the patch produced for `target`.
    ///
    /// Entries at or beyond `target`'s revision are dropped first, so a
    /// rebuilt revision replaces its predecessor and the sequence stays dense.
    pub fn record_patch(&mut self, target: VersionIdentifier, entry: PatchEntry) -> LedgerResult<()> {
        let line = self
            .find_line_mut(&target)
            .ok_or_else(|| LedgerError::LineNotFound(target.release_line()))?;
        line.trim_from(target.revision());
        line.patches.push(entry);
        line.version = target;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn v(s: &str) -> VersionIdentifier {
        s.parse().unwrap()
    }

    fn entry(revision: u16) -> PatchEntry {
        PatchEntry::new(format!("{revision}_{}_{}.zip", revision + 9, revision + 10), "d41d8cd98f00b204e9800998ecf8427e", 100 * u64::from(revision), revision)
    }

    /// A ledger whose 1.0 line has been patched up to `revision`.
    fn patched_to(revision: u16) -> VersionLedger {
        let mut ledger = VersionLedger::new();
        ledger.validate_and_stage(v("1.0.0")).unwrap();
        for r in 1..=revision {
            let target = v("1.0.0").with_revision(r);
            ledger.validate_and_stage(target).unwrap();
            ledger.record_patch(target, entry(r)).unwrap();
        }
        ledger
    }

    #[test]
    fn document_shape() {
        let ledger = patched_to(1);
        let json: serde_json::Value = serde_json::from_str(&ledger.to_json().unwrap()).unwrap();
        let item = &json["versionUpdateItems"][0];
        assert_eq!(item["version"], "1.0.1");
        assert_eq!(item["patches"][0]["revisionNum"], 1);
        assert_eq!(item["patches"][0]["patchName"], "1_10_11.zip");
    }

    #[test]
    fn json_roundtrip_is_field_for_field() {
        let mut ledger = patched_to(3);
        ledger.validate_and_stage(v("2.1.0")).unwrap();
        let parsed = VersionLedger::from_json(&ledger.to_json().unwrap()).unwrap();
        assert_eq!(parsed, ledger);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = VersionLedger::load(&dir.path().join(LEDGER_FILE_NAME)).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn malformed_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LEDGER_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(VersionLedger::load(&path).unwrap().is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/Snapshot").join(LEDGER_FILE_NAME);
        let ledger = patched_to(2);
        ledger.save(&path).unwrap();
        assert_eq!(VersionLedger::load(&path).unwrap(), ledger);
    }

    #[test]
    fn save_replaces_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LEDGER_FILE_NAME);
        patched_to(3).save(&path).unwrap();
        patched_to(1).save(&path).unwrap();
        assert_eq!(VersionLedger::load(&path).unwrap(), patched_to(1));
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn base_on_empty_ledger_creates_line() {
        let mut ledger = VersionLedger::new();
        ledger.validate_and_stage(v("1.0.0")).unwrap();
        assert_eq!(ledger.lines().len(), 1);
        assert!(ledger.lines()[0].patches.is_empty());
    }

    #[test]
    fn next_revision_is_accepted() {
        let mut ledger = patched_to(2);
        ledger.validate_and_stage(v("1.0.3")).unwrap();
        assert_eq!(ledger.find_line(&v("1.0.0")).unwrap().version, v("1.0.3"));
    }

    #[test]
    fn skipping_a_revision_is_rejected() {
        let mut ledger = patched_to(2);
        let err = ledger.validate_and_stage(v("1.0.4")).unwrap_err();
        assert!(matches!(err, LedgerError::RevisionGap { .. }));
        assert!(err.is_validation());
    }

    #[test]
    fn rebuilding_persisted_revision_is_rejected() {
        let mut ledger = patched_to(2);
        assert!(matches!(
            ledger.validate_and_stage(v("1.0.2")),
            Err(LedgerError::AlreadyReleased(_))
        ));
    }

    #[test]
    fn rebuilding_base_is_rejected() {
        let mut ledger = patched_to(0);
        assert!(matches!(
            ledger.validate_and_stage(v("1.0.0")),
            Err(LedgerError::AlreadyReleased(_))
        ));
    }

    #[test]
    fn older_revision_is_rejected() {
        let mut ledger = patched_to(3);
        assert!(matches!(
            ledger.validate_and_stage(v("1.0.1")),
            Err(LedgerError::NewerVersionExists { .. })
        ));
    }

    #[test]
    fn first_patch_of_unknown_line_follows_implicit_base() {
        let mut ledger = VersionLedger::new();
        ledger.validate_and_stage(v("3.1.1")).unwrap();
        assert!(ledger.validate_and_stage(v("4.0.2")).is_err());
    }

    #[test]
    fn failed_validation_leaves_ledger_untouched() {
        let mut ledger = patched_to(1);
        let before = ledger.clone();
        let _ = ledger.validate_and_stage(v("1.0.5"));
        assert_eq!(ledger, before);
    }

    #[test]
    fn new_lines_go_first() {
        let mut ledger = patched_to(1);
        ledger.validate_and_stage(v("1.1.0")).unwrap();
        assert_eq!(ledger.lines()[0].version, v("1.1.0"));
        assert_eq!(ledger.latest_version(), Some(v("1.1.0")));
        assert_eq!(ledger.latest_revision(), Some(0));
    }

    #[test]
    fn record_patch_trims_then_appends() {
        let mut ledger = patched_to(3);
        let replacement = PatchEntry::new("2_50_51.zip", "ff", 7, 2);
        ledger.record_patch(v("1.0.2"), replacement.clone()).unwrap();
        let line = ledger.find_line(&v("1.0.0")).unwrap();
        assert_eq!(line.patches, vec![entry(1), replacement]);
        assert_eq!(line.version, v("1.0.2"));
    }

    #[test]
    fn record_patch_requires_line() {
        let mut ledger = VersionLedger::new();
        let err = ledger.record_patch(v("1.0.1"), entry(1)).unwrap_err();
        assert!(matches!(err, LedgerError::LineNotFound(_)));
    }

    #[test]
    fn digest_tracks_content() {
        assert_eq!(patched_to(1).digest().unwrap(), patched_to(1).digest().unwrap());
        assert_ne!(patched_to(1).digest().unwrap(), patched_to(2).digest().unwrap());
    }

    proptest! {
        #[test]
        fn only_next_revision_validates(current in 0u16..40, requested in 1u16..60) {
            let mut ledger = patched_to(current);
            let result = ledger.validate_and_stage(v("1.0.0").with_revision(requested));
            prop_assert_eq!(result.is_ok(), requested == current + 1);
        }
    }
}
