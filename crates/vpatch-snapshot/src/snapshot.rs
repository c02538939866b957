//! The in-memory snapshot and its text ledger form.

use std::path::Path;

use vpatch_crypto::ContentHasher;
use vpatch_types::FileRecord;

use crate::error::{SnapshotError, SnapshotResult};

/// Complete content-fingerprint ledger for one build.
///
/// Records keep their insertion order; that order is the order of the text
/// ledger and of any diff computed against it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContentSnapshot {
    records: Vec<FileRecord>,
}

impl ContentSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<FileRecord>) -> Self {
        Self { records }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the snapshot has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn push(&mut self, record: FileRecord) {
        self.records.push(record);
    }

    /// Records rendered as `path|fingerprint` lines.
    pub fn lines(&self) -> Vec<String> {
        self.records.iter().map(FileRecord::to_line).collect()
    }

    /// The ledger text: lines joined by `\n`, no trailing newline.
    pub fn to_ledger_text(&self) -> String {
        self.lines().join("\n")
    }

    /// Parse ledger text. Blank lines are skipped.
    pub fn parse(text: &str, source: &Path) -> SnapshotResult<Self> {
        let mut records = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record = FileRecord::parse_line(line).map_err(|e| SnapshotError::Parse {
                path: source.to_path_buf(),
                line: index + 1,
                source: e,
            })?;
            records.push(record);
        }
        Ok(Self { records })
    }

    /// Read a ledger file written by [`write_to`](Self::write_to).
    pub fn read_from(path: &Path) -> SnapshotResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| SnapshotError::io(path, e))?;
        Self::parse(&text, path)
    }

    /// Write the ledger, fully replacing any previous file at `path`.
    pub fn write_to(&self, path: &Path) -> SnapshotResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SnapshotError::io(parent, e))?;
        }
        std::fs::write(path, self.to_ledger_text()).map_err(|e| SnapshotError::io(path, e))?;
        tracing::debug!(path = %path.display(), records = self.len(), "snapshot ledger written");
        Ok(())
    }

    /// Hex BLAKE3 digest of the ledger text.
    ///
    /// Two snapshots with the same digest produce an empty diff.
    pub fn digest(&self) -> String {
        ContentHasher::SNAPSHOT.hash_hex(self.to_ledger_text().as_bytes())
    }
}

impl FromIterator<FileRecord> for ContentSnapshot {
    fn from_iter<I: IntoIterator<Item = FileRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ContentSnapshot {
    type Item = &'a FileRecord;
    type IntoIter = std::slice::Iter<'a, FileRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ContentSnapshot {
        ContentSnapshot::from_records(vec![
            FileRecord::new("ui/main", "h1"),
            FileRecord::new("audio/master.bank", "h2"),
        ])
    }

    #[test]
    fn ledger_text_has_no_trailing_newline() {
        assert_eq!(sample().to_ledger_text(), "ui/main|h1\naudio/master.bank|h2");
    }

    #[test]
    fn empty_snapshot_text() {
        assert_eq!(ContentSnapshot::new().to_ledger_text(), "");
        assert!(ContentSnapshot::new().is_empty());
    }

    #[test]
    fn write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Snapshot").join("hotFileRecords.txt");
        let snapshot = sample();
        snapshot.write_to(&path).unwrap();
        assert_eq!(ContentSnapshot::read_from(&path).unwrap(), snapshot);
    }

    #[test]
    fn write_replaces_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.txt");
        std::fs::write(&path, "stale|0\nmore|1\nlines|2").unwrap();
        let snapshot = ContentSnapshot::from_records(vec![FileRecord::new("fresh", "9")]);
        snapshot.write_to(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh|9");
    }

    #[test]
    fn parse_tolerates_crlf_and_blank_lines() {
        let parsed = ContentSnapshot::parse("a|1\r\n\r\nb|2\r\n", Path::new("x")).unwrap();
        assert_eq!(parsed.lines(), vec!["a|1", "b|2"]);
    }

    #[test]
    fn parse_reports_line_number() {
        let err = ContentSnapshot::parse("a|1\nbroken", Path::new("records.txt")).unwrap_err();
        match err {
            SnapshotError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ContentSnapshot::read_from(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, SnapshotError::Io { .. }));
    }

    #[test]
    fn digest_tracks_content() {
        let a = sample();
        let mut b = sample();
        assert_eq!(a.digest(), b.digest());
        b.push(FileRecord::new("new", "h3"));
        assert_ne!(a.digest(), b.digest());
    }
}
