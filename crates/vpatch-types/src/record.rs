use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Separator between the path and the fingerprint of a record line.
pub const RECORD_SEPARATOR: char = '|';

/// One tracked asset in a content snapshot.
///
/// Serialized as a single `path|fingerprint` text line. Two records are the
/// same only if both fields match, which is what makes line-set diffing
/// detect content changes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path relative to the content root, always `/`-separated.
    pub relative_path: String,
    /// Content hash or bundle-manifest hash.
    pub fingerprint: String,
}

impl FileRecord {
    pub fn new(relative_path: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            fingerprint: fingerprint.into(),
        }
    }

    /// Parse a `path|fingerprint` line.
    ///
    /// Fingerprints never contain the separator, so the line is split at the
    /// last one and a path may itself contain `|`.
    pub fn parse_line(line: &str) -> Result<Self, TypeError> {
        let line = line.trim_end_matches('\r');
        match line.rsplit_once(RECORD_SEPARATOR) {
            Some((path, fingerprint)) if !path.is_empty() => Ok(Self::new(path, fingerprint)),
            _ => Err(TypeError::InvalidRecord(line.to_string())),
        }
    }

    /// Render as a ledger line.
    pub fn to_line(&self) -> String {
        format!("{}{RECORD_SEPARATOR}{}", self.relative_path, self.fingerprint)
    }
}

impl FromStr for FileRecord {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_line(s)
    }
}

impl fmt::Display for FileRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{RECORD_SEPARATOR}{}", self.relative_path, self.fingerprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_line() {
        let record = FileRecord::parse_line("ui/main|abc123").unwrap();
        assert_eq!(record.relative_path, "ui/main");
        assert_eq!(record.fingerprint, "abc123");
    }

    #[test]
    fn parse_strips_carriage_return() {
        let record = FileRecord::parse_line("a.bank|ff\r").unwrap();
        assert_eq!(record.fingerprint, "ff");
    }

    #[test]
    fn parse_splits_at_last_separator() {
        let record = FileRecord::parse_line("a|b|c").unwrap();
        assert_eq!(record.relative_path, "a|b");
        assert_eq!(record.fingerprint, "c");
    }

    #[test]
    fn path_with_separator_survives_a_line_roundtrip() {
        let record = FileRecord::new("ui/a|b.txt", "0cc175b9c0f1b6a831c399e269772661");
        assert_eq!(FileRecord::parse_line(&record.to_line()).unwrap(), record);
    }

    #[test]
    fn parse_rejects_missing_separator() {
        assert!(matches!(
            FileRecord::parse_line("no-separator"),
            Err(TypeError::InvalidRecord(_))
        ));
    }

    #[test]
    fn parse_rejects_empty_path() {
        assert!(FileRecord::parse_line("|abc").is_err());
    }

    #[test]
    fn line_format() {
        let record = FileRecord::new("audio/master.bank", "d41d8cd9");
        assert_eq!(record.to_line(), "audio/master.bank|d41d8cd9");
        assert_eq!(record.to_string(), record.to_line());
    }
}
