//! Error types for the snapshot crate.

use std::path::PathBuf;

/// Errors that can occur while recording or reading snapshots.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// A file inside the content root could not be fingerprinted.
    #[error("fingerprint failed: {0}")]
    Fingerprint(#[from] vpatch_crypto::HasherError),

    /// A ledger line could not be parsed.
    #[error("{}:{line}: {source}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: vpatch_types::TypeError,
    },

    /// I/O failure reading or writing a ledger file.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SnapshotError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Convenience alias for snapshot results.
pub type SnapshotResult<T> = Result<T, SnapshotError>;
