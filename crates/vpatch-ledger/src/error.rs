use std::path::PathBuf;

use vpatch_types::VersionIdentifier;

/// Errors produced by ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("cannot overwrite {existing}: it is newer than {target}")]
    NewerVersionExists {
        existing: VersionIdentifier,
        target: VersionIdentifier,
    },

    #[error("version {0} is already released")]
    AlreadyReleased(VersionIdentifier),

    #[error("revision gap: previous version {previous}, requested {target}")]
    RevisionGap {
        previous: VersionIdentifier,
        target: VersionIdentifier,
    },

    #[error("release line {0} not found")]
    LineNotFound(String),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LedgerError {
    /// Returns `true` for rule violations (as opposed to storage failures).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NewerVersionExists { .. }
                | Self::AlreadyReleased(_)
                | Self::RevisionGap { .. }
                | Self::LineNotFound(_)
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
