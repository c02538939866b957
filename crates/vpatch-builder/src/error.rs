use std::path::PathBuf;

use thiserror::Error;
use vpatch_types::VersionIdentifier;

/// Coarse classification of a build failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request was rejected before anything was written.
    Validation,
    /// A filesystem or archive operation failed mid-build.
    Io,
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("type error: {0}")]
    Type(#[from] vpatch_types::TypeError),

    #[error("ledger error: {0}")]
    Ledger(#[from] vpatch_ledger::LedgerError),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] vpatch_snapshot::SnapshotError),

    #[error("pack error: {0}")]
    Pack(#[from] vpatch_pack::PackError),

    #[error("no build of {0} to diff against")]
    MissingPreviousBuild(VersionIdentifier),

    #[error("build directory already exists: {}", .0.display())]
    BuildExists(PathBuf),

    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Type(_) | Self::BuildExists(_) | Self::Config { .. } => ErrorKind::Validation,
            Self::Ledger(e) if e.is_validation() => ErrorKind::Validation,
            _ => ErrorKind::Io,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type BuildResult<T> = Result<T, BuildError>;
