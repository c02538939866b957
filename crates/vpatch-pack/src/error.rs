use std::path::{Path, PathBuf};

use thiserror::Error;
use vpatch_crypto::HasherError;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("archive error at {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("archive checksum failed: {0}")]
    Checksum(#[from] HasherError),

    #[error("archive missing after write: {}", .0.display())]
    ArchiveMissing(PathBuf),

    #[error("not a build directory name: {0:?}")]
    InvalidBuildDirectory(String),
}

impl PackError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn archive(path: &Path, source: zip::result::ZipError) -> Self {
        Self::Archive {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type PackResult<T> = Result<T, PackError>;
