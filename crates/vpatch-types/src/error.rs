use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("version {major}.{minor} violates constraint: major and minor must be below 100")]
    VersionConstraint { major: u32, minor: u32 },

    #[error("revision of version {0:?} does not fit in 16 bits")]
    RevisionRange(String),

    #[error("invalid file record line: {0:?}")]
    InvalidRecord(String),

    #[error("invalid build target: {0:?}")]
    InvalidTarget(String),

    #[error("unknown promotion kind: {0}")]
    UnknownPromotion(String),
}
