//! Foundation types for vpatch.
//!
//! This crate provides the value types shared by every stage of the patch
//! pipeline. Every other vpatch crate depends on `vpatch-types`.
//!
//! # Key Types
//!
//! - [`VersionIdentifier`] -- Ordered `major.minor.revision` release version
//! - [`VersionPromotion`] -- Policy used to derive the next build version
//! - [`FileRecord`] -- One `path|fingerprint` line of a content snapshot
//! - [`BuildTarget`] -- Platform identifier used as an output directory component

pub mod error;
pub mod promotion;
pub mod record;
pub mod target;
pub mod version;

pub use error::TypeError;
pub use promotion::VersionPromotion;
pub use record::FileRecord;
pub use target::BuildTarget;
pub use version::VersionIdentifier;
