//! Patch packaging for vpatch.
//!
//! Turns a list of changed [`FileRecord`](vpatch_types::FileRecord)s into a
//! distributable zip archive: the changed files (and their bundle manifests)
//! are staged under a directory named after the patch, archived with deflate,
//! and the staging directory is removed once the archive is on disk.
//!
//! # Key Types
//!
//! - [`PatchPackager`] -- Stages and archives changed files
//! - [`PatchArchive`] -- The written archive: path, size, MD5
//! - [`patch_name`] / [`parse_build_number`] -- Naming conventions

pub mod error;
pub mod naming;
pub mod packager;

pub use error::{PackError, PackResult};
pub use naming::{archive_file_name, build_dir_name, parse_build_number, patch_name};
pub use packager::{PatchArchive, PatchPackager};
