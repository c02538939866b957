//! Content fingerprinting for vpatch.
//!
//! Provides the MD5 checksums used in snapshot ledgers and patch entries
//! (the format consumed by deployed clients), and domain-separated BLAKE3
//! digests for whole-snapshot identity.
//!
//! All hashing wraps established libraries.

pub mod hasher;

pub use hasher::{md5_file, md5_hex, ContentHasher, HasherError};
