use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use md5::{Digest, Md5};

/// Read buffer size used when hashing files.
const CHUNK_SIZE: usize = 64 * 1024;

/// Lowercase hex MD5 of a byte slice.
pub fn md5_hex(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

/// Lowercase hex MD5 of a file's contents, streamed in chunks.
pub fn md5_file(path: &Path) -> Result<String, HasherError> {
    let file = File::open(path).map_err(|source| HasherError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf).map_err(|source| HasherError::Io {
            path: path.display().to_string(),
            source,
        })?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// BLAKE3 digest of whole documents, keyed by document kind.
///
/// The kind tag is hashed ahead of the bytes, so a snapshot and a ledger with
/// identical text still get different digests.
#[derive(Clone, Copy, Debug)]
pub struct ContentHasher {
    kind: &'static str,
}

impl ContentHasher {
    /// Snapshot ledgers (`hotFileRecords.txt`).
    pub const SNAPSHOT: Self = Self {
        kind: "vpatch-snapshot-v1",
    };
    /// Patch ledgers (`PatchInfo.json`).
    pub const LEDGER: Self = Self {
        kind: "vpatch-ledger-v1",
    };

    /// Lowercase hex digest of `data`.
    pub fn hash_hex(&self, data: &[u8]) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.kind.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        hasher.finalize().to_hex().to_string()
    }
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error)]
pub enum HasherError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
