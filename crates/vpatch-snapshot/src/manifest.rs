//! Bundle manifest sidecars.
//!
//! Each built bundle `foo` is accompanied by a `foo.manifest` YAML document
//! whose `Hashes` section records the bundle's asset hash:
//!
//! ```text
//! ManifestFileVersion: 0
//! CRC: 2462604539
//! Hashes:
//!   AssetFileHash:
//!     serializedVersion: 2
//!     Hash: 6fd6ba4b0fa8b8ae3d0bc2b9ea1c7c4e
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Extension of bundle manifest sidecars.
pub const MANIFEST_EXTENSION: &str = "manifest";
/// Extension of engine metadata sidecars.
pub const META_EXTENSION: &str = "meta";

/// The parts of a bundle manifest that fingerprinting reads. Every other
/// key is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BundleManifest {
    #[serde(default)]
    hashes: Option<ManifestHashes>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ManifestHashes {
    #[serde(default)]
    asset_file_hash: Option<HashEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HashEntry {
    #[serde(default)]
    hash: Option<String>,
}

/// Path of the `.manifest` sidecar for `file` (`foo` → `foo.manifest`).
pub fn sidecar_path(file: &Path) -> PathBuf {
    let mut name = OsString::from(file.as_os_str());
    name.push(".");
    name.push(MANIFEST_EXTENSION);
    PathBuf::from(name)
}

/// Returns `true` for sidecar metadata files that are never tracked on
/// their own.
pub fn is_sidecar(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == MANIFEST_EXTENSION || e == META_EXTENSION)
}

/// Extract the asset hash from manifest text.
///
/// Returns `Ok(None)` when the manifest has no `Hashes.AssetFileHash.Hash`,
/// which is the case for the platform-level master manifest.
pub fn parse_bundle_hash(text: &str) -> Result<Option<String>, serde_yaml::Error> {
    let manifest: BundleManifest = serde_yaml::from_str(text)?;
    Ok(manifest
        .hashes
        .and_then(|h| h.asset_file_hash)
        .and_then(|e| e.hash)
        .map(|hash| hash.trim().to_string())
        .filter(|hash| !hash.is_empty()))
}

/// Read the asset hash from the sidecar of `bundle`, if there is one.
///
/// A sidecar that is not valid YAML is logged and treated as absent, so the
/// bundle falls back to a content hash.
pub fn read_bundle_hash(bundle: &Path) -> Option<String> {
    let sidecar = sidecar_path(bundle);
    let text = std::fs::read_to_string(&sidecar).ok()?;
    match parse_bundle_hash(&text) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::warn!(sidecar = %sidecar.display(), error = %e, "unreadable bundle manifest");
            None
        }
    }
}
