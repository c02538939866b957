use serde::{Deserialize, Serialize};
use vpatch_types::VersionIdentifier;

/// One patch archive published for a release line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchEntry {
    #[serde(rename = "patchName")]
    pub patch_name: String,
    /// Lowercase MD5 hex of the archive.
    #[serde(rename = "md5")]
    pub checksum: String,
    #[serde(rename = "fileSize")]
    pub file_size_bytes: u64,
    #[serde(rename = "revisionNum")]
    pub revision_number: u16,
}

impl PatchEntry {
    pub fn new(
        patch_name: impl Into<String>,
        checksum: impl Into<String>,
        file_size_bytes: u64,
        revision_number: u16,
    ) -> Self {
        Self {
            patch_name: patch_name.into(),
            checksum: checksum.into(),
            file_size_bytes,
            revision_number,
        }
    }
}

/// All patches of one `major.minor` release line.
///
/// `version` is the newest persisted version of the line; `patches` lists
/// revisions `1..=version.revision()` in ascending order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseLine {
    pub version: VersionIdentifier,
    #[serde(default)]
    pub patches: Vec<PatchEntry>,
}

impl ReleaseLine {
    pub fn new(version: VersionIdentifier) -> Self {
        Self {
            version,
            patches: Vec::new(),
        }
    }

    /// Drop every patch with `revision_number >= revision`.
    pub fn trim_from(&mut self, revision: u16) {
        self.patches.retain(|p| p.revision_number < revision);
    }

    /// Size of all patches in bytes.
    pub fn total_patch_size(&self) -> u64 {
        self.patches.iter().map(|p| p.file_size_bytes).sum()
    }
}
