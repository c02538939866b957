//! On-disk layout of a target's versioned output.
//!
//! ```text
//! {output_root}/{target}/Version/            version root
//!     LastBuildVersion.txt
//!     Diff/PatchInfo.json
//!     Diff/{M}.{N}.0/{patch}.zip
//!     Diff.staging/  Diff.previous/          only while a build publishes
//!     {M}.{N}/{R}/{timestamp}({build})/      build directory
//!         Snapshot/rawFileRecords.txt
//!         Snapshot/hotFileRecords.txt
//!         Snapshot/PatchInfo.json
//!         Patch/{patch}.zip
//! ```

use std::path::{Path, PathBuf};

use vpatch_pack::build_dir_name;
use vpatch_types::{BuildTarget, VersionIdentifier};

use crate::error::{BuildError, BuildResult};

pub const VERSION_DIR: &str = "Version";
pub const SNAPSHOT_DIR: &str = "Snapshot";
pub const PATCH_DIR: &str = "Patch";
pub const DIFF_DIR: &str = "Diff";
/// `Diff/` contents being assembled by a build that has not committed yet.
pub const DIFF_STAGING_DIR: &str = "Diff.staging";
/// The previous `Diff/`, kept while a new one is swapped in.
pub const DIFF_BACKUP_DIR: &str = "Diff.previous";
pub const HOT_RECORDS_FILE: &str = "hotFileRecords.txt";
pub const RAW_RECORDS_FILE: &str = "rawFileRecords.txt";
pub const LAST_VERSION_FILE: &str = "LastBuildVersion.txt";

/// Build directory timestamp format. Zero-padded 24-hour fields keep string
/// order equal to chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H_%M_%S";

/// Paths of one target's output tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildLayout {
    version_root: PathBuf,
}

impl BuildLayout {
    pub fn new(output_root: &Path, target: &BuildTarget) -> Self {
        Self {
            version_root: output_root.join(target.as_str()).join(VERSION_DIR),
        }
    }

    pub fn version_root(&self) -> &Path {
        &self.version_root
    }

    /// `{M}.{N}/`
    pub fn release_line_dir(&self, version: &VersionIdentifier) -> PathBuf {
        self.version_root.join(version.release_line())
    }

    /// `{M}.{N}/{R}/`
    pub fn revision_dir(&self, version: &VersionIdentifier) -> PathBuf {
        self.release_line_dir(version)
            .join(version.revision().to_string())
    }

    /// `{M}.{N}/{R}/{timestamp}({build})/`
    pub fn build_dir(&self, version: &VersionIdentifier, timestamp: &str, build: u32) -> PathBuf {
        self.revision_dir(version)
            .join(build_dir_name(timestamp, build))
    }

    pub fn diff_dir(&self) -> PathBuf {
        self.version_root.join(DIFF_DIR)
    }

    /// `Diff/{M}.{N}.0/`
    pub fn diff_patch_dir(&self, version: &VersionIdentifier) -> PathBuf {
        self.diff_dir().join(version.base().to_string())
    }

    pub fn diff_staging_dir(&self) -> PathBuf {
        self.version_root.join(DIFF_STAGING_DIR)
    }

    pub fn diff_backup_dir(&self) -> PathBuf {
        self.version_root.join(DIFF_BACKUP_DIR)
    }

    pub fn last_version_file(&self) -> PathBuf {
        self.version_root.join(LAST_VERSION_FILE)
    }

    /// Most recent build directory of `version`'s revision, if any.
    ///
    /// Build directory names start with their timestamp, so the last one in
    /// name order is the newest.
    pub fn latest_build_dir(&self, version: &VersionIdentifier) -> BuildResult<Option<PathBuf>> {
        let mut dirs = subdirectories(&self.revision_dir(version))?;
        dirs.sort();
        Ok(dirs.pop())
    }

    /// Returns `true` if `version`'s revision directory holds any build.
    pub fn has_builds(&self, version: &VersionIdentifier) -> BuildResult<bool> {
        Ok(!subdirectories(&self.revision_dir(version))?.is_empty())
    }

    /// Revisions of `version`'s release line that have a directory, ascending.
    pub fn revisions(&self, version: &VersionIdentifier) -> BuildResult<Vec<u16>> {
        let mut revisions: Vec<u16> = subdirectories(&self.release_line_dir(version))?
            .iter()
            .filter_map(|dir| dir.file_name()?.to_str()?.parse().ok())
            .collect();
        revisions.sort_unstable();
        Ok(revisions)
    }

    /// Newest build of the highest revision of `version`'s release line.
    pub fn latest_persisted_build(
        &self,
        version: &VersionIdentifier,
    ) -> BuildResult<Option<(VersionIdentifier, PathBuf)>> {
        for revision in self.revisions(version)?.into_iter().rev() {
            let candidate = version.with_revision(revision);
            if let Some(dir) = self.latest_build_dir(&candidate)? {
                return Ok(Some((candidate, dir)));
            }
        }
        Ok(None)
    }
}

/// Immediate subdirectories of `dir`. A missing `dir` has none.
pub(crate) fn subdirectories(dir: &Path) -> BuildResult<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(BuildError::io(dir, e)),
    };

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BuildError::io(dir, e))?;
        if entry.path().is_dir() {
            dirs.push(entry.path());
        }
    }
    Ok(dirs)
}

pub fn snapshot_dir(build_dir: &Path) -> PathBuf {
    build_dir.join(SNAPSHOT_DIR)
}

pub fn patch_dir(build_dir: &Path) -> PathBuf {
    build_dir.join(PATCH_DIR)
}

pub fn hot_records_file(build_dir: &Path) -> PathBuf {
    snapshot_dir(build_dir).join(HOT_RECORDS_FILE)
}
