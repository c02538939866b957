//! Walks a content root and fingerprints every hot-updatable file.

use std::path::{Path, PathBuf};

use vpatch_crypto::md5_file;
use vpatch_types::FileRecord;
use walkdir::WalkDir;

use crate::error::{SnapshotError, SnapshotResult};
use crate::manifest::{is_sidecar, read_bundle_hash};
use crate::snapshot::ContentSnapshot;

/// Produces a [`ContentSnapshot`] for a built output tree.
///
/// Records are partitioned in two groups, each sorted by path:
///
/// 1. bundles: files whose `.manifest` sidecar carries an asset hash, keyed
///    by that hash (cheap, and stable as long as the bundle inputs are);
/// 2. loose files: everything else except sidecars, keyed by MD5.
#[derive(Clone, Debug)]
pub struct HashRecorder {
    root: PathBuf,
}

impl HashRecorder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Record the snapshot.
    ///
    /// A missing or unreadable root yields an empty snapshot: with nothing
    /// built yet there is simply nothing to diff against. Anything below the
    /// root that cannot be listed or hashed is an error, since dropping it
    /// would silently leave it out of the patch.
    pub fn record(&self) -> SnapshotResult<ContentSnapshot> {
        if !self.root.is_dir() {
            tracing::warn!(root = %self.root.display(), "content root missing, snapshot is empty");
            return Ok(ContentSnapshot::new());
        }

        let mut bundles = Vec::new();
        let mut loose = Vec::new();

        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    tracing::warn!(root = %self.root.display(), error = %e, "content root unreadable, snapshot is empty");
                    return Ok(ContentSnapshot::new());
                }
                Err(e) => return Err(walk_error(&self.root, e)),
            };
            if !entry.file_type().is_file() || is_sidecar(entry.path()) {
                continue;
            }

            let relative = relative_path(&self.root, entry.path());
            match read_bundle_hash(entry.path()) {
                Some(hash) => bundles.push(FileRecord::new(relative, hash)),
                None => {
                    let md5 = md5_file(entry.path())?;
                    loose.push(FileRecord::new(relative, md5));
                }
            }
        }

        bundles.sort();
        loose.sort();
        tracing::info!(
            root = %self.root.display(),
            bundles = bundles.len(),
            loose = loose.len(),
            "content snapshot recorded"
        );

        Ok(bundles.into_iter().chain(loose).collect())
    }
}

fn walk_error(root: &Path, error: walkdir::Error) -> SnapshotError {
    let path = error.path().unwrap_or(root).to_path_buf();
    let source = error
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("filesystem loop in content root"));
    SnapshotError::io(&path, source)
}

/// `/`-separated path of `path` relative to `root`.
fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
