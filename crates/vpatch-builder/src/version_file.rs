//! The `LastBuildVersion.txt` marker at a target's version root.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use vpatch_types::VersionIdentifier;

use crate::error::{BuildError, BuildResult};

/// Read the last successfully built version. A missing file means nothing
/// was built yet and reads as `0.0.0`.
pub fn read_last_version(path: &Path) -> BuildResult<VersionIdentifier> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(VersionIdentifier::parse(text.trim())?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(VersionIdentifier::INIT),
        Err(e) => Err(BuildError::io(path, e)),
    }
}

/// A marker written next to its destination but not yet moved into place.
///
/// Dropping it without [`commit`](Self::commit) removes the temporary file
/// and leaves the current marker untouched.
#[derive(Debug)]
pub struct PendingVersion {
    file: NamedTempFile,
    path: PathBuf,
}

impl PendingVersion {
    /// Replace the marker with the staged contents.
    pub fn commit(self) -> BuildResult<()> {
        self.file
            .persist(&self.path)
            .map_err(|e| BuildError::io(&self.path, e.error))?;
        Ok(())
    }
}

/// Stage `version` as the next marker content at `path`.
pub fn stage_last_version(path: &Path, version: &VersionIdentifier) -> BuildResult<PendingVersion> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
    let mut file = NamedTempFile::new_in(parent).map_err(|e| BuildError::io(parent, e))?;
    file.write_all(version.to_string().as_bytes())
        .and_then(|()| file.as_file().sync_all())
        .map_err(|e| BuildError::io(file.path(), e))?;
    Ok(PendingVersion {
        file,
        path: path.to_path_buf(),
    })
}

/// Record `version` as the last successful build.
pub fn write_last_version(path: &Path, version: &VersionIdentifier) -> BuildResult<()> {
    stage_last_version(path, version)?.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_init() {
        let dir = tempfile::tempdir().unwrap();
        let version = read_last_version(&dir.path().join("LastBuildVersion.txt")).unwrap();
        assert!(version.is_init());
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Version/LastBuildVersion.txt");
        let version: VersionIdentifier = "2.3.4".parse().unwrap();
        write_last_version(&path, &version).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "2.3.4");
        assert_eq!(read_last_version(&path).unwrap(), version);
    }

    #[test]
    fn tolerates_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.txt");
        std::fs::write(&path, "1.0.7\r\n").unwrap();
        assert_eq!(read_last_version(&path).unwrap().revision(), 7);
    }

    #[test]
    fn dropped_pending_marker_leaves_old_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("LastBuildVersion.txt");
        write_last_version(&path, &"1.0.0".parse().unwrap()).unwrap();

        let pending = stage_last_version(&path, &"1.0.1".parse().unwrap()).unwrap();
        drop(pending);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1.0.0");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
