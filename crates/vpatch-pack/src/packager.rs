use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use vpatch_crypto::md5_file;
use vpatch_snapshot::sidecar_path;
use vpatch_types::FileRecord;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{PackError, PackResult};
use crate::naming::archive_file_name;

/// Result of packaging a patch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatchArchive {
    pub path: PathBuf,
    pub size: u64,
    /// Lowercase MD5 hex of the archive bytes.
    pub md5: String,
    /// Number of files stored in the archive, sidecars included.
    pub file_count: usize,
}

/// Stages changed files from a content root and archives them.
#[derive(Clone, Debug)]
pub struct PatchPackager {
    content_root: PathBuf,
}

impl PatchPackager {
    /// Create a packager reading source files from `content_root`.
    pub fn new(content_root: impl Into<PathBuf>) -> Self {
        Self {
            content_root: content_root.into(),
        }
    }

    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    /// Package `records` into `patch_dir/{name}.zip`.
    ///
    /// Files are first copied into `patch_dir/{name}/` preserving their
    /// relative paths, each followed by its `.manifest` sidecar when one
    /// exists. The staging directory is removed only after the archive has
    /// been written and checksummed. A record whose source file is missing
    /// fails the whole package.
    pub fn package(
        &self,
        records: &[FileRecord],
        patch_dir: &Path,
        name: &str,
    ) -> PackResult<PatchArchive> {
        let staging = patch_dir.join(name);
        if staging.exists() {
            std::fs::remove_dir_all(&staging).map_err(|e| PackError::io(&staging, e))?;
        }
        std::fs::create_dir_all(&staging).map_err(|e| PackError::io(&staging, e))?;

        for record in records {
            self.stage(record, &staging)?;
        }

        let archive_path = patch_dir.join(archive_file_name(name));
        let file_count = write_archive(&staging, &archive_path)?;

        let size = std::fs::metadata(&archive_path)
            .map_err(|_| PackError::ArchiveMissing(archive_path.clone()))?
            .len();
        let md5 = md5_file(&archive_path)?;

        std::fs::remove_dir_all(&staging).map_err(|e| PackError::io(&staging, e))?;

        tracing::info!(
            archive = %archive_path.display(),
            files = file_count,
            size,
            "patch archive written"
        );

        Ok(PatchArchive {
            path: archive_path,
            size,
            md5,
            file_count,
        })
    }

    fn stage(&self, record: &FileRecord, staging: &Path) -> PackResult<()> {
        let source = join_relative(&self.content_root, &record.relative_path);
        let dest = join_relative(staging, &record.relative_path);
        copy_file(&source, &dest)?;

        let sidecar = sidecar_path(&source);
        if sidecar.is_file() {
            copy_file(&sidecar, &sidecar_path(&dest))?;
        }
        tracing::debug!(path = %record.relative_path, "staged");
        Ok(())
    }
}

fn copy_file(source: &Path, dest: &Path) -> PackResult<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PackError::io(parent, e))?;
    }
    std::fs::copy(source, dest).map_err(|e| PackError::io(source, e))?;
    Ok(())
}

/// Join a `/`-separated relative path onto `base`.
fn join_relative(base: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|part| !part.is_empty())
        .fold(base.to_path_buf(), |path, part| path.join(part))
}

/// Zip every file under `staging` into `archive_path`, returning the entry count.
fn write_archive(staging: &Path, archive_path: &Path) -> PackResult<usize> {
    let file = File::create(archive_path).map_err(|e| PackError::io(archive_path, e))?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut count = 0;

    for entry in WalkDir::new(staging).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(staging).to_path_buf();
            PackError::io(&path, io::Error::from(e))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry_name(staging, entry.path());
        zip.start_file(name, options)
            .map_err(|e| PackError::archive(archive_path, e))?;
        let mut source = File::open(entry.path()).map_err(|e| PackError::io(entry.path(), e))?;
        io::copy(&mut source, &mut zip).map_err(|e| PackError::io(archive_path, e))?;
        count += 1;
    }

    let file = zip
        .finish()
        .map_err(|e| PackError::archive(archive_path, e))?;
    file.sync_all().map_err(|e| PackError::io(archive_path, e))?;
    Ok(count)
}

fn entry_name(staging: &Path, path: &Path) -> String {
    path.strip_prefix(staging)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
