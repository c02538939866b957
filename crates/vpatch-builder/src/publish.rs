//! Publishing a persisted build to `Diff/` and `LastBuildVersion.txt`.
//!
//! Every fallible write goes to `Diff.staging/` and a temporary marker file
//! first. Committing renames the current `Diff/` aside, renames the staging
//! directory into its place, then moves the marker in. When the marker
//! cannot be moved the previous `Diff/` is renamed back, so a failed build
//! never leaves a ledger or patch on disk that points at a removed build.

use std::path::Path;

use vpatch_ledger::LEDGER_FILE_NAME;
use vpatch_types::VersionIdentifier;

use crate::error::{BuildError, BuildResult};
use crate::layout::BuildLayout;
use crate::version_file::{stage_last_version, PendingVersion};

/// A patch archive to publish, with the file name it is listed under.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PublishedPatch<'a> {
    pub archive: &'a Path,
    pub file_name: &'a str,
}

/// Publish `ledger` (and `patch`, if any) as the current state of the
/// target and record `version` as its last build.
pub(crate) fn publish(
    layout: &BuildLayout,
    version: &VersionIdentifier,
    ledger: &Path,
    patch: Option<PublishedPatch<'_>>,
) -> BuildResult<()> {
    recover_interrupted(layout)?;

    let staging = layout.diff_staging_dir();
    let marker = match prepare(layout, &staging, version, ledger, patch) {
        Ok(marker) => marker,
        Err(e) => {
            remove_quietly(&staging);
            return Err(e);
        }
    };

    let diff = layout.diff_dir();
    let backup = layout.diff_backup_dir();
    let had_previous = diff.exists();
    if had_previous {
        if let Err(e) = std::fs::rename(&diff, &backup) {
            remove_quietly(&staging);
            return Err(BuildError::io(&diff, e));
        }
    }
    if let Err(e) = std::fs::rename(&staging, &diff) {
        remove_quietly(&staging);
        if had_previous {
            restore(&backup, &diff);
        }
        return Err(BuildError::io(&diff, e));
    }

    if let Err(e) = marker.commit() {
        remove_quietly(&diff);
        if had_previous {
            restore(&backup, &diff);
        }
        return Err(e);
    }

    if had_previous {
        remove_quietly(&backup);
    }
    tracing::debug!(%version, diff = %diff.display(), "build published");
    Ok(())
}

/// Write the staging directory and the pending marker.
fn prepare(
    layout: &BuildLayout,
    staging: &Path,
    version: &VersionIdentifier,
    ledger: &Path,
    patch: Option<PublishedPatch<'_>>,
) -> BuildResult<PendingVersion> {
    std::fs::create_dir_all(staging).map_err(|e| BuildError::io(staging, e))?;
    let dest = staging.join(LEDGER_FILE_NAME);
    std::fs::copy(ledger, &dest).map_err(|e| BuildError::io(&dest, e))?;

    if let Some(patch) = patch {
        let dir = staging.join(version.base().to_string());
        std::fs::create_dir_all(&dir).map_err(|e| BuildError::io(&dir, e))?;
        let dest = dir.join(patch.file_name);
        std::fs::copy(patch.archive, &dest).map_err(|e| BuildError::io(&dest, e))?;
    }

    stage_last_version(&layout.last_version_file(), version)
}

/// Undo what an interrupted publish left behind: a stale staging directory,
/// or a `Diff/` that was renamed aside and never replaced.
fn recover_interrupted(layout: &BuildLayout) -> BuildResult<()> {
    let staging = layout.diff_staging_dir();
    if staging.exists() {
        tracing::warn!(dir = %staging.display(), "discarding stale diff staging");
        std::fs::remove_dir_all(&staging).map_err(|e| BuildError::io(&staging, e))?;
    }

    let backup = layout.diff_backup_dir();
    if !backup.exists() {
        return Ok(());
    }
    let diff = layout.diff_dir();
    if diff.exists() {
        std::fs::remove_dir_all(&backup).map_err(|e| BuildError::io(&backup, e))?;
    } else {
        tracing::warn!(dir = %backup.display(), "restoring diff from interrupted publish");
        std::fs::rename(&backup, &diff).map_err(|e| BuildError::io(&diff, e))?;
    }
    Ok(())
}

fn restore(backup: &Path, diff: &Path) {
    if let Err(e) = std::fs::rename(backup, diff) {
        tracing::error!(
            backup = %backup.display(),
            error = %e,
            "could not restore previous diff, it is kept at the backup path"
        );
    }
}

fn remove_quietly(dir: &Path) {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "could not remove directory"),
    }
}
