use std::path::{Path, PathBuf};

use serde::Serialize;
use vpatch_diff::diff_snapshots;
use vpatch_ledger::{PatchEntry, VersionLedger, LEDGER_FILE_NAME};
use vpatch_pack::{archive_file_name, parse_build_number, patch_name, PatchPackager};
use vpatch_snapshot::{check_conflicts_in_file, ContentSnapshot, HashRecorder};
use vpatch_types::{BuildTarget, FileRecord, VersionIdentifier, VersionPromotion};

use crate::config::BuildConfig;
use crate::error::{BuildError, BuildResult};
use crate::layout::{
    hot_records_file, patch_dir, snapshot_dir, subdirectories, BuildLayout, RAW_RECORDS_FILE,
    TIMESTAMP_FORMAT,
};
use crate::publish::{publish, PublishedPatch};
use crate::version_file::read_last_version;

/// Progress of a single build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildState {
    Init,
    /// The target version was accepted against the ledger.
    Validated,
    /// The content snapshot was written to the build directory.
    SnapshotTaken,
    /// The patch archive was written (skipped for revision 0).
    Packaged,
    /// Ledger, `Diff/` and last-version marker were published.
    Persisted,
    /// A step failed and the build directory was rolled back.
    Failed,
}

/// Outcome of a successful build.
#[derive(Clone, Debug, Serialize)]
pub struct BuildReport {
    pub target: BuildTarget,
    pub version: VersionIdentifier,
    pub build_number: u32,
    pub build_dir: PathBuf,
    /// The published patch; `None` for a base build.
    pub patch: Option<PatchEntry>,
    /// Paths that changed since the previous revision.
    pub changed_files: Vec<String>,
    /// Number of asset path conflicts found in the raw records.
    pub conflicts: usize,
    /// BLAKE3 digest of the recorded snapshot ledger.
    pub snapshot_digest: String,
    /// BLAKE3 digest of the published `PatchInfo.json`.
    pub ledger_digest: String,
    pub state: BuildState,
}

/// Builds versioned snapshots and patches for one configuration.
#[derive(Clone, Debug)]
pub struct PatchBuilder {
    config: BuildConfig,
}

impl PatchBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn layout(&self, target: &BuildTarget) -> BuildLayout {
        BuildLayout::new(&self.config.output_root, target)
    }

    /// Derive the version of the next build of `target` from its last one.
    pub fn resolve_version(
        &self,
        target: &BuildTarget,
        promotion: VersionPromotion,
    ) -> BuildResult<VersionIdentifier> {
        let layout = self.layout(target);
        let last = read_last_version(&layout.last_version_file())?;
        let is_first_build = !layout.has_builds(&VersionIdentifier::INIT)?;
        let next = promotion.apply(last, is_first_build)?;
        tracing::debug!(platform = %target, %last, %promotion, %next, "version resolved");
        Ok(next)
    }

    /// Build `version` of `target`, stamping the build directory with the
    /// current local time.
    pub fn build_patch(
        &self,
        target: &BuildTarget,
        version: VersionIdentifier,
        build_number: u32,
    ) -> BuildResult<BuildReport> {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.build_patch_at(target, version, build_number, &timestamp)
    }

    /// Build `version` of `target` into the build directory named
    /// `{timestamp}({build_number})`.
    ///
    /// On failure everything this build created is removed again: the build
    /// directory, then its revision and release-line directories when no
    /// other build remains in them.
    pub fn build_patch_at(
        &self,
        target: &BuildTarget,
        version: VersionIdentifier,
        build_number: u32,
        timestamp: &str,
    ) -> BuildResult<BuildReport> {
        let layout = self.layout(target);
        let build_dir = layout.build_dir(&version, timestamp, build_number);
        tracing::info!(platform = %target, %version, build_number, "build started");

        let mut run = BuildRun {
            config: &self.config,
            layout,
            target: target.clone(),
            version,
            build_number,
            build_dir,
            state: BuildState::Init,
            created: false,
            ledger: VersionLedger::new(),
            snapshot: ContentSnapshot::new(),
            changed: Vec::new(),
            patch: None,
            archive: None,
            conflicts: 0,
            ledger_digest: String::new(),
        };

        match run.execute() {
            Ok(()) => Ok(run.into_report()),
            Err(e) => {
                run.fail(&e);
                Err(e)
            }
        }
    }
}

/// State of one build attempt.
struct BuildRun<'a> {
    config: &'a BuildConfig,
    layout: BuildLayout,
    target: BuildTarget,
    version: VersionIdentifier,
    build_number: u32,
    build_dir: PathBuf,
    state: BuildState,
    /// Whether this run created `build_dir` and so owns its removal.
    created: bool,
    ledger: VersionLedger,
    snapshot: ContentSnapshot,
    changed: Vec<FileRecord>,
    patch: Option<PatchEntry>,
    archive: Option<PathBuf>,
    conflicts: usize,
    ledger_digest: String,
}

impl BuildRun<'_> {
    fn execute(&mut self) -> BuildResult<()> {
        self.validate()?;
        self.transition(BuildState::Validated);
        self.take_snapshot()?;
        self.transition(BuildState::SnapshotTaken);
        self.package()?;
        self.transition(BuildState::Packaged);
        self.persist()?;
        self.transition(BuildState::Persisted);
        Ok(())
    }

    fn transition(&mut self, state: BuildState) {
        tracing::info!(version = %self.version, from = ?self.state, to = ?state, "build state");
        self.state = state;
    }

    fn validate(&mut self) -> BuildResult<()> {
        if self.build_dir.exists() {
            return Err(BuildError::BuildExists(self.build_dir.clone()));
        }

        self.ledger = match self.layout.latest_persisted_build(&self.version)? {
            Some((persisted, dir)) => {
                tracing::debug!(%persisted, dir = %dir.display(), "loading ledger");
                VersionLedger::load(&snapshot_dir(&dir).join(LEDGER_FILE_NAME))?
            }
            None => VersionLedger::new(),
        };
        self.ledger.validate_and_stage(self.version)?;
        Ok(())
    }

    fn take_snapshot(&mut self) -> BuildResult<()> {
        let snapshot_dir = snapshot_dir(&self.build_dir);
        let patch_dir = patch_dir(&self.build_dir);
        self.created = true;
        for dir in [&snapshot_dir, &patch_dir] {
            std::fs::create_dir_all(dir).map_err(|e| BuildError::io(dir.as_path(), e))?;
        }

        if let Some(raw) = &self.config.raw_records {
            let dest = snapshot_dir.join(RAW_RECORDS_FILE);
            std::fs::copy(raw, &dest).map_err(|e| BuildError::io(raw.as_path(), e))?;
            self.conflicts = check_conflicts_in_file(&dest)?.len();
        }

        self.snapshot = HashRecorder::new(&self.config.content_root).record()?;
        self.snapshot.write_to(&hot_records_file(&self.build_dir))?;
        Ok(())
    }

    fn package(&mut self) -> BuildResult<()> {
        let revision = self.version.revision();
        if revision == 0 {
            tracing::info!(version = %self.version, "base build, no patch");
            return Ok(());
        }

        let previous = self.version.previous_revision();
        let previous_dir = self
            .layout
            .latest_build_dir(&previous)?
            .ok_or(BuildError::MissingPreviousBuild(previous))?;
        let previous_build = previous_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let previous_build = parse_build_number(&previous_build)?;
        let previous_snapshot = ContentSnapshot::read_from(&hot_records_file(&previous_dir))?;
        tracing::debug!(
            previous = %previous_snapshot.digest(),
            current = %self.snapshot.digest(),
            "snapshot digests"
        );

        self.changed = diff_snapshots(&previous_snapshot, &self.snapshot).changed;

        let name = patch_name(revision, previous_build, self.build_number);
        let archive = PatchPackager::new(&self.config.content_root).package(
            &self.changed,
            &patch_dir(&self.build_dir),
            &name,
        )?;
        self.patch = Some(PatchEntry::new(
            archive_file_name(&name),
            archive.md5,
            archive.size,
            revision,
        ));
        self.archive = Some(archive.path);
        Ok(())
    }

    fn persist(&mut self) -> BuildResult<()> {
        if let Some(entry) = &self.patch {
            self.ledger.record_patch(self.version, entry.clone())?;
        }
        let ledger_path = snapshot_dir(&self.build_dir).join(LEDGER_FILE_NAME);
        self.ledger.save(&ledger_path)?;
        self.ledger_digest = self.ledger.digest()?;

        let patch = match (&self.patch, &self.archive) {
            (Some(entry), Some(archive)) => Some(PublishedPatch {
                archive,
                file_name: &entry.patch_name,
            }),
            _ => None,
        };
        publish(&self.layout, &self.version, &ledger_path, patch)
    }

    fn fail(&mut self, error: &BuildError) {
        tracing::error!(version = %self.version, state = ?self.state, %error, "build failed");
        self.state = BuildState::Failed;
        if !self.created {
            return;
        }

        remove_dir(&self.build_dir);
        for dir in [
            self.layout.revision_dir(&self.version),
            self.layout.release_line_dir(&self.version),
        ] {
            match subdirectories(&dir) {
                Ok(children) if children.is_empty() && dir.exists() => remove_dir(&dir),
                Ok(_) => break,
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "rollback could not inspect directory");
                    break;
                }
            }
        }
    }

    fn into_report(self) -> BuildReport {
        tracing::info!(
            platform = %self.target,
            version = %self.version,
            changed = self.changed.len(),
            "build finished"
        );
        BuildReport {
            target: self.target,
            version: self.version,
            build_number: self.build_number,
            build_dir: self.build_dir,
            patch: self.patch,
            changed_files: self
                .changed
                .into_iter()
                .map(|r| r.relative_path)
                .collect(),
            conflicts: self.conflicts,
            snapshot_digest: self.snapshot.digest(),
            ledger_digest: self.ledger_digest,
            state: self.state,
        }
    }
}

fn remove_dir(dir: &Path) {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => tracing::debug!(dir = %dir.display(), "removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "rollback could not remove directory"),
    }
}
