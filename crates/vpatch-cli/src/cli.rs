use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use vpatch_types::{BuildTarget, VersionIdentifier, VersionPromotion};

#[derive(Parser)]
#[command(
    name = "vpatch",
    about = "vpatch -- versioned content snapshots and incremental patch builds",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build a base package or patch for a target
    Build(BuildArgs),
    /// Show the version the next build would get
    NextVersion(NextVersionArgs),
    /// Record the content snapshot of a directory
    Snapshot(SnapshotArgs),
    /// Show records added or changed between two snapshot files
    Diff(DiffArgs),
    /// Inspect a PatchInfo.json ledger
    Ledger(LedgerArgs),
}

/// Settings shared by commands that work on the output tree.
#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Configuration file [default: ./vpatch.toml when present]
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Platform to build for (overrides the config)
    #[arg(long)]
    pub target: Option<BuildTarget>,
    /// Root of the versioned output tree (overrides the config)
    #[arg(long)]
    pub output_root: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub layout: LayoutArgs,
    /// Explicit version to build, e.g. 1.2.0
    #[arg(long, conflicts_with = "promote", required_unless_present = "promote")]
    pub version: Option<VersionIdentifier>,
    /// Derive the version from the last build: revision, minor or major
    #[arg(long)]
    pub promote: Option<VersionPromotion>,
    /// CI build number, recorded in the build directory and patch names
    #[arg(long)]
    pub build_number: u32,
    /// Directory with the built content (overrides the config)
    #[arg(long)]
    pub content_root: Option<PathBuf>,
    /// Raw asset records file (overrides the config)
    #[arg(long)]
    pub raw_records: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct NextVersionArgs {
    #[command(flatten)]
    pub layout: LayoutArgs,
    #[arg(long, default_value = "revision")]
    pub promote: VersionPromotion,
}

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    pub content_root: PathBuf,
    /// Write the snapshot to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DiffArgs {
    pub previous: PathBuf,
    pub current: PathBuf,
}

#[derive(Args, Debug)]
pub struct LedgerArgs {
    #[command(subcommand)]
    pub action: LedgerAction,
}

#[derive(Subcommand, Debug)]
pub enum LedgerAction {
    /// Print release lines and their patches
    Show { path: PathBuf },
    /// Check that every release line lists a dense patch sequence
    Verify { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("vpatch").chain(args.iter().copied()))
    }

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn build_with_explicit_version() {
        let cli = parse(&["build", "--target", "Android", "--version", "1.2.3", "--build-number", "42"]).unwrap();
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.layout.target.unwrap().as_str(), "Android");
        assert_eq!(args.version.unwrap().to_string(), "1.2.3");
        assert_eq!(args.build_number, 42);
        assert!(args.promote.is_none());
    }

    #[test]
    fn build_with_promotion_and_overrides() {
        let cli = parse(&[
            "build",
            "--promote",
            "minor",
            "--build-number",
            "7",
            "--content-root",
            "/c",
            "--output-root",
            "/o",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.promote, Some(VersionPromotion::Minor));
        assert_eq!(args.content_root, Some(PathBuf::from("/c")));
        assert_eq!(args.layout.output_root, Some(PathBuf::from("/o")));
    }

    #[test]
    fn build_requires_version_or_promotion() {
        assert!(parse(&["build", "--target", "iOS", "--build-number", "1"]).is_err());
    }

    #[test]
    fn build_rejects_version_and_promotion_together() {
        let result = parse(&[
            "build", "--version", "1.0.0", "--promote", "revision", "--build-number", "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn build_rejects_out_of_range_version() {
        assert!(parse(&["build", "--version", "100.0.0", "--build-number", "1"]).is_err());
    }

    #[test]
    fn build_rejects_path_like_target() {
        let result = parse(&["build", "--target", "../x", "--version", "1.0.0", "--build-number", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn next_version_defaults_to_revision() {
        let cli = parse(&["next-version", "--target", "Win"]).unwrap();
        let Command::NextVersion(args) = cli.command else {
            panic!("expected next-version");
        };
        assert_eq!(args.promote, VersionPromotion::Revision);
    }

    #[test]
    fn snapshot_and_diff() {
        let cli = parse(&["snapshot", "out/content", "-o", "snap.txt", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Snapshot(SnapshotArgs { output: Some(_), .. })));

        let cli = parse(&["diff", "a.txt", "b.txt"]).unwrap();
        assert!(matches!(cli.command, Command::Diff(_)));
    }

    #[test]
    fn ledger_subcommands() {
        let cli = parse(&["ledger", "verify", "PatchInfo.json"]).unwrap();
        let Command::Ledger(args) = cli.command else {
            panic!("expected ledger");
        };
        assert!(matches!(args.action, LedgerAction::Verify { .. }));
    }
}
