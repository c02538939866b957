use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use vpatch_builder::{
    BuildConfig, BuildReport, PatchBuilder, VersionLedger, VersionPromotion, CONFIG_FILE_NAME,
};
use vpatch_diff::diff_snapshots;
use vpatch_ledger::check_ledger;
use vpatch_snapshot::{ContentSnapshot, HashRecorder};
use vpatch_types::BuildTarget;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Build(args) => cmd_build(args, format),
        Command::NextVersion(args) => cmd_next_version(args, format),
        Command::Snapshot(args) => cmd_snapshot(args, format),
        Command::Diff(args) => cmd_diff(args, format),
        Command::Ledger(args) => match args.action {
            LedgerAction::Show { path } => cmd_ledger_show(&path, format),
            LedgerAction::Verify { path } => cmd_ledger_verify(&path, format),
        },
    }
}

/// Load the configuration and apply command-line overrides.
fn load_config(args: &LayoutArgs) -> anyhow::Result<BuildConfig> {
    let mut config = match &args.config {
        Some(path) => BuildConfig::load(path)?,
        None => BuildConfig::load_or_default(Path::new(CONFIG_FILE_NAME))?,
    };
    if let Some(root) = &args.output_root {
        config.output_root = root.clone();
    }
    if let Some(target) = &args.target {
        config.target = Some(target.clone());
    }
    tracing::debug!(?config, "configuration resolved");
    Ok(config)
}

fn require_target(config: &BuildConfig) -> anyhow::Result<BuildTarget> {
    config
        .target
        .clone()
        .context("no build target: pass --target or set `target` in vpatch.toml")
}

fn cmd_build(args: BuildArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut config = load_config(&args.layout)?;
    if let Some(root) = args.content_root {
        config.content_root = root;
    }
    if let Some(raw) = args.raw_records {
        config.raw_records = Some(raw);
    }
    let target = require_target(&config)?;
    let builder = PatchBuilder::new(config);

    let version = match (args.version, args.promote) {
        (Some(version), _) => version,
        (None, Some(promotion)) => builder.resolve_version(&target, promotion)?,
        (None, None) => builder.resolve_version(&target, VersionPromotion::Revision)?,
    };

    let report = builder
        .build_patch(&target, version, args.build_number)
        .with_context(|| format!("build of {version} for {target} failed"))?;
    print_report(&report, format)
}

fn print_report(report: &BuildReport, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!(
        "{} Built {} for {}",
        "✓".green().bold(),
        report.version.to_string().yellow().bold(),
        report.target.as_str().cyan()
    );
    println!("  Build dir: {}", report.build_dir.display());
    println!("  Snapshot digest: {}", report.snapshot_digest.dimmed());
    println!("  Ledger digest: {}", report.ledger_digest.dimmed());
    match &report.patch {
        Some(patch) => {
            println!(
                "  Patch: {} ({} bytes, md5 {})",
                patch.patch_name.bold(),
                patch.file_size_bytes,
                patch.checksum.dimmed()
            );
            println!("  Changed files: {}", report.changed_files.len());
            for path in &report.changed_files {
                println!("    {}", path.green());
            }
        }
        None => println!("  Base package, no patch"),
    }
    if report.conflicts > 0 {
        println!(
            "  {} {} asset path conflict(s), see log",
            "!".yellow().bold(),
            report.conflicts
        );
    }
    Ok(())
}

fn cmd_next_version(args: NextVersionArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config(&args.layout)?;
    let target = require_target(&config)?;
    let version = PatchBuilder::new(config).resolve_version(&target, args.promote)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "version": version })),
        OutputFormat::Text => println!("{version}"),
    }
    Ok(())
}

fn cmd_snapshot(args: SnapshotArgs, format: OutputFormat) -> anyhow::Result<()> {
    let snapshot = HashRecorder::new(&args.content_root).record()?;
    if let Some(output) = &args.output {
        snapshot.write_to(output)?;
        println!(
            "{} {} records written to {} (digest {})",
            "✓".green().bold(),
            snapshot.len(),
            output.display(),
            snapshot.digest().dimmed()
        );
        return Ok(());
    }
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "digest": snapshot.digest(),
                "records": snapshot.lines(),
            }))?
        ),
        OutputFormat::Text => {
            for line in snapshot.lines() {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn cmd_diff(args: DiffArgs, format: OutputFormat) -> anyhow::Result<()> {
    let previous = ContentSnapshot::read_from(&args.previous)?;
    let current = ContentSnapshot::read_from(&args.current)?;
    let diff = diff_snapshots(&previous, &current);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&diff.lines())?),
        OutputFormat::Text if diff.is_empty() => println!("No changes."),
        OutputFormat::Text => {
            for line in diff.lines() {
                println!("{} {}", "+".green(), line);
            }
        }
    }
    Ok(())
}

fn cmd_ledger_show(path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let ledger = VersionLedger::load(path)?;
    if format == OutputFormat::Json {
        println!("{}", ledger.to_json()?);
        return Ok(());
    }
    if ledger.is_empty() {
        println!("No release lines.");
        return Ok(());
    }
    println!("Digest: {}", ledger.digest()?.dimmed());
    for line in ledger.lines() {
        println!(
            "{}  {} patch(es), {} bytes",
            line.version.to_string().yellow().bold(),
            line.patches.len(),
            line.total_patch_size()
        );
        for patch in &line.patches {
            println!(
                "  r{:<4} {}  {} bytes  {}",
                patch.revision_number,
                patch.patch_name.bold(),
                patch.file_size_bytes,
                patch.checksum.dimmed()
            );
        }
    }
    Ok(())
}

fn cmd_ledger_verify(path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let ledger = VersionLedger::load(path)?;
    let reports = check_ledger(&ledger);
    let invalid = reports.iter().filter(|r| !r.is_valid()).count();

    match format {
        OutputFormat::Json => {
            let lines: Vec<_> = reports
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "version": r.version,
                        "patches": r.patch_count,
                        "violations": r
                            .violations
                            .iter()
                            .map(|v| v.description.as_str())
                            .collect::<Vec<_>>(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&lines)?);
        }
        OutputFormat::Text => {
            for report in &reports {
                if report.is_valid() {
                    println!(
                        "{} {}  {} patch(es), dense",
                        "✓".green().bold(),
                        report.version,
                        report.patch_count
                    );
                } else {
                    println!("{} {}", "✗".red().bold(), report.version);
                    for violation in &report.violations {
                        println!("  {:?}: {}", violation.kind, violation.description);
                    }
                }
            }
        }
    }

    if invalid > 0 {
        anyhow::bail!("{invalid} release line(s) failed verification");
    }
    Ok(())
}
