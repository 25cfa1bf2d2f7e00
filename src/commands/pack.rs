//! Pack command - resolves a manifest and writes the archive.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use super::prompt;
use crate::archive::{self, ArchiveSummary};
use crate::config::{Config, MissingAction};
use crate::error::PackError;
use crate::manifest;
use crate::report::{Event, Report};
use crate::resolve::{self, Resolution, ResolvedEntry};
use crate::scan::DirTree;
use crate::timing::{PhaseTime, Timer};

/// Inputs of one pack run that do not come from [`Config`].
#[derive(Debug, Clone, Default)]
pub struct PackOptions {
    /// Path to the `.ziplist` manifest.
    pub manifest: PathBuf,
    /// Source root (default: the manifest's directory).
    pub source_dir: Option<PathBuf>,
    /// Archive path (default: `<stem>.zip` next to the manifest).
    pub output: Option<PathBuf>,
    /// Resolve and print the mapping without writing.
    pub dry_run: bool,
    /// Write the event report as JSON here.
    pub report_json: Option<PathBuf>,
}

/// Result of a pack run.
#[derive(Debug)]
pub struct PackOutcome {
    pub resolution: Resolution,
    pub output: PathBuf,
    /// `None` for dry runs and empty mappings.
    pub archive: Option<ArchiveSummary>,
    /// Resolve and write durations, in run order.
    pub timings: Vec<PhaseTime>,
}

/// Execute the pack command.
pub fn cmd_pack(options: &PackOptions, config: &Config) -> Result<PackOutcome> {
    let source_dir = options
        .source_dir
        .clone()
        .unwrap_or_else(|| manifest_dir(&options.manifest));
    let output = output_path(&options.manifest, options.output.as_deref(), config);

    println!("=== Packing {} ===", options.manifest.display());
    println!("  Source: {}", source_dir.display());
    println!("  Output: {}", output.display());
    println!("  Policy: {}\n", config.policy);

    let rules = manifest::load(&options.manifest)?;
    let tree = DirTree::new(&source_dir)?;

    let mut timings = Vec::new();
    let timer = Timer::start("Resolve");
    let mut resolution = resolve::resolve(&rules, &tree, config.policy)?;
    timings.push(timer.finish());

    skip_output_archive(&mut resolution, &output);

    print_trace(&resolution.report);

    if let Some(path) = &options.report_json {
        write_report(path, &resolution.report)?;
    }

    if resolution.report.has_missing_rules() {
        handle_missing(&resolution.report, config.on_missing)?;
    }

    let archive = if options.dry_run {
        print_mapping(&resolution.entries);
        None
    } else if resolution.is_empty() {
        println!("\nNothing to pack, no archive written.");
        None
    } else {
        let timer = Timer::start("Write archive");
        let summary = archive::write_archive(&resolution.entries, &output)?;
        timings.push(timer.finish());
        Some(summary)
    };

    println!();
    resolution.report.print();
    if resolution.report.duplicate_count() > 0 {
        println!("Hint: several sources mapped to the same archive path and the later one won.");
        println!("      Give them distinct destinations with '->' if both are needed.");
    }
    if let Some(summary) = &archive {
        println!(
            "\n✓ Packed {} file(s) into {} ({} bytes)",
            summary.files,
            summary.path.display(),
            summary.size
        );
    }

    Ok(PackOutcome {
        resolution,
        output,
        archive,
        timings,
    })
}

/// Directory a manifest lives in; `.` for a bare file name.
pub fn manifest_dir(manifest: &Path) -> PathBuf {
    match manifest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Archive path: explicit `output`, else `<stem>.zip` in the configured
/// output directory or next to the manifest.
pub fn output_path(manifest: &Path, output: Option<&Path>, config: &Config) -> PathBuf {
    if let Some(output) = output {
        return output.to_path_buf();
    }

    let mut name = manifest
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("archive"));
    name.push(".zip");

    config
        .output_dir
        .clone()
        .unwrap_or_else(|| manifest_dir(manifest))
        .join(name)
}

/// Drop a previous output archive that the rules picked up from the source
/// tree. Paths are compared after canonicalization.
fn skip_output_archive(resolution: &mut Resolution, output: &Path) {
    let Some(target) = canonical_output(output) else {
        return;
    };

    let Resolution { entries, report } = resolution;
    entries.retain(|entry| {
        let is_output = entry.source.file_name() == target.file_name()
            && fs::canonicalize(&entry.source).is_ok_and(|source| source == target);
        if is_output {
            tracing::warn!(rel = %entry.rel, path = %target.display(), "skipping the output archive itself");
            report.push(Event::OutputSkipped {
                path: entry.rel.clone(),
                arcname: entry.arcname.clone(),
            });
        }
        !is_output
    });
}

/// Canonical output path, or `None` while its directory does not exist yet.
fn canonical_output(output: &Path) -> Option<PathBuf> {
    let name = output.file_name()?;
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::canonicalize(dir).ok().map(|dir| dir.join(name))
}

fn handle_missing(report: &Report, action: MissingAction) -> Result<()> {
    let missing = report.missing_rules();
    let proceed = match action {
        MissingAction::Continue => true,
        MissingAction::Abort => false,
        MissingAction::Prompt => prompt::confirm_missing(&missing)?,
    };

    if !proceed {
        return Err(PackError::RuleMatchedNothing {
            patterns: missing.iter().map(|s| s.to_string()).collect(),
        }
        .into());
    }
    println!("Continuing without {} missing rule(s).", missing.len());
    Ok(())
}

/// Per-rule console trace. Entry lines are buffered until the rule's
/// closing event so they print under their rule header.
fn print_trace(report: &Report) {
    let mut pending = Vec::new();
    for event in &report.events {
        match event {
            Event::EntryAdded { path, arcname, .. } => {
                pending.push(format!("  [add] '{}' -> '{}'", path, arcname));
            }
            Event::EntryExcluded { path, .. } => {
                pending.push(format!("  [skip] '{}'", path));
            }
            Event::RuleApplied { rule, .. } => {
                println!("rule: '{}'", rule);
                for line in pending.drain(..) {
                    println!("{}", line);
                }
            }
            Event::RuleMatchedNothing { rule, .. } => {
                println!("rule: '{}'", rule);
                println!("  MISSING: no files matched");
                pending.clear();
            }
            Event::DuplicateArcname { .. } | Event::OutputSkipped { .. } => {}
        }
    }
}

fn print_mapping(entries: &[ResolvedEntry]) {
    println!("\nDry run, {} file(s) would be packed:", entries.len());
    for entry in entries {
        println!("  '{}' -> '{}'", entry.rel, entry.arcname);
    }
}

fn write_report(path: &Path, report: &Report) -> Result<()> {
    let json = report.to_json().context("Failed to serialize report")?;
    fs::write(path, json).with_context(|| format!("Failed to write report {}", path.display()))?;
    tracing::info!(path = %path.display(), "report written");
    Ok(())
}
