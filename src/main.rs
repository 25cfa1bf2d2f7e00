//! ziplist - manifest-driven ZIP packager.
//!
//! Packs the files selected by a `.ziplist` manifest into `<stem>.zip`.
//! Exit codes: 0 on success, 1 on fatal errors, 2 when rules matched
//! nothing and the run was aborted.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use ziplist::commands::{self, pack, PackOptions};
use ziplist::config::{Config, MissingAction};
use ziplist::resolve::Policy;
use ziplist::PackError;

#[derive(Parser)]
#[command(name = "ziplist")]
#[command(about = "Pack files into a ZIP archive from a .ziplist manifest")]
#[command(
    after_help = "MANIFEST SYNTAX:\n  pattern              add matching files\n  pattern -> dest      add under another archive path\n  !pattern             exclude matching files\n  # comment\n\nENVIRONMENT:\n  ZIPLIST_POLICY, ZIPLIST_ON_MISSING, ZIPLIST_OUTPUT_DIR, ZIPLIST_LOG"
)]
struct Cli {
    /// Path to the .ziplist manifest
    manifest: PathBuf,

    /// Rule precedence policy (default: sequential)
    #[arg(long, value_enum)]
    policy: Option<Policy>,

    /// What to do when a rule matches no files (default: prompt)
    #[arg(long, value_enum)]
    on_missing: Option<MissingAction>,

    /// Source directory (default: the manifest's directory)
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Output archive path (default: <stem>.zip next to the manifest)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Resolve and print the mapping without writing an archive
    #[arg(long)]
    dry_run: bool,

    /// Write the event report as JSON to this file
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    show_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("Error: {:#}", err);
        let code = err
            .downcast_ref::<PackError>()
            .map_or(1, PackError::exit_code);
        std::process::exit(code);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("ZIPLIST_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(&pack::manifest_dir(&cli.manifest))?;
    if let Some(policy) = cli.policy {
        config.policy = policy;
    }
    if let Some(action) = cli.on_missing {
        config.on_missing = action;
    }

    if cli.show_config {
        config.print();
        return Ok(());
    }

    let options = PackOptions {
        manifest: cli.manifest,
        source_dir: cli.source_dir,
        output: cli.output,
        dry_run: cli.dry_run,
        report_json: cli.report_json,
    };
    commands::cmd_pack(&options, &config)?;
    Ok(())
}
