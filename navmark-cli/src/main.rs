//! navmark CLI
//!
//! Flags add-on linker airports as addon airports in a Little Navmap
//! navigation database.

mod error;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use navmark_manifest::aggregate::{SupplementaryStatus, supplementary_manifest_path};
use navmark_recon::{
    CheckReport, OutcomeReport, ReconcileConfig, ReconcileError, ReconcileProgress,
    check_manifest, reconcile, reset_registry,
};

use error::CliError;

#[derive(Parser)]
#[command(name = "navmark")]
#[command(
    about = "Mark add-on linker airports as addon airports in a Little Navmap database",
    long_about = None
)]
struct Cli {
    /// Path to the add-on linker manifest (defaults to the linker's data directory)
    #[arg(short, long, global = true)]
    manifest: Option<PathBuf>,

    /// Path to the Little Navmap SQLite database
    #[arg(short, long, global = true)]
    registry: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate inputs, clear previous markings, and apply the manifest
    Run {
        /// Do not look for the user companion manifest
        #[arg(long)]
        no_supplement: bool,
    },

    /// Validate both inputs without touching the registry
    Check,

    /// Clear every marking previously written by this tool
    Reset {
        /// Actually perform the reset
        #[arg(long)]
        confirm: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    let manifest = cli.manifest.unwrap_or_else(default_manifest_path);
    let registry = cli.registry.unwrap_or_else(default_registry_path);

    let result = match cli.command {
        Commands::Run { no_supplement } => run_reconcile(manifest, registry, no_supplement),
        Commands::Check => run_check(&manifest, &registry),
        Commands::Reset { confirm } => run_reset(&registry, confirm),
    };

    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(1);
    }
}

/// Default location of the add-on linker's exported airport list.
fn default_manifest_path() -> PathBuf {
    let base = std::env::var_os("PROGRAMDATA")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(r"C:\ProgramData"));
    base.join("MSFS Addons Linker 2024")
        .join("Data")
        .join("Addons_ICAO.bin")
}

/// Default location of the Little Navmap MSFS 2024 database.
fn default_registry_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ABarthel")
        .join("little_navmap_db")
        .join("little_navmap_msfs24.sqlite")
}

/// Run the `run` command: full validate → reset → apply cycle.
fn run_reconcile(
    manifest: PathBuf,
    registry: PathBuf,
    no_supplement: bool,
) -> Result<(), CliError> {
    println!("Manifest: {}", manifest.display());
    println!("Registry: {}", registry.display());
    println!();

    let supplementary = (!no_supplement).then(|| supplementary_manifest_path(&manifest));
    let config = ReconcileConfig {
        primary_manifest: manifest,
        supplementary_manifest: supplementary,
        registry_path: registry,
    };

    let outcome = match reconcile(&config, Some(&ConsoleProgress)) {
        Ok(outcome) => outcome,
        Err(ReconcileError::Validation { .. }) => {
            // Per-input diagnostics were already printed by ConsoleProgress.
            return Err(CliError::validation("one or more input checks failed"));
        }
        Err(e) => return Err(e.into()),
    };

    match &outcome.supplementary {
        SupplementaryStatus::Loaded { path, records } => {
            println!(
                "Supplementary manifest: {} ({} records)",
                path.display(),
                records
            );
        }
        SupplementaryStatus::Skipped { path, reason } => {
            log::warn!("Supplementary manifest {} skipped: {reason}", path.display());
        }
        SupplementaryStatus::Absent => {}
    }

    println!();
    println!(
        "{}",
        "Reconciliation complete".if_supports_color(Stdout, |t| t.bold()),
    );
    println!("  Records applied:  {:>6}", outcome.report.total_records);
    println!("  Rows cleared:     {:>6}", outcome.cleared);
    println!("  Rows updated:     {:>6}", outcome.report.updated_count);
    println!(
        "  Unmatched idents: {:>6}",
        outcome.report.unmatched_idents.len()
    );

    if !outcome.report.unmatched_idents.is_empty() {
        println!();
        println!("Not present in the registry:");
        for ident in &outcome.report.unmatched_idents {
            println!("  {}", ident.if_supports_color(Stdout, |t| t.yellow()));
        }
    }

    Ok(())
}

/// Run the `check` command: validate both inputs, mutate nothing.
fn run_check(manifest: &Path, registry: &Path) -> Result<(), CliError> {
    let manifest_check = check_manifest(manifest);
    let registry_check: CheckReport = navmark_db::check_registry(registry).into();

    print_check("Manifest", &manifest_check);
    print_check("Registry", &registry_check);

    if manifest_check.valid && registry_check.valid {
        Ok(())
    } else {
        Err(CliError::validation("one or more input checks failed"))
    }
}

/// Run the `reset` command: sentinel-scoped clear, gated behind --confirm.
fn run_reset(registry: &Path, confirm: bool) -> Result<(), CliError> {
    if !confirm {
        log::warn!(
            "This will clear every addon marking navmark has written to:\n  {}",
            registry.display(),
        );
        log::info!("Re-run with --confirm to proceed:");
        log::info!("  navmark reset --confirm");
        return Ok(());
    }

    let check = navmark_db::check_registry(registry);
    if !check.valid {
        return Err(CliError::validation(check.diagnostic));
    }

    let cleared = reset_registry(registry)?;
    println!(
        "{}",
        "Registry reset.".if_supports_color(Stdout, |t| t.bold()),
    );
    println!("  Rows cleared: {cleared}");
    Ok(())
}

fn print_check(label: &str, check: &CheckReport) {
    if check.valid {
        println!("{label} check: {}", check.diagnostic);
    } else {
        println!(
            "{label} check: {}",
            check.diagnostic.if_supports_color(Stdout, |t| t.red()),
        );
    }
}

/// Console projection of engine progress.
struct ConsoleProgress;

impl ReconcileProgress for ConsoleProgress {
    fn on_validated(&self, manifest: &CheckReport, registry: &CheckReport) {
        print_check("Manifest", manifest);
        print_check("Registry", registry);
        println!();
    }

    fn on_reset(&self, cleared: u64) {
        println!("Cleared {cleared} previously marked airports.");
    }

    fn on_record(&self, _current: usize, _total: usize, ident: &str, rows: u64) {
        if rows == 0 {
            log::debug!("no registry match for {ident}");
        }
    }

    fn on_complete(&self, _report: &OutcomeReport) {}
}
