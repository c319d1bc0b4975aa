//! Reset-then-apply reconciliation of manifest records into the registry.
//!
//! A run moves through validate, reset, and apply. Validation failures
//! short-circuit before any mutation; the reset and apply phases each open
//! their own connection and commit once at the end of the phase, so a
//! failure mid-phase leaves the registry at the prior phase's committed
//! state.

use std::fmt;
use std::path::{Path, PathBuf};

use navmark_db::{operations, schema, validate};
use navmark_manifest::aggregate::{self, SupplementaryStatus};
use navmark_manifest::encoding::{self, DEFAULT_CANDIDATES};
use navmark_manifest::parser::AddonRecord;
use thiserror::Error;

use crate::progress::ReconcileProgress;

/// Inputs for one reconciliation run.
///
/// Path defaults and environment lookups belong to the caller; the engine
/// only ever sees explicit paths.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    pub primary_manifest: PathBuf,
    /// Companion manifest; `None` skips the lookup entirely.
    pub supplementary_manifest: Option<PathBuf>,
    pub registry_path: PathBuf,
}

/// Mutating phase in which a registry failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Reset,
    Apply,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Reset => write!(f, "reset"),
            Phase::Apply => write!(f, "apply"),
        }
    }
}

/// Human-readable verdict for one validated input.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub valid: bool,
    pub diagnostic: String,
}

impl CheckReport {
    fn ok(diagnostic: impl Into<String>) -> Self {
        Self {
            valid: true,
            diagnostic: diagnostic.into(),
        }
    }

    fn fail(diagnostic: impl Into<String>) -> Self {
        Self {
            valid: false,
            diagnostic: diagnostic.into(),
        }
    }
}

impl From<validate::RegistryCheck> for CheckReport {
    fn from(check: validate::RegistryCheck) -> Self {
        Self {
            valid: check.valid,
            diagnostic: check.diagnostic,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// One or both inputs failed validation; nothing was mutated.
    #[error("input validation failed")]
    Validation {
        manifest: CheckReport,
        registry: CheckReport,
    },

    #[error("manifest error: {0}")]
    Manifest(#[from] aggregate::AggregateError),

    #[error("cannot open registry for {phase}: {source}")]
    RegistryOpen {
        phase: Phase,
        #[source]
        source: schema::SchemaError,
    },

    #[error("registry write failed during {phase}: {source}")]
    RegistryWrite {
        phase: Phase,
        #[source]
        source: operations::OperationError,
    },
}

/// Per-record results of the apply phase.
#[derive(Debug, Default)]
pub struct OutcomeReport {
    /// Records consumed, primary plus supplementary.
    pub total_records: usize,
    /// Rows actually updated; may exceed `total_records` when an identifier
    /// matches several rows.
    pub updated_count: u64,
    /// Identifiers with no registry match, in encounter order.
    pub unmatched_idents: Vec<String>,
}

/// Everything a caller needs to present one completed run.
#[derive(Debug)]
pub struct ReconcileOutcome {
    pub manifest_check: CheckReport,
    pub registry_check: CheckReport,
    /// Rows un-marked by the reset phase.
    pub cleared: u64,
    /// Records contributed by the primary manifest.
    pub primary_records: usize,
    pub supplementary: SupplementaryStatus,
    pub report: OutcomeReport,
}

/// Probe the primary manifest: it must exist, be non-empty, and decode
/// under one of the candidate encodings.
pub fn check_manifest(path: &Path) -> CheckReport {
    if !path.is_file() {
        return CheckReport::fail(format!("manifest file does not exist at: {}", path.display()));
    }

    match std::fs::metadata(path) {
        Ok(meta) if meta.len() == 0 => {
            return CheckReport::fail(format!("manifest file is empty: {}", path.display()));
        }
        Ok(_) => {}
        Err(e) => {
            return CheckReport::fail(format!(
                "cannot read manifest file {}: {e}",
                path.display()
            ));
        }
    }

    match encoding::resolve_encoding(path, DEFAULT_CANDIDATES) {
        Ok(enc) => CheckReport::ok(format!("manifest file is valid ({} text)", enc.name())),
        Err(e) => CheckReport::fail(e.to_string()),
    }
}

/// Run a full reconciliation: validate both inputs, aggregate the manifest
/// set, clear this tool's previous markings, and apply the fresh records.
///
/// Re-running with an unchanged manifest reproduces the same registry
/// state: the reset phase drops exactly the markings the previous apply
/// phase stamped, so airports removed from the manifest do not linger.
pub fn reconcile(
    config: &ReconcileConfig,
    progress: Option<&dyn ReconcileProgress>,
) -> Result<ReconcileOutcome, ReconcileError> {
    let manifest_check = check_manifest(&config.primary_manifest);
    let registry_check: CheckReport = validate::check_registry(&config.registry_path).into();
    if let Some(p) = progress {
        p.on_validated(&manifest_check, &registry_check);
    }
    if !(manifest_check.valid && registry_check.valid) {
        return Err(ReconcileError::Validation {
            manifest: manifest_check,
            registry: registry_check,
        });
    }

    let aggregated = aggregate::aggregate(
        &config.primary_manifest,
        config.supplementary_manifest.as_deref(),
        DEFAULT_CANDIDATES,
    )?;

    let cleared = reset_registry(&config.registry_path)?;
    if let Some(p) = progress {
        p.on_reset(cleared);
    }

    let report = apply_records(&config.registry_path, &aggregated.records, progress)?;
    if let Some(p) = progress {
        p.on_complete(&report);
    }

    Ok(ReconcileOutcome {
        manifest_check,
        registry_check,
        cleared,
        primary_records: aggregated.primary_records,
        supplementary: aggregated.supplementary,
        report,
    })
}

/// Clear every marking previously written by this tool. Idempotent.
///
/// Also usable standalone, without an apply phase to follow.
pub fn reset_registry(registry_path: &Path) -> Result<u64, ReconcileError> {
    let conn = open_for(Phase::Reset, registry_path)?;
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| write_err(Phase::Reset, e))?;
    let cleared =
        operations::clear_marked(&tx).map_err(|e| ReconcileError::RegistryWrite {
            phase: Phase::Reset,
            source: e,
        })?;
    tx.commit().map_err(|e| write_err(Phase::Reset, e))?;
    log::debug!("reset cleared {cleared} previously marked rows");
    Ok(cleared)
}

/// Apply the aggregated records in order, folding per-record match results
/// into an [`OutcomeReport`]. Committed once after the full pass.
fn apply_records(
    registry_path: &Path,
    records: &[AddonRecord],
    progress: Option<&dyn ReconcileProgress>,
) -> Result<OutcomeReport, ReconcileError> {
    let conn = open_for(Phase::Apply, registry_path)?;
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| write_err(Phase::Apply, e))?;

    let total = records.len();
    let mut report = OutcomeReport {
        total_records: total,
        ..Default::default()
    };

    for (i, record) in records.iter().enumerate() {
        let changed = operations::mark_addon(&tx, &record.ident, &record.scenery_path).map_err(
            |e| ReconcileError::RegistryWrite {
                phase: Phase::Apply,
                source: e,
            },
        )?;
        if changed == 0 {
            report.unmatched_idents.push(record.ident.clone());
        } else {
            report.updated_count += changed;
        }
        if let Some(p) = progress {
            p.on_record(i + 1, total, &record.ident, changed);
        }
    }

    tx.commit().map_err(|e| write_err(Phase::Apply, e))?;
    Ok(report)
}

fn open_for(phase: Phase, path: &Path) -> Result<rusqlite::Connection, ReconcileError> {
    schema::open_registry(path).map_err(|e| ReconcileError::RegistryOpen { phase, source: e })
}

fn write_err(phase: Phase, e: rusqlite::Error) -> ReconcileError {
    ReconcileError::RegistryWrite {
        phase,
        source: e.into(),
    }
}
