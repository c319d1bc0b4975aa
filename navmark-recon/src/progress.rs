//! Progress callbacks for reconciliation runs.

use crate::engine::{CheckReport, OutcomeReport};

/// Callbacks invoked as a run advances.
///
/// Presentation only — the engine's results are carried by the returned
/// outcome, and implementations must not assume a callback per phase on
/// failed runs.
pub trait ReconcileProgress {
    fn on_validated(&self, manifest: &CheckReport, registry: &CheckReport);
    fn on_reset(&self, cleared: u64);
    /// `rows` is the number of registry rows the record updated (zero for
    /// an unmatched identifier).
    fn on_record(&self, current: usize, total: usize, ident: &str, rows: u64);
    fn on_complete(&self, report: &OutcomeReport);
}

/// Silent progress — no output.
pub struct SilentProgress;

impl ReconcileProgress for SilentProgress {
    fn on_validated(&self, _: &CheckReport, _: &CheckReport) {}
    fn on_reset(&self, _: u64) {}
    fn on_record(&self, _: usize, _: usize, _: &str, _: u64) {}
    fn on_complete(&self, _: &OutcomeReport) {}
}
