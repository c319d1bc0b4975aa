//! Reconciliation of addon-airport manifests into the navigation registry.
//!
//! This crate owns the run lifecycle: validating both inputs, aggregating
//! the manifest set, clearing this tool's previous markings, and applying
//! the fresh record set with a per-record outcome report.

pub mod engine;
pub mod progress;

pub use engine::{
    CheckReport, OutcomeReport, Phase, ReconcileConfig, ReconcileError, ReconcileOutcome,
    check_manifest, reconcile, reset_registry,
};
pub use progress::{ReconcileProgress, SilentProgress};
