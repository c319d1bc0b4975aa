use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// Input validation failed
    #[error("{0}")]
    Validation(String),

    /// Reconciliation run failed
    #[error("{0}")]
    Reconcile(#[from] navmark_recon::ReconcileError),
}

impl CliError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
