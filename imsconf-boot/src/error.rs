//! Error types for boot reconciliation.

use thiserror::Error;

/// Errors surfaced by a reconciliation attempt handle.
#[derive(Debug, Error)]
pub enum BootError {
    /// The attempt task panicked outside the per-subscription isolation.
    #[error("reconciliation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Failure reported by a [`crate::ReconcileReporter`].
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("presentation failed: {0}")]
    Presentation(String),
}
