//! Presentation of reconciliation results.

use crate::error::ReportError;
use crate::state::{ReconcileSummary, Verdict};
use async_trait::async_trait;
use tracing::{info, warn};

/// Receives the summary of a finished attempt, typically to post a
/// notification. Delivery is fire-and-forget: errors are logged and never
/// change the reconciliation result.
#[async_trait]
pub trait ReconcileReporter: Send + Sync {
    async fn report(&self, summary: &ReconcileSummary) -> Result<(), ReportError>;
}

/// Reporter that writes the summary to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

#[async_trait]
impl ReconcileReporter for LogReporter {
    async fn report(&self, summary: &ReconcileSummary) -> Result<(), ReportError> {
        match summary.verdict() {
            Verdict::Success | Verdict::Nothing => info!(
                succeeded = summary.succeeded,
                already_current = summary.already_current,
                skipped = summary.skipped,
                "carrier config restored after boot"
            ),
            Verdict::Failure | Verdict::Mixed => warn!(
                ok = summary.ok(),
                failed = summary.failed,
                "carrier config restore incomplete"
            ),
        }
        Ok(())
    }
}
