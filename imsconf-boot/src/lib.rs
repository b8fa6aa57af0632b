//! Boot-time reconciliation for imsconf.
//!
//! Carrier config overrides written by this project do not survive a reboot.
//! On every boot the saved configuration of each active subscription is
//! re-applied once the privilege broker is reachable.
//!
//! ## Attempt lifecycle
//!
//! 1. **WaitingForBroker**: poll broker readiness (1 s interval, 60 s ceiling)
//! 2. **Applying**: for each active subscription, load, compile, guard, apply
//! 3. **Done** with a [`ReconcileSummary`], or **TimedOut** if the broker
//!    never came up
//!
//! # Example
//!
//! ```no_run
//! use imsconf_boot::{BootReconciler, LogReporter, ReconcileConfig};
//! use imsconf_carrier::ApplyPipeline;
//! use std::sync::Arc;
//!
//! async fn on_boot(pipeline: Arc<ApplyPipeline>) {
//!     let reconciler = BootReconciler::new(pipeline, ReconcileConfig::default())
//!         .with_reporter(Arc::new(LogReporter));
//!     let attempt = reconciler.on_boot_completed();
//!     let _ = attempt.wait().await;
//! }
//! ```

mod error;
mod reconciler;
mod report;
mod state;

pub use error::{BootError, ReportError};
pub use reconciler::{AttemptHandle, BootReconciler, ReconcileConfig};
pub use report::{LogReporter, ReconcileReporter};
pub use state::{AttemptState, ReconcileOutcome, ReconcileSummary, SubscriptionFailure, Verdict};
