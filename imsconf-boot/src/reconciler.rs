//! Boot reconciliation orchestrator.
//!
//! After boot the privilege broker may take a while to come up. An attempt
//! polls it until ready (or gives up), then re-applies the saved
//! configuration of every active subscription, one at a time.
//!
//! Only one attempt runs at a time: a new boot signal cancels the previous
//! attempt before spawning its own. Cancellation is cooperative and takes
//! effect at the next poll wake-up or between two subscriptions.

use crate::error::BootError;
use crate::report::ReconcileReporter;
use crate::state::{AttemptState, ReconcileOutcome, ReconcileSummary};
use imsconf_carrier::{ApplyPipeline, ApplyStatus, PrivilegeBroker};
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Configuration for boot reconciliation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Delay between two broker readiness checks (ms).
    pub poll_interval_ms: u64,
    /// How long to wait for the broker before giving up (ms).
    pub broker_wait_ms: u64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            broker_wait_ms: 60_000,
        }
    }
}

impl ReconcileConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn broker_wait(&self) -> Duration {
        Duration::from_millis(self.broker_wait_ms)
    }
}

/// Handle to a spawned attempt.
pub struct AttemptHandle {
    state: watch::Receiver<AttemptState>,
    task: JoinHandle<ReconcileOutcome>,
}

impl AttemptHandle {
    /// The attempt's current state.
    pub fn state(&self) -> AttemptState {
        *self.state.borrow()
    }

    /// Subscribes to state changes.
    pub fn watch_state(&self) -> watch::Receiver<AttemptState> {
        self.state.clone()
    }

    /// Waits for the attempt to finish.
    pub async fn wait(self) -> Result<ReconcileOutcome, BootError> {
        Ok(self.task.await?)
    }
}

/// The in-flight attempt, as seen by the reconciler.
struct ActiveAttempt {
    cancel: watch::Sender<bool>,
    state: watch::Receiver<AttemptState>,
}

/// Runs reconciliation attempts on boot signals.
pub struct BootReconciler {
    pipeline: Arc<ApplyPipeline>,
    reporter: Option<Arc<dyn ReconcileReporter>>,
    config: ReconcileConfig,
    current: Mutex<Option<ActiveAttempt>>,
    /// Held across each subscription's apply, attempts included.
    apply_lock: Arc<tokio::sync::Mutex<()>>,
}

impl BootReconciler {
    pub fn new(pipeline: Arc<ApplyPipeline>, config: ReconcileConfig) -> Self {
        Self {
            pipeline,
            reporter: None,
            config,
            current: Mutex::new(None),
            apply_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Sets where finished attempts are reported.
    pub fn with_reporter(mut self, reporter: Arc<dyn ReconcileReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// State of the latest attempt, if one was ever started.
    pub fn current_state(&self) -> Option<AttemptState> {
        let current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        current.as_ref().map(|a| *a.state.borrow())
    }

    /// Handles a boot-completed signal: cancels any in-flight attempt and
    /// spawns a new one. Must be called from within a Tokio runtime.
    pub fn on_boot_completed(&self) -> AttemptHandle {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = current.take() {
            if !previous.state.borrow().is_terminal() {
                info!("cancelling previous reconciliation attempt");
            }
            previous.cancel.send_replace(true);
        }

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(AttemptState::WaitingForBroker);
        let task = tokio::spawn(run_attempt(
            self.pipeline.clone(),
            self.reporter.clone(),
            self.config.clone(),
            self.apply_lock.clone(),
            cancel_rx,
            state_tx,
        ));
        *current = Some(ActiveAttempt {
            cancel: cancel_tx,
            state: state_rx.clone(),
        });
        AttemptHandle {
            state: state_rx,
            task,
        }
    }
}

enum BrokerWait {
    Ready,
    TimedOut,
    Cancelled,
}

async fn run_attempt(
    pipeline: Arc<ApplyPipeline>,
    reporter: Option<Arc<dyn ReconcileReporter>>,
    config: ReconcileConfig,
    apply_lock: Arc<tokio::sync::Mutex<()>>,
    mut cancel: watch::Receiver<bool>,
    state: watch::Sender<AttemptState>,
) -> ReconcileOutcome {
    let outcome = match wait_for_broker(pipeline.broker().clone(), &config, &mut cancel).await {
        BrokerWait::Ready => {
            state.send_replace(AttemptState::Applying);
            match apply_all(&pipeline, &apply_lock, &cancel).await {
                Some(summary) => ReconcileOutcome::Done(summary),
                None => ReconcileOutcome::Cancelled,
            }
        }
        BrokerWait::TimedOut => {
            warn!(
                waited_ms = config.broker_wait_ms,
                "privilege broker not ready, giving up"
            );
            ReconcileOutcome::TimedOut
        }
        BrokerWait::Cancelled => ReconcileOutcome::Cancelled,
    };

    if let ReconcileOutcome::Done(summary) = &outcome {
        if summary.ok() + summary.failed > 0 || summary.enumeration_error.is_some() {
            if let Some(reporter) = reporter {
                spawn_report(reporter, summary.clone());
            }
        }
    }
    state.send_replace(outcome.state());
    debug!(state = ?outcome.state(), "reconciliation attempt finished");
    outcome
}

/// Polls broker readiness every `poll_interval` until ready, cancelled, or
/// `broker_wait` has elapsed. Each check is a blocking IPC round trip.
async fn wait_for_broker(
    broker: Arc<dyn PrivilegeBroker>,
    config: &ReconcileConfig,
    cancel: &mut watch::Receiver<bool>,
) -> BrokerWait {
    let deadline = Instant::now() + config.broker_wait();
    loop {
        if *cancel.borrow_and_update() {
            return BrokerWait::Cancelled;
        }
        let check = broker.clone();
        let ready = match tokio::task::spawn_blocking(move || check.is_ready()).await {
            Ok(ready) => ready,
            Err(e) => {
                warn!(error = %e, "broker readiness check panicked");
                false
            }
        };
        if ready {
            debug!("privilege broker ready");
            return BrokerWait::Ready;
        }
        if Instant::now() >= deadline {
            return BrokerWait::TimedOut;
        }
        tokio::select! {
            _ = tokio::time::sleep(config.poll_interval()) => {}
            changed = cancel.changed() => {
                // Reconciler dropped: nobody can observe this attempt anymore.
                if changed.is_err() {
                    return BrokerWait::Cancelled;
                }
            }
        }
    }
}

/// Re-applies every active subscription's saved configuration in order.
/// Returns `None` if cancelled between subscriptions.
async fn apply_all(
    pipeline: &Arc<ApplyPipeline>,
    apply_lock: &tokio::sync::Mutex<()>,
    cancel: &watch::Receiver<bool>,
) -> Option<ReconcileSummary> {
    let mut summary = ReconcileSummary::started(chrono::Utc::now());

    let enumerate = pipeline.clone();
    let subscriptions =
        match tokio::task::spawn_blocking(move || enumerate.active_subscriptions()).await {
            Ok(Ok(subscriptions)) => subscriptions,
            Ok(Err(e)) => {
                error!(error = %e, "could not enumerate subscriptions");
                summary.enumeration_error = Some(e.to_string());
                summary.finished_at = chrono::Utc::now();
                return Some(summary);
            }
            Err(e) => {
                error!(error = %e, "subscription enumeration panicked");
                summary.enumeration_error = Some(e.to_string());
                summary.finished_at = chrono::Utc::now();
                return Some(summary);
            }
        };

    if subscriptions.is_empty() {
        info!("no active subscriptions");
    }

    for subscription in subscriptions {
        let _turn = apply_lock.lock().await;
        if *cancel.borrow() {
            return None;
        }
        let sub_id = subscription.sub_id;
        let worker = pipeline.clone();
        match tokio::task::spawn_blocking(move || worker.reapply_saved(sub_id)).await {
            Ok(Ok(ApplyStatus::Applied)) => summary.succeeded += 1,
            Ok(Ok(ApplyStatus::AlreadyCurrent)) => summary.already_current += 1,
            Ok(Ok(ApplyStatus::NotConfigured)) => summary.skipped += 1,
            Ok(Err(e)) => {
                warn!(%sub_id, error = %e, "reconciliation failed for subscription");
                summary.record_failure(sub_id, e.to_string());
            }
            Err(e) => {
                error!(%sub_id, error = %e, "reconciliation panicked for subscription");
                summary.record_failure(sub_id, e.to_string());
            }
        }
    }

    summary.finished_at = chrono::Utc::now();
    info!(
        succeeded = summary.succeeded,
        already_current = summary.already_current,
        skipped = summary.skipped,
        failed = summary.failed,
        "reconciliation finished"
    );
    Some(summary)
}

fn spawn_report(reporter: Arc<dyn ReconcileReporter>, summary: ReconcileSummary) {
    tokio::spawn(async move {
        if let Err(e) = reporter.report(&summary).await {
            warn!(error = %e, "failed to report reconciliation result");
        }
    });
}
