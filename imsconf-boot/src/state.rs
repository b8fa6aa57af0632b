//! Attempt states and reconciliation results.

use chrono::{DateTime, Utc};
use imsconf_types::SubId;
use serde::{Deserialize, Serialize};

/// Where a reconciliation attempt is in its lifecycle.
///
/// `WaitingForBroker -> Applying -> Done`, or `WaitingForBroker -> TimedOut`.
/// `Cancelled` ends an attempt that a newer boot signal replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptState {
    WaitingForBroker,
    Applying,
    Done,
    TimedOut,
    Cancelled,
}

impl AttemptState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::TimedOut | Self::Cancelled)
    }
}

/// Overall result of one attempt, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Success,
    Failure,
    Mixed,
    /// No subscription had anything to apply.
    Nothing,
}

/// One subscription's failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionFailure {
    pub sub_id: SubId,
    pub message: String,
}

/// Tally of a finished attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileSummary {
    /// Overrides written.
    pub succeeded: usize,
    /// Overrides already from this build, nothing written.
    pub already_current: usize,
    /// Subscriptions without a saved configuration.
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<SubscriptionFailure>,
    /// Set when the subscription list itself could not be read.
    pub enumeration_error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ReconcileSummary {
    pub(crate) fn started(at: DateTime<Utc>) -> Self {
        Self {
            succeeded: 0,
            already_current: 0,
            skipped: 0,
            failed: 0,
            failures: Vec::new(),
            enumeration_error: None,
            started_at: at,
            finished_at: at,
        }
    }

    pub(crate) fn record_failure(&mut self, sub_id: SubId, message: String) {
        self.failed += 1;
        self.failures.push(SubscriptionFailure { sub_id, message });
    }

    /// Subscriptions that ended up with this build's override in place.
    pub fn ok(&self) -> usize {
        self.succeeded + self.already_current
    }

    pub fn verdict(&self) -> Verdict {
        let failed = self.failed + usize::from(self.enumeration_error.is_some());
        match (self.ok(), failed) {
            (0, 0) => Verdict::Nothing,
            (_, 0) => Verdict::Success,
            (0, _) => Verdict::Failure,
            _ => Verdict::Mixed,
        }
    }
}

/// How an attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    Done(ReconcileSummary),
    TimedOut,
    Cancelled,
}

impl ReconcileOutcome {
    pub fn summary(&self) -> Option<&ReconcileSummary> {
        match self {
            Self::Done(summary) => Some(summary),
            _ => None,
        }
    }

    /// The terminal state matching this outcome.
    pub fn state(&self) -> AttemptState {
        match self {
            Self::Done(_) => AttemptState::Done,
            Self::TimedOut => AttemptState::TimedOut,
            Self::Cancelled => AttemptState::Cancelled,
        }
    }
}
