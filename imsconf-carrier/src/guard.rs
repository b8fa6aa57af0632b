//! Version-stamped apply guard.
//!
//! Every override this crate writes carries the build version that produced
//! it under [`keys::CONFIG_VERSION`]. If the active bundle already carries
//! the running build's version, re-applying is skipped.
//!
//! The stamp identifies the build, not the content: a changed configuration
//! under the same build is only re-applied with [`crate::ApplyMode::Force`].

use crate::platform::CarrierConfigService;
use imsconf_types::{keys, Bundle, SubId};
use tracing::{debug, warn};

/// What the guard concluded about a subscription's active bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// The active override came from this build.
    Current,
    /// The active bundle is unstamped or from another build.
    Stale { active_version: Option<i32> },
}

impl GuardDecision {
    pub fn is_current(&self) -> bool {
        matches!(self, Self::Current)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ApplyGuard {
    build_version: i32,
}

impl ApplyGuard {
    pub fn new(build_version: i32) -> Self {
        Self { build_version }
    }

    pub fn build_version(&self) -> i32 {
        self.build_version
    }

    /// Compares an active bundle's stamp against the running build.
    pub fn decide(&self, active: &Bundle) -> GuardDecision {
        match active.config_version() {
            Some(v) if v == self.build_version => GuardDecision::Current,
            active_version => GuardDecision::Stale { active_version },
        }
    }

    /// Reads the active bundle for `sub_id` and decides.
    ///
    /// A failed read counts as stale so the apply goes ahead.
    pub fn check(&self, carrier: &dyn CarrierConfigService, sub_id: SubId) -> GuardDecision {
        match carrier.config_for_sub_id(sub_id, keys::CONFIG_VERSION) {
            Ok(active) => {
                let decision = self.decide(&active);
                debug!(%sub_id, build = self.build_version, ?decision, "apply guard");
                decision
            }
            Err(e) => {
                warn!(%sub_id, error = %e, "could not read active carrier config, treating as stale");
                GuardDecision::Stale {
                    active_version: None,
                }
            }
        }
    }
}
