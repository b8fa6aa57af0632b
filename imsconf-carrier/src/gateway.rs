//! Privileged apply gateway.
//!
//! Writes carrier config overrides while holding a delegated shell identity
//! obtained through the privilege broker. The identity is held by a
//! [`ShellIdentity`] lease and released when the lease drops, on every exit
//! path including a panicking collaborator.

use crate::error::{BrokerError, GatewayError, OverrideError};
use crate::platform::{CarrierConfigService, PrivilegeBroker};
use imsconf_types::{Bundle, SubId};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A held shell identity delegation. Dropping it ends the delegation.
pub struct ShellIdentity<'a> {
    broker: &'a dyn PrivilegeBroker,
}

impl<'a> ShellIdentity<'a> {
    /// Checks the broker and starts delegating the shell identity to `uid`.
    pub fn acquire(broker: &'a dyn PrivilegeBroker, uid: u32) -> Result<Self, BrokerError> {
        if !broker.ping_binder() {
            return Err(BrokerError::NotRunning);
        }
        if !broker.check_self_permission().is_granted() {
            return Err(BrokerError::PermissionDenied);
        }
        broker.start_delegate_shell_permission_identity(uid)?;
        debug!(uid, "shell identity delegated");
        Ok(Self { broker })
    }
}

impl Drop for ShellIdentity<'_> {
    fn drop(&mut self) {
        match self.broker.stop_delegate_shell_permission_identity() {
            Ok(()) => debug!("shell identity released"),
            Err(e) => warn!(error = %e, "failed to release shell identity"),
        }
    }
}

/// Calls the two-argument override, falling back to the three-argument form
/// (not persisted across reboot) when the first does not exist. Any failure
/// other than a missing entry point is returned unchanged.
pub fn override_with_fallback(
    carrier: &dyn CarrierConfigService,
    sub_id: SubId,
    overrides: Option<&Bundle>,
) -> Result<(), GatewayError> {
    match carrier.override_config(sub_id, overrides) {
        Ok(()) => Ok(()),
        Err(OverrideError::EntryPointNotFound) => {
            debug!(%sub_id, "two-argument override missing, trying persistent form");
            match carrier.override_config_persistent(sub_id, overrides, false) {
                Ok(()) => Ok(()),
                Err(OverrideError::EntryPointNotFound) => Err(GatewayError::NoOverrideEntryPoint),
                Err(OverrideError::Rejected(msg)) => Err(GatewayError::Rejected(msg)),
            }
        }
        Err(OverrideError::Rejected(msg)) => Err(GatewayError::Rejected(msg)),
    }
}

/// Applies bundles to the platform under a delegated shell identity.
#[derive(Clone)]
pub struct PrivilegedGateway {
    broker: Arc<dyn PrivilegeBroker>,
    carrier: Arc<dyn CarrierConfigService>,
    delegate_uid: u32,
}

impl PrivilegedGateway {
    pub fn new(
        broker: Arc<dyn PrivilegeBroker>,
        carrier: Arc<dyn CarrierConfigService>,
        delegate_uid: u32,
    ) -> Self {
        Self {
            broker,
            carrier,
            delegate_uid,
        }
    }

    pub fn broker(&self) -> &Arc<dyn PrivilegeBroker> {
        &self.broker
    }

    /// Overrides the carrier config of `sub_id` with `overrides`, or clears
    /// the override when `overrides` is `None`.
    ///
    /// Never panics: collaborator panics are caught and reported as
    /// [`GatewayError::Panicked`].
    pub fn apply(&self, sub_id: SubId, overrides: Option<&Bundle>) -> Result<(), GatewayError> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.apply_scoped(sub_id, overrides)))
            .unwrap_or_else(|payload| Err(GatewayError::Panicked(panic_message(payload.as_ref()))));

        match &outcome {
            Ok(()) => info!(
                %sub_id,
                keys = overrides.map_or(0, Bundle::len),
                "carrier config override applied"
            ),
            Err(e) => warn!(%sub_id, error = %e, "carrier config override failed"),
        }
        outcome
    }

    fn apply_scoped(&self, sub_id: SubId, overrides: Option<&Bundle>) -> Result<(), GatewayError> {
        let _identity = ShellIdentity::acquire(self.broker.as_ref(), self.delegate_uid)?;
        if let Some(bundle) = overrides {
            debug!(%sub_id, keys = ?bundle.keys().collect::<Vec<_>>(), "writing override");
        }
        override_with_fallback(self.carrier.as_ref(), sub_id, overrides)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
