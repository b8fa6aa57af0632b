//! Platform collaborator abstraction.
//!
//! The pipeline never talks to the device directly. The host supplies
//! implementations of these traits that bind to the privilege broker, the
//! carrier config service and the subscription service.

use crate::error::{BrokerError, OverrideError, PlatformError};
use imsconf_types::{Bundle, SubId};
use serde::{Deserialize, Serialize};

/// Outcome of the broker's self permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Channel that lets this process temporarily act with shell privileges.
pub trait PrivilegeBroker: Send + Sync {
    /// Returns whether the broker process is alive.
    fn ping_binder(&self) -> bool;

    /// Returns whether this process may use the broker.
    fn check_self_permission(&self) -> PermissionStatus;

    /// Starts delegating the shell identity to `uid`.
    fn start_delegate_shell_permission_identity(&self, uid: u32) -> Result<(), BrokerError>;

    /// Ends the current delegation.
    fn stop_delegate_shell_permission_identity(&self) -> Result<(), BrokerError>;

    /// Alive and permitted.
    fn is_ready(&self) -> bool {
        self.ping_binder() && self.check_self_permission().is_granted()
    }
}

/// The platform's carrier configuration service.
///
/// The override entry point exists in two shapes depending on the platform
/// release. Implementations report a missing shape with
/// [`OverrideError::EntryPointNotFound`] and nothing else.
pub trait CarrierConfigService: Send + Sync {
    /// Reads the active bundle for a subscription, filtered to `key`.
    fn config_for_sub_id(&self, sub_id: SubId, key: &str) -> Result<Bundle, PlatformError>;

    /// `overrideConfig(subId, bundle)`. `None` clears the override.
    fn override_config(
        &self,
        sub_id: SubId,
        overrides: Option<&Bundle>,
    ) -> Result<(), OverrideError>;

    /// `overrideConfig(subId, bundle, persistent)`. `None` clears the override.
    fn override_config_persistent(
        &self,
        sub_id: SubId,
        overrides: Option<&Bundle>,
        persistent: bool,
    ) -> Result<(), OverrideError>;
}

/// An active subscription as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionInfo {
    pub sub_id: SubId,
    pub display_name: String,
    pub carrier_name: String,
    pub slot_index: i32,
}

/// The platform's subscription service.
pub trait SubscriptionService: Send + Sync {
    /// Lists the active subscriptions.
    fn active_subscriptions(&self) -> Result<Vec<SubscriptionInfo>, PlatformError>;
}

/// In-memory collaborators for tests.
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// A broker that records delegation calls.
    #[derive(Debug)]
    pub struct MockBroker {
        running: AtomicBool,
        granted: AtomicBool,
        fail_start: AtomicBool,
        ready_after_pings: AtomicUsize,
        pings: AtomicUsize,
        starts: AtomicUsize,
        stops: AtomicUsize,
        delegating: AtomicBool,
    }

    impl MockBroker {
        /// A running broker with permission granted.
        pub fn ready() -> Self {
            Self {
                running: AtomicBool::new(true),
                granted: AtomicBool::new(true),
                fail_start: AtomicBool::new(false),
                ready_after_pings: AtomicUsize::new(0),
                pings: AtomicUsize::new(0),
                starts: AtomicUsize::new(0),
                stops: AtomicUsize::new(0),
                delegating: AtomicBool::new(false),
            }
        }

        /// A broker that never comes up.
        pub fn offline() -> Self {
            let broker = Self::ready();
            broker.set_running(false);
            broker
        }

        /// A broker whose first `pings` pings fail.
        pub fn ready_after(pings: usize) -> Self {
            let broker = Self::ready();
            broker.ready_after_pings.store(pings, Ordering::SeqCst);
            broker
        }

        pub fn set_running(&self, running: bool) {
            self.running.store(running, Ordering::SeqCst);
        }

        pub fn set_granted(&self, granted: bool) {
            self.granted.store(granted, Ordering::SeqCst);
        }

        pub fn set_fail_start(&self, fail: bool) {
            self.fail_start.store(fail, Ordering::SeqCst);
        }

        pub fn pings(&self) -> usize {
            self.pings.load(Ordering::SeqCst)
        }

        pub fn starts(&self) -> usize {
            self.starts.load(Ordering::SeqCst)
        }

        pub fn stops(&self) -> usize {
            self.stops.load(Ordering::SeqCst)
        }

        /// Whether a delegation is currently active.
        pub fn is_delegating(&self) -> bool {
            self.delegating.load(Ordering::SeqCst)
        }
    }

    impl PrivilegeBroker for MockBroker {
        fn ping_binder(&self) -> bool {
            let seen = self.pings.fetch_add(1, Ordering::SeqCst);
            self.running.load(Ordering::SeqCst)
                && seen >= self.ready_after_pings.load(Ordering::SeqCst)
        }

        fn check_self_permission(&self) -> PermissionStatus {
            if self.granted.load(Ordering::SeqCst) {
                PermissionStatus::Granted
            } else {
                PermissionStatus::Denied
            }
        }

        fn start_delegate_shell_permission_identity(&self, _uid: u32) -> Result<(), BrokerError> {
            if self.fail_start.load(Ordering::SeqCst) {
                return Err(BrokerError::Remote("delegation refused".into()));
            }
            if self.delegating.swap(true, Ordering::SeqCst) {
                return Err(BrokerError::Remote("delegation already active".into()));
            }
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn stop_delegate_shell_permission_identity(&self) -> Result<(), BrokerError> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            self.delegating.store(false, Ordering::SeqCst);
            Ok(())
        }
    }

    /// A scripted misbehaviour for one subscription's override call.
    #[derive(Debug, Clone)]
    pub enum Fault {
        Reject(String),
        Panic(String),
    }

    /// Which override call shapes the fake platform exposes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum OverrideShape {
        /// Only `overrideConfig(subId, bundle)`.
        TwoArg,
        /// Only `overrideConfig(subId, bundle, persistent)`.
        ThreeArg,
        Both,
        Neither,
    }

    /// One recorded override call.
    #[derive(Debug, Clone, PartialEq)]
    pub struct OverrideCall {
        pub sub_id: SubId,
        pub overrides: Option<Bundle>,
        /// `None` for the two-argument form.
        pub persistent: Option<bool>,
    }

    /// A carrier config service holding active bundles in memory.
    pub struct MockCarrierConfig {
        shape: OverrideShape,
        broker: Option<Arc<MockBroker>>,
        active: Mutex<HashMap<SubId, Bundle>>,
        faults: Mutex<HashMap<SubId, Fault>>,
        calls: Mutex<Vec<OverrideCall>>,
        reads: AtomicUsize,
        fail_reads: AtomicBool,
    }

    impl MockCarrierConfig {
        pub fn new(shape: OverrideShape) -> Self {
            Self {
                shape,
                broker: None,
                active: Mutex::new(HashMap::new()),
                faults: Mutex::new(HashMap::new()),
                calls: Mutex::new(Vec::new()),
                reads: AtomicUsize::new(0),
                fail_reads: AtomicBool::new(false),
            }
        }

        /// Rejects overrides unless `broker` is delegating at call time.
        pub fn requiring_identity(mut self, broker: Arc<MockBroker>) -> Self {
            self.broker = Some(broker);
            self
        }

        /// Seeds the active bundle for a subscription.
        pub fn set_active(&self, sub_id: SubId, bundle: Bundle) {
            self.active.lock().unwrap().insert(sub_id, bundle);
        }

        pub fn active(&self, sub_id: SubId) -> Option<Bundle> {
            self.active.lock().unwrap().get(&sub_id).cloned()
        }

        pub fn inject_fault(&self, sub_id: SubId, fault: Fault) {
            self.faults.lock().unwrap().insert(sub_id, fault);
        }

        pub fn set_fail_reads(&self, fail: bool) {
            self.fail_reads.store(fail, Ordering::SeqCst);
        }

        pub fn calls(&self) -> Vec<OverrideCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }

        fn record(
            &self,
            sub_id: SubId,
            overrides: Option<&Bundle>,
            persistent: Option<bool>,
        ) -> Result<(), OverrideError> {
            self.calls.lock().unwrap().push(OverrideCall {
                sub_id,
                overrides: overrides.cloned(),
                persistent,
            });
            if let Some(broker) = &self.broker {
                if !broker.is_delegating() {
                    return Err(OverrideError::Rejected("caller lacks shell identity".into()));
                }
            }
            let fault = self.faults.lock().unwrap().get(&sub_id).cloned();
            match fault {
                Some(Fault::Reject(msg)) => return Err(OverrideError::Rejected(msg)),
                Some(Fault::Panic(msg)) => panic!("{msg}"),
                None => {}
            }
            let mut active = self.active.lock().unwrap();
            match overrides {
                Some(bundle) => {
                    active.insert(sub_id, bundle.clone());
                }
                None => {
                    active.remove(&sub_id);
                }
            }
            Ok(())
        }
    }

    impl CarrierConfigService for MockCarrierConfig {
        fn config_for_sub_id(&self, sub_id: SubId, key: &str) -> Result<Bundle, PlatformError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(PlatformError::Unavailable("carrier_config".into()));
            }
            let active = self.active.lock().unwrap();
            let mut filtered = Bundle::new();
            if let Some(value) = active.get(&sub_id).and_then(|b| b.get(key)) {
                filtered.insert(key, value.clone());
            }
            Ok(filtered)
        }

        fn override_config(
            &self,
            sub_id: SubId,
            overrides: Option<&Bundle>,
        ) -> Result<(), OverrideError> {
            match self.shape {
                OverrideShape::TwoArg | OverrideShape::Both => {
                    self.record(sub_id, overrides, None)
                }
                _ => Err(OverrideError::EntryPointNotFound),
            }
        }

        fn override_config_persistent(
            &self,
            sub_id: SubId,
            overrides: Option<&Bundle>,
            persistent: bool,
        ) -> Result<(), OverrideError> {
            match self.shape {
                OverrideShape::ThreeArg | OverrideShape::Both => {
                    self.record(sub_id, overrides, Some(persistent))
                }
                _ => Err(OverrideError::EntryPointNotFound),
            }
        }
    }

    /// A subscription service returning a fixed list.
    #[derive(Debug, Default)]
    pub struct MockSubscriptions {
        subscriptions: Mutex<Vec<SubscriptionInfo>>,
        fail: AtomicBool,
    }

    impl MockSubscriptions {
        pub fn with_ids(ids: &[i32]) -> Self {
            let subscriptions = ids
                .iter()
                .enumerate()
                .map(|(slot, raw)| SubscriptionInfo {
                    sub_id: SubId::new(*raw),
                    display_name: format!("SIM {}", slot + 1),
                    carrier_name: format!("Carrier {raw}"),
                    slot_index: slot as i32,
                })
                .collect();
            Self {
                subscriptions: Mutex::new(subscriptions),
                fail: AtomicBool::new(false),
            }
        }

        pub fn set_fail(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }
    }

    impl SubscriptionService for MockSubscriptions {
        fn active_subscriptions(&self) -> Result<Vec<SubscriptionInfo>, PlatformError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(PlatformError::Unavailable("isub".into()));
            }
            Ok(self.subscriptions.lock().unwrap().clone())
        }
    }
}
