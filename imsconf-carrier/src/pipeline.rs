//! The load, compile, guard, apply pipeline.

use crate::compiler::compile;
use crate::error::{ApplyError, ApplyResult};
use crate::gateway::PrivilegedGateway;
use crate::guard::ApplyGuard;
use crate::platform::{
    CarrierConfigService, PrivilegeBroker, SubscriptionInfo, SubscriptionService,
};
use imsconf_storage::FeatureStore;
use imsconf_types::{Bundle, Configuration, SubId};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Configuration for the apply pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Version code of the running build, stamped into every override.
    pub build_version: i32,
    /// Uid the shell identity is delegated to (this process).
    pub delegate_uid: u32,
}

impl PipelineConfig {
    pub fn new(build_version: i32, delegate_uid: u32) -> Self {
        Self {
            build_version,
            delegate_uid,
        }
    }
}

/// Whether the version guard may skip an apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// Skip when the active override already carries this build's stamp.
    IfStale,
    /// Always apply.
    Force,
}

/// What an apply ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyStatus {
    Applied,
    AlreadyCurrent,
    /// Nothing saved for this subscription.
    NotConfigured,
}

/// Owns the collaborators and runs configurations through to the platform.
pub struct ApplyPipeline {
    config: PipelineConfig,
    store: FeatureStore,
    carrier: Arc<dyn CarrierConfigService>,
    subscriptions: Arc<dyn SubscriptionService>,
    gateway: PrivilegedGateway,
    guard: ApplyGuard,
}

impl ApplyPipeline {
    pub fn new(
        config: PipelineConfig,
        store: FeatureStore,
        broker: Arc<dyn PrivilegeBroker>,
        carrier: Arc<dyn CarrierConfigService>,
        subscriptions: Arc<dyn SubscriptionService>,
    ) -> Self {
        let gateway = PrivilegedGateway::new(broker, carrier.clone(), config.delegate_uid);
        let guard = ApplyGuard::new(config.build_version);
        Self {
            config,
            store,
            carrier,
            subscriptions,
            gateway,
            guard,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    pub fn broker(&self) -> &Arc<dyn PrivilegeBroker> {
        self.gateway.broker()
    }

    /// Lists the platform's active subscriptions.
    pub fn active_subscriptions(&self) -> ApplyResult<Vec<SubscriptionInfo>> {
        Ok(self.subscriptions.active_subscriptions()?)
    }

    /// Settings screen entry point: persists `config` for `sub_id` and
    /// applies it unconditionally.
    pub fn save_and_apply(&self, sub_id: SubId, config: &Configuration) -> ApplyResult<ApplyStatus> {
        self.store.save(sub_id, config)?;
        self.apply(sub_id, config, ApplyMode::Force)
    }

    /// Compiles `config` and applies it to `sub_id`, or to every active
    /// subscription when `sub_id` is [`SubId::ALL`].
    pub fn apply(
        &self,
        sub_id: SubId,
        config: &Configuration,
        mode: ApplyMode,
    ) -> ApplyResult<ApplyStatus> {
        let bundle = compile(config, sub_id, self.config.build_version);
        if sub_id.is_all() {
            return self.apply_to_all(&bundle, mode);
        }
        self.apply_bundle(sub_id, &bundle, mode)
    }

    /// Boot entry point: re-applies the saved configuration of `sub_id`,
    /// unless the active override is already from this build.
    ///
    /// A subscription without its own record falls back to the record saved
    /// for [`SubId::ALL`], compiled without subscription-specific strings.
    pub fn reapply_saved(&self, sub_id: SubId) -> ApplyResult<ApplyStatus> {
        if let Some(config) = self.store.load(sub_id)? {
            return self.apply(sub_id, &config, ApplyMode::IfStale);
        }
        if sub_id.is_all() {
            debug!("no saved configuration for all subscriptions");
            return Ok(ApplyStatus::NotConfigured);
        }
        match self.store.load(SubId::ALL)? {
            Some(config) => {
                debug!(%sub_id, "using configuration saved for all subscriptions");
                let bundle = compile(&config, SubId::ALL, self.config.build_version);
                self.apply_bundle(sub_id, &bundle, ApplyMode::IfStale)
            }
            None => {
                debug!(%sub_id, "no saved configuration");
                Ok(ApplyStatus::NotConfigured)
            }
        }
    }

    /// Clears the override for `sub_id` (every active subscription for
    /// [`SubId::ALL`]), restoring the carrier's own configuration.
    pub fn reset(&self, sub_id: SubId) -> ApplyResult<()> {
        if !sub_id.is_all() {
            return Ok(self.gateway.apply(sub_id, None)?);
        }
        let targets = self.targets_for_all()?;
        let mut first_error = None;
        for target in targets {
            if let Err(e) = self.gateway.apply(target, None) {
                first_error.get_or_insert(ApplyError::from(e));
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Reads the active bundle for `sub_id`, filtered to `key`.
    pub fn current_bundle(&self, sub_id: SubId, key: &str) -> ApplyResult<Bundle> {
        Ok(self.carrier.config_for_sub_id(sub_id, key)?)
    }

    fn apply_bundle(
        &self,
        sub_id: SubId,
        bundle: &Bundle,
        mode: ApplyMode,
    ) -> ApplyResult<ApplyStatus> {
        if mode == ApplyMode::IfStale && self.guard.check(self.carrier.as_ref(), sub_id).is_current()
        {
            info!(%sub_id, version = self.guard.build_version(), "override already current");
            return Ok(ApplyStatus::AlreadyCurrent);
        }
        self.gateway.apply(sub_id, Some(bundle))?;
        Ok(ApplyStatus::Applied)
    }

    fn apply_to_all(&self, bundle: &Bundle, mode: ApplyMode) -> ApplyResult<ApplyStatus> {
        let targets = self.targets_for_all()?;
        let mut applied = false;
        let mut first_error = None;
        for target in targets {
            match self.apply_bundle(target, bundle, mode) {
                Ok(ApplyStatus::Applied) => applied = true,
                Ok(_) => {}
                Err(e) => {
                    warn!(sub_id = %target, error = %e, "apply to subscription failed");
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None if applied => Ok(ApplyStatus::Applied),
            None => Ok(ApplyStatus::AlreadyCurrent),
        }
    }

    fn targets_for_all(&self) -> ApplyResult<Vec<SubId>> {
        let targets: Vec<SubId> = self
            .active_subscriptions()?
            .into_iter()
            .map(|s| s.sub_id)
            .collect();
        if targets.is_empty() {
            return Err(ApplyError::NoActiveSubscriptions);
        }
        Ok(targets)
    }
}
