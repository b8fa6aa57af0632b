//! Carrier config override pipeline for imsconf.
//!
//! Turns a per-subscription feature configuration into a platform carrier
//! config override and writes it through a privilege broker.
//!
//! # Architecture
//!
//! - **Compiler**: pure `Configuration -> Bundle` translation
//! - **Guard**: skips an apply when the active override is from this build
//! - **Gateway**: holds a delegated shell identity for the override call and
//!   tries the two override signatures the platform may expose
//! - **Pipeline**: ties the feature store and the pieces above together
//!
//! The device side is reached only through the traits in [`platform`].
//!
//! # Example
//!
//! ```
//! use imsconf_carrier::compile;
//! use imsconf_types::{keys, Configuration, Feature, SubId};
//!
//! let config = Configuration::new().with(Feature::Nr5g, true);
//! let bundle = compile(&config, SubId::new(1), 42);
//!
//! assert_eq!(bundle.config_version(), Some(42));
//! assert_eq!(bundle.get_int_array(keys::CARRIER_NR_AVAILABILITIES), Some(&[1, 2][..]));
//! ```

mod compiler;
mod error;
mod gateway;
mod guard;
mod pipeline;
pub mod platform;

pub use compiler::compile;
pub use error::{
    failure_message, ApplyError, ApplyResult, BrokerError, GatewayError, OverrideError,
    PlatformError,
};
pub use gateway::{override_with_fallback, PrivilegedGateway, ShellIdentity};
pub use guard::{ApplyGuard, GuardDecision};
pub use pipeline::{ApplyMode, ApplyPipeline, ApplyStatus, PipelineConfig};
pub use platform::{
    CarrierConfigService, PermissionStatus, PrivilegeBroker, SubscriptionInfo,
    SubscriptionService,
};
