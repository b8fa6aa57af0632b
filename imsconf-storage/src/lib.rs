//! SQLite storage layer for imsconf.
//!
//! Persists the desired feature configuration of every subscription so it can
//! be re-applied after a reboot. One namespace per subscription id, keyed by
//! feature key, values stored as JSON primitives.

mod error;
mod feature_store;

pub use error::{StorageError, StorageResult};
pub use feature_store::{namespace_for, FeatureStore};
