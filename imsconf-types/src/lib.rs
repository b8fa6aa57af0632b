//! Core type definitions for imsconf.
//!
//! This crate defines the fundamental types shared by every other crate in
//! the workspace:
//! - Subscription identifiers (with the "all subscriptions" sentinel)
//! - The closed feature catalogue and typed feature values
//! - Per-subscription configurations
//! - Carrier configuration bundles and the platform keys they use
//!
//! Nothing here performs I/O. Persistence lives in `imsconf-storage`, and
//! talking to the platform lives in `imsconf-carrier`.

mod bundle;
mod config;
mod feature;
mod ids;
pub mod keys;

pub use bundle::{Bundle, BundleValue};
pub use config::Configuration;
pub use feature::{Feature, FeatureValue, ValueType};
pub use ids::SubId;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, TypesError>;

/// Errors that can occur when building types from untrusted input.
#[derive(Debug, thiserror::Error)]
pub enum TypesError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unknown feature key: {0}")]
    UnknownFeature(String),

    #[error("feature '{key}' expects a {expected} value, got {found}")]
    TypeMismatch {
        key: String,
        expected: ValueType,
        found: ValueType,
    },

    #[error("invalid subscription id: {0}")]
    InvalidSubId(String),
}
