//! Error types for the carrier layer.

use imsconf_storage::StorageError;
use thiserror::Error;

/// Result type for pipeline operations.
pub type ApplyResult<T> = Result<T, ApplyError>;

/// Failure reported by a platform service call.
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    /// The service could not be reached.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The call reached the service and failed there.
    #[error("{0}")]
    Failed(String),
}

/// Failure reported by one of the platform's override entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverrideError {
    /// The running platform has no entry point with this signature.
    #[error("override entry point not found")]
    EntryPointNotFound,

    /// The entry point exists and refused the call.
    #[error("override rejected: {0}")]
    Rejected(String),
}

/// Failure reported by the privilege broker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    #[error("privilege broker is not running")]
    NotRunning,

    #[error("privilege broker permission denied")]
    PermissionDenied,

    #[error("privilege broker call failed: {0}")]
    Remote(String),
}

/// Errors surfaced by the privileged gateway. The `Display` text is what a
/// settings screen shows to the user.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Broker(#[from] BrokerError),

    /// Neither override signature exists on the running platform.
    #[error("this platform exposes no carrier config override entry point")]
    NoOverrideEntryPoint,

    #[error("platform rejected carrier config override: {0}")]
    Rejected(String),

    /// A collaborator panicked inside the privileged section.
    #[error("privileged call aborted: {0}")]
    Panicked(String),
}

/// Errors that can occur anywhere in the load, compile, guard, apply pipeline.
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("no active subscriptions")]
    NoActiveSubscriptions,
}

/// Collapses a pipeline result into the message a caller shows: `None` on
/// success, the error text on failure.
pub fn failure_message<T>(result: &ApplyResult<T>) -> Option<String> {
    result.as_ref().err().map(ToString::to_string)
}
