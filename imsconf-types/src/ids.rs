//! Subscription identifiers.

use crate::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Handle for one SIM slot's active subscription, as assigned by the platform.
///
/// The value is opaque to this crate: it is compared and ordered, never
/// allocated or validated. `SubId::ALL` is the sentinel meaning "apply to
/// every subscription".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubId(i32);

impl SubId {
    /// Sentinel id that targets all subscriptions at once.
    pub const ALL: SubId = SubId(-1);

    /// Wraps a raw platform subscription id.
    #[must_use]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw platform value.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }

    /// Returns true for the "all subscriptions" sentinel.
    #[must_use]
    pub const fn is_all(&self) -> bool {
        self.0 == Self::ALL.0
    }
}

impl From<i32> for SubId {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SubId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i32>()
            .map(Self)
            .map_err(|_| TypesError::InvalidSubId(s.to_string()))
    }
}
