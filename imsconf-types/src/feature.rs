//! The closed catalogue of configurable IMS features.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The primitive type a feature's value is stored as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Boolean,
    String,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => write!(f, "boolean"),
            Self::String => write!(f, "string"),
        }
    }
}

/// A typed feature value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Boolean(bool),
    String(String),
}

impl FeatureValue {
    /// Returns the type this value was produced under.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Boolean(_) => ValueType::Boolean,
            Self::String(_) => ValueType::String,
        }
    }

    /// Returns the boolean payload, if this is a boolean value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            Self::String(_) => None,
        }
    }

    /// Returns the string payload, if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Boolean(_) => None,
        }
    }
}

impl From<bool> for FeatureValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<&str> for FeatureValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// A configurable feature.
///
/// The catalogue is fixed at build time. Declaration order is the canonical
/// ordering used by [`crate::Configuration`] and by persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    CarrierName,
    CountryIso,
    ImsUserAgent,
    Volte,
    Vowifi,
    VideoTelephony,
    Vonr,
    CrossSim,
    Ut,
    Nr5g,
    Show4gForLte,
}

impl Feature {
    /// Every feature in catalogue order.
    pub const ALL: [Feature; 11] = [
        Feature::CarrierName,
        Feature::CountryIso,
        Feature::ImsUserAgent,
        Feature::Volte,
        Feature::Vowifi,
        Feature::VideoTelephony,
        Feature::Vonr,
        Feature::CrossSim,
        Feature::Ut,
        Feature::Nr5g,
        Feature::Show4gForLte,
    ];

    /// Stable identifier, also used as the persistence key.
    pub fn key(&self) -> &'static str {
        match self {
            Self::CarrierName => "carrier_name",
            Self::CountryIso => "country_iso",
            Self::ImsUserAgent => "ims_user_agent",
            Self::Volte => "volte",
            Self::Vowifi => "vowifi",
            Self::VideoTelephony => "vt",
            Self::Vonr => "vonr",
            Self::CrossSim => "cross_sim",
            Self::Ut => "ut",
            Self::Nr5g => "5g_nr",
            Self::Show4gForLte => "show_4g_for_lte",
        }
    }

    /// Looks a feature up by its persistence key.
    pub fn from_key(key: &str) -> Option<Feature> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Self::CarrierName | Self::CountryIso | Self::ImsUserAgent => ValueType::String,
            _ => ValueType::Boolean,
        }
    }

    /// The value a feature takes when nothing was stored for it.
    pub fn default_value(&self) -> FeatureValue {
        match self {
            Self::CarrierName | Self::CountryIso | Self::ImsUserAgent => {
                FeatureValue::String(String::new())
            }
            Self::Volte
            | Self::Vowifi
            | Self::VideoTelephony
            | Self::Vonr
            | Self::CrossSim => FeatureValue::Boolean(true),
            Self::Ut | Self::Nr5g | Self::Show4gForLte => FeatureValue::Boolean(false),
        }
    }

    /// Whether the feature names something specific to one carrier.
    ///
    /// These values are dropped when compiling for [`crate::SubId::ALL`].
    pub fn is_subscription_specific(&self) -> bool {
        matches!(
            self,
            Self::CarrierName | Self::CountryIso | Self::ImsUserAgent
        )
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
