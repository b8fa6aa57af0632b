//! Per-subscription feature configurations.

use crate::feature::{Feature, FeatureValue, ValueType};
use crate::{Result, TypesError};
use std::collections::BTreeMap;

/// An ordered mapping from [`Feature`] to its [`FeatureValue`].
///
/// A configuration may be partial: features without an explicit entry read
/// as their catalogue default. Whatever is explicitly set is exactly what the
/// feature store persists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    entries: BTreeMap<Feature, FeatureValue>,
}

impl Configuration {
    /// Creates an empty configuration (every feature reads as its default).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration with an explicit default entry per feature.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            entries: Feature::ALL
                .into_iter()
                .map(|f| (f, f.default_value()))
                .collect(),
        }
    }

    /// Builds a configuration from raw `key -> value` pairs, such as a
    /// settings screen would hand over.
    pub fn from_raw<I, K>(raw: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, FeatureValue)>,
        K: AsRef<str>,
    {
        let mut config = Self::new();
        for (key, value) in raw {
            let key = key.as_ref();
            let feature =
                Feature::from_key(key).ok_or_else(|| TypesError::UnknownFeature(key.to_string()))?;
            if feature.value_type() != value.value_type() {
                return Err(TypesError::TypeMismatch {
                    key: key.to_string(),
                    expected: feature.value_type(),
                    found: value.value_type(),
                });
            }
            config.entries.insert(feature, value);
        }
        Ok(config)
    }

    /// Parses a JSON object of `key -> bool | string`.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, FeatureValue> = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    /// Sets a feature's value.
    ///
    /// # Panics
    ///
    /// Panics if the value's type does not match the feature's declared type.
    pub fn set(&mut self, feature: Feature, value: impl Into<FeatureValue>) {
        let value = value.into();
        assert_eq!(
            feature.value_type(),
            value.value_type(),
            "feature '{feature}' given a value of the wrong type"
        );
        self.entries.insert(feature, value);
    }

    /// Builder form of [`Configuration::set`].
    #[must_use]
    pub fn with(mut self, feature: Feature, value: impl Into<FeatureValue>) -> Self {
        self.set(feature, value);
        self
    }

    /// Removes an explicit entry, so the feature reads as its default again.
    pub fn unset(&mut self, feature: Feature) -> Option<FeatureValue> {
        self.entries.remove(&feature)
    }

    /// Returns the explicit entry for a feature, if one was set.
    pub fn get(&self, feature: Feature) -> Option<&FeatureValue> {
        self.entries.get(&feature)
    }

    /// Returns the effective value: the explicit entry, else the default.
    pub fn value(&self, feature: Feature) -> FeatureValue {
        self.entries
            .get(&feature)
            .cloned()
            .unwrap_or_else(|| feature.default_value())
    }

    /// Effective value of a boolean feature.
    ///
    /// # Panics
    ///
    /// Panics if `feature` is not a boolean feature.
    pub fn is_enabled(&self, feature: Feature) -> bool {
        assert_eq!(feature.value_type(), ValueType::Boolean);
        match self.entries.get(&feature) {
            Some(FeatureValue::Boolean(b)) => *b,
            _ => feature.default_value().as_bool().unwrap_or(false),
        }
    }

    /// Effective value of a string feature.
    ///
    /// # Panics
    ///
    /// Panics if `feature` is not a string feature.
    pub fn text(&self, feature: Feature) -> String {
        assert_eq!(feature.value_type(), ValueType::String);
        match self.entries.get(&feature) {
            Some(FeatureValue::String(s)) => s.clone(),
            _ => String::new(),
        }
    }

    /// Returns a copy with an explicit entry for every catalogue feature.
    #[must_use]
    pub fn completed(&self) -> Self {
        Self {
            entries: Feature::ALL
                .into_iter()
                .map(|f| (f, self.value(f)))
                .collect(),
        }
    }

    /// True when every catalogue feature has an explicit entry.
    pub fn is_complete(&self) -> bool {
        self.entries.len() == Feature::ALL.len()
    }

    /// Iterates explicit entries in catalogue order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, &FeatureValue)> + '_ {
        self.entries.iter().map(|(f, v)| (*f, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Explicit entries as a `key -> value` map.
    pub fn to_raw(&self) -> BTreeMap<String, FeatureValue> {
        self.entries
            .iter()
            .map(|(f, v)| (f.key().to_string(), v.clone()))
            .collect()
    }
}
