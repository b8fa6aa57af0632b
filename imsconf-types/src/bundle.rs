//! Carrier configuration bundles.

use crate::keys;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A primitive value held in a [`Bundle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BundleValue {
    Bool(bool),
    Int(i32),
    IntArray(Vec<i32>),
    String(String),
}

/// A platform carrier configuration bundle: a flat `key -> primitive` map.
///
/// Compiled bundles are handed to the platform and never persisted here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bundle {
    values: BTreeMap<String, BundleValue>,
}

impl Bundle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), BundleValue::Bool(value));
    }

    pub fn put_int(&mut self, key: &str, value: i32) {
        self.values.insert(key.to_string(), BundleValue::Int(value));
    }

    pub fn put_int_array(&mut self, key: &str, value: &[i32]) {
        self.values
            .insert(key.to_string(), BundleValue::IntArray(value.to_vec()));
    }

    pub fn put_string(&mut self, key: &str, value: impl Into<String>) {
        self.values
            .insert(key.to_string(), BundleValue::String(value.into()));
    }

    pub fn insert(&mut self, key: &str, value: BundleValue) {
        self.values.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&BundleValue> {
        self.values.get(key)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(BundleValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i32> {
        match self.values.get(key) {
            Some(BundleValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn get_int_array(&self, key: &str) -> Option<&[i32]> {
        match self.values.get(key) {
            Some(BundleValue::IntArray(v)) => Some(v),
            _ => None,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(BundleValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The build version stamped into this bundle, if any.
    pub fn config_version(&self) -> Option<i32> {
        self.get_int(keys::CONFIG_VERSION)
    }

    /// Stamps the build version that produced this bundle.
    pub fn set_config_version(&mut self, version: i32) {
        self.put_int(keys::CONFIG_VERSION, version);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
