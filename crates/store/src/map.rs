//! Explicit values layered over built-in defaults.
//!
//! Both store implementations keep their contents in a `PreferenceMap`.
//! Defaults are supplied at construction and never change; `clear()` only
//! drops explicit values.

use std::collections::BTreeMap;

use crate::value::PreferenceValue;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferenceMap {
    explicit: BTreeMap<String, PreferenceValue>,
    defaults: BTreeMap<String, PreferenceValue>,
}

impl PreferenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a map with the given built-in defaults and no explicit values.
    pub fn with_defaults<I, K>(defaults: I) -> Self
    where
        I: IntoIterator<Item = (K, PreferenceValue)>,
        K: Into<String>,
    {
        Self {
            explicit: BTreeMap::new(),
            defaults: defaults.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn value(&self, key: &str) -> Option<&PreferenceValue> {
        self.explicit.get(key).or_else(|| self.defaults.get(key))
    }

    pub fn default_value(&self, key: &str) -> Option<&PreferenceValue> {
        self.defaults.get(key)
    }

    pub fn put(&mut self, key: &str, value: PreferenceValue) {
        self.explicit.insert(key.to_string(), value);
    }

    /// Explicitly set values only (what gets persisted and exported).
    pub fn explicit(&self) -> &BTreeMap<String, PreferenceValue> {
        &self.explicit
    }

    /// Current value of every known key, sorted by key.
    pub fn entries(&self) -> Vec<(String, PreferenceValue)> {
        let mut merged = self.defaults.clone();
        for (key, value) in &self.explicit {
            merged.insert(key.clone(), value.clone());
        }
        merged.into_iter().collect()
    }

    pub fn clear(&mut self) {
        self.explicit.clear();
    }

    /// Swap in a complete new set of explicit values.
    pub fn replace(&mut self, explicit: BTreeMap<String, PreferenceValue>) {
        self.explicit = explicit;
    }
}
