//! Read-only view of every preference ("Show all preferences").

use prefsuite_store::{PreferenceStore, PreferenceValue};

/// One row of the inspector: a projection of the store, never written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceOption {
    pub key: String,
    pub declared_type: &'static str,
    pub value: PreferenceValue,
    pub default: Option<PreferenceValue>,
}

impl PreferenceOption {
    /// True when the current value differs from the built-in default.
    pub fn is_modified(&self) -> bool {
        self.default.as_ref() != Some(&self.value)
    }
}

/// Every key in the store, sorted by key, optionally filtered by a
/// case-insensitive substring of the key or the displayed value.
pub fn list_options(store: &dyn PreferenceStore, filter: &str) -> Vec<PreferenceOption> {
    let needle = filter.trim().to_lowercase();

    store
        .entries()
        .into_iter()
        .filter(|(key, value)| {
            needle.is_empty()
                || key.to_lowercase().contains(&needle)
                || value.to_string().to_lowercase().contains(&needle)
        })
        .map(|(key, value)| PreferenceOption {
            declared_type: value.type_name(),
            default: store.default_value(&key),
            key,
            value,
        })
        .collect()
}
