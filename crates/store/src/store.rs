//! The store contract consumed by the dialog core and every tab.

use std::path::Path;

use crate::error::StoreError;
use crate::value::PreferenceValue;

/// Typed key-value preference store.
///
/// Keys are opaque strings; the store never validates them. Reads of a key
/// with no explicit value fall back to the built-in default, then to an
/// empty value of the requested type. Reads never fail.
///
/// Writes (`put*`) only touch memory. `flush()` makes them durable.
/// `import_from` must replace the whole contents or leave them untouched.
pub trait PreferenceStore {
    /// Current value of a key: explicit value, else built-in default.
    fn value(&self, key: &str) -> Option<PreferenceValue>;

    /// Built-in default for a key, if one is declared.
    fn default_value(&self, key: &str) -> Option<PreferenceValue>;

    /// Set an explicit value.
    fn put(&mut self, key: &str, value: PreferenceValue);

    /// Every key the store knows (explicit or defaulted) with its current
    /// value, sorted by key.
    fn entries(&self) -> Vec<(String, PreferenceValue)>;

    /// Persist pending writes.
    fn flush(&mut self) -> Result<(), StoreError>;

    /// Drop every explicit value, returning all keys to their defaults.
    fn clear(&mut self) -> Result<(), StoreError>;

    /// Replace the entire contents from a snapshot file.
    fn import_from(&mut self, path: &Path) -> Result<(), StoreError>;

    /// Write the entire contents to a snapshot file.
    fn export_to(&self, path: &Path) -> Result<(), StoreError>;

    fn get(&self, key: &str) -> String {
        self.value(key).map(|v| v.as_string()).unwrap_or_default()
    }

    fn get_boolean(&self, key: &str) -> bool {
        self.value(key).and_then(|v| v.as_bool()).unwrap_or(false)
    }

    fn get_int(&self, key: &str) -> i64 {
        self.value(key).and_then(|v| v.as_int()).unwrap_or(0)
    }

    fn get_string_list(&self, key: &str) -> Vec<String> {
        self.value(key).map(|v| v.as_list()).unwrap_or_default()
    }

    fn put_string(&mut self, key: &str, value: &str) {
        self.put(key, PreferenceValue::Str(value.to_string()));
    }

    fn put_boolean(&mut self, key: &str, value: bool) {
        self.put(key, PreferenceValue::Bool(value));
    }

    fn put_int(&mut self, key: &str, value: i64) {
        self.put(key, PreferenceValue::Int(value));
    }

    fn put_string_list(&mut self, key: &str, value: &[String]) {
        self.put(key, PreferenceValue::List(value.to_vec()));
    }
}
