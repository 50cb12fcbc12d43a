//! In-process preference store.
//!
//! Nothing is written anywhere on `flush()`; import/export still go through
//! snapshot files so it behaves like the persistent store in every other
//! respect.

use std::path::Path;

use crate::error::StoreError;
use crate::map::PreferenceMap;
use crate::snapshot::Snapshot;
use crate::store::PreferenceStore;
use crate::value::PreferenceValue;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    map: PreferenceMap,
    flushes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults<I, K>(defaults: I) -> Self
    where
        I: IntoIterator<Item = (K, PreferenceValue)>,
        K: Into<String>,
    {
        Self { map: PreferenceMap::with_defaults(defaults), flushes: 0 }
    }

    pub fn map(&self) -> &PreferenceMap {
        &self.map
    }

    /// Number of times `flush()` has been called.
    pub fn flush_count(&self) -> usize {
        self.flushes
    }
}

impl PreferenceStore for MemoryStore {
    fn value(&self, key: &str) -> Option<PreferenceValue> {
        self.map.value(key).cloned()
    }

    fn default_value(&self, key: &str) -> Option<PreferenceValue> {
        self.map.default_value(key).cloned()
    }

    fn put(&mut self, key: &str, value: PreferenceValue) {
        self.map.put(key, value);
    }

    fn entries(&self) -> Vec<(String, PreferenceValue)> {
        self.map.entries()
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        self.flushes += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.map.clear();
        Ok(())
    }

    fn import_from(&mut self, path: &Path) -> Result<(), StoreError> {
        let snapshot = Snapshot::read(path)?;
        self.map.replace(snapshot.entries);
        Ok(())
    }

    fn export_to(&self, path: &Path) -> Result<(), StoreError> {
        Snapshot::new(self.map.explicit().clone())?.write(path)
    }
}
