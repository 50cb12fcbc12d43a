//! JSON-file backed preference store
//!
//! Explicit values live in a single JSON object on disk, e.g.
//! `~/.config/prefsuite/preferences.json`. Defaults are never written.
//!
//! - `put*` only marks the store dirty; `flush()` writes atomically
//! - `clear()` and `import_from()` write through immediately
//! - `import_from()` writes the new file before swapping memory, so a
//!   failed import leaves both disk and memory as they were

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::map::PreferenceMap;
use crate::snapshot::{write_atomic, Snapshot};
use crate::store::PreferenceStore;
use crate::value::PreferenceValue;

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    map: PreferenceMap,
    dirty: bool,
}

impl JsonFileStore {
    /// Open the store at `path` with the given built-in defaults.
    ///
    /// A missing file is an empty store. An unreadable or unparseable file
    /// is logged and treated as empty: a broken preferences file must not
    /// prevent the application from starting.
    pub fn open<I, K>(path: impl Into<PathBuf>, defaults: I) -> Self
    where
        I: IntoIterator<Item = (K, PreferenceValue)>,
        K: Into<String>,
    {
        let path = path.into();
        let mut map = PreferenceMap::with_defaults(defaults);

        match Self::read_explicit(&path) {
            Ok(Some(explicit)) => {
                log::debug!("Loaded {} preferences from {}", explicit.len(), path.display());
                map.replace(explicit);
            }
            Ok(None) => log::debug!("No preferences file at {}, using defaults", path.display()),
            Err(e) => log::warn!("{}; using defaults", e),
        }

        Self { path, map, dirty: false }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when there are writes not yet flushed.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn read_explicit(path: &Path) -> Result<Option<BTreeMap<String, PreferenceValue>>, StoreError> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        let explicit = serde_json::from_str(&contents)
            .map_err(|e| StoreError::malformed(path, e.to_string()))?;
        Ok(Some(explicit))
    }

    fn write_explicit(
        &self,
        explicit: &BTreeMap<String, PreferenceValue>,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(explicit)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;
        write_atomic(&self.path, &json)
    }
}

impl PreferenceStore for JsonFileStore {
    fn value(&self, key: &str) -> Option<PreferenceValue> {
        self.map.value(key).cloned()
    }

    fn default_value(&self, key: &str) -> Option<PreferenceValue> {
        self.map.default_value(key).cloned()
    }

    fn put(&mut self, key: &str, value: PreferenceValue) {
        self.map.put(key, value);
        self.dirty = true;
    }

    fn entries(&self) -> Vec<(String, PreferenceValue)> {
        self.map.entries()
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }
        self.write_explicit(self.map.explicit())?;
        self.dirty = false;
        log::debug!("Flushed preferences to {}", self.path.display());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.write_explicit(&BTreeMap::new())?;
        self.map.clear();
        self.dirty = false;
        Ok(())
    }

    fn import_from(&mut self, path: &Path) -> Result<(), StoreError> {
        let snapshot = Snapshot::read(path)?;
        self.write_explicit(&snapshot.entries)?;
        self.map.replace(snapshot.entries);
        self.dirty = false;
        Ok(())
    }

    fn export_to(&self, path: &Path) -> Result<(), StoreError> {
        Snapshot::new(self.map.explicit().clone())?.write(path)
    }
}
