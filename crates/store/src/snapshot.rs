//! Whole-store snapshot files (import/export)
//!
//! A snapshot is a JSON document holding every explicit preference value:
//!
//! ```json
//! {
//!   "format": "prefsuite-snapshot",
//!   "version": 1,
//!   "exported_at": "2026-03-01T12:00:00Z",
//!   "entries": { "language": "fr", "proxy.port": 3128 },
//!   "checksum": "sha256:…"
//! }
//! ```
//!
//! The checksum covers the canonical (key-sorted, compact) JSON of `entries`.
//! Reading a snapshot either yields the complete entry set or an error;
//! callers apply it only after a successful read.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::StoreError;
use crate::value::PreferenceValue;

pub const SNAPSHOT_FORMAT: &str = "prefsuite-snapshot";
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub format: String,
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub entries: BTreeMap<String, PreferenceValue>,
    pub checksum: String,
}

impl Snapshot {
    /// Build a snapshot of the given entries, stamped with the current time.
    pub fn new(entries: BTreeMap<String, PreferenceValue>) -> Result<Self, StoreError> {
        let checksum = entries_checksum(&entries)?;
        Ok(Self {
            format: SNAPSHOT_FORMAT.to_string(),
            version: SNAPSHOT_VERSION,
            exported_at: Utc::now(),
            entries,
            checksum,
        })
    }

    /// Read and verify a snapshot file.
    pub fn read(path: &Path) -> Result<Self, StoreError> {
        let contents = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        let snapshot: Snapshot = serde_json::from_str(&contents)
            .map_err(|e| StoreError::malformed(path, e.to_string()))?;

        if snapshot.format != SNAPSHOT_FORMAT {
            return Err(StoreError::malformed(
                path,
                format!("unexpected format '{}'", snapshot.format),
            ));
        }
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(StoreError::UnsupportedVersion {
                path: path.to_path_buf(),
                version: snapshot.version,
            });
        }
        if entries_checksum(&snapshot.entries)? != snapshot.checksum {
            return Err(StoreError::ChecksumMismatch { path: path.to_path_buf() });
        }

        log::debug!("Read snapshot {} ({} entries)", path.display(), snapshot.entries.len());
        Ok(snapshot)
    }

    /// Write the snapshot atomically.
    pub fn write(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;
        write_atomic(path, &json)
    }
}

fn entries_checksum(entries: &BTreeMap<String, PreferenceValue>) -> Result<String, StoreError> {
    let canonical =
        serde_json::to_string(entries).map_err(|e| StoreError::Serialize(e.to_string()))?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let result = hasher.finalize();
    Ok(format!("sha256:{:x}", result))
}

/// Temp path next to the target: `prefs.json` → `prefs.json.tmp`
fn temp_path(path: &Path) -> PathBuf {
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    PathBuf::from(temp)
}

/// Write-to-temp-then-rename so a crash never leaves a half-written file.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
    }

    let temp = temp_path(path);
    fs::write(&temp, contents).map_err(|e| StoreError::io(&temp, e))?;
    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(StoreError::io(path, e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries() -> BTreeMap<String, PreferenceValue> {
        let mut entries = BTreeMap::new();
        entries.insert("language".to_string(), PreferenceValue::from("fr"));
        entries.insert("proxy.port".to_string(), PreferenceValue::Int(3128));
        entries
    }

    #[test]
    fn test_snapshot_write_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.json");

        let snapshot = Snapshot::new(entries()).unwrap();
        snapshot.write(&path).unwrap();
        assert!(!temp_path(&path).exists(), "temp file should be renamed away");

        let loaded = Snapshot::read(&path).unwrap();
        assert_eq!(loaded.entries, entries());
        assert!(loaded.checksum.starts_with("sha256:"));
    }

    #[test]
    fn test_snapshot_rejects_tampered_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.json");
        Snapshot::new(entries()).unwrap().write(&path).unwrap();

        let tampered = fs::read_to_string(&path).unwrap().replace("3128", "8080");
        fs::write(&path, tampered).unwrap();

        assert!(matches!(
            Snapshot::read(&path),
            Err(StoreError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_snapshot_rejects_garbage_and_foreign_format() {
        let dir = TempDir::new().unwrap();
        let garbage = dir.path().join("garbage.json");
        fs::write(&garbage, "<preferences/>").unwrap();
        assert!(matches!(Snapshot::read(&garbage), Err(StoreError::Malformed { .. })));

        let mut snapshot = Snapshot::new(entries()).unwrap();
        snapshot.format = "something-else".to_string();
        let foreign = dir.path().join("foreign.json");
        snapshot.write(&foreign).unwrap();
        assert!(matches!(Snapshot::read(&foreign), Err(StoreError::Malformed { .. })));
    }

    #[test]
    fn test_snapshot_rejects_newer_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("future.json");
        let mut snapshot = Snapshot::new(entries()).unwrap();
        snapshot.version = SNAPSHOT_VERSION + 1;
        snapshot.write(&path).unwrap();

        assert!(matches!(
            Snapshot::read(&path),
            Err(StoreError::UnsupportedVersion { version, .. }) if version == SNAPSHOT_VERSION + 1
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = Snapshot::read(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(StoreError::Io { .. })));
    }
}
