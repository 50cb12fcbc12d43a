use std::fmt;
use std::path::PathBuf;

/// Error type for store persistence and snapshot operations.
#[derive(Debug)]
pub enum StoreError {
    /// File could not be read, written, or renamed
    Io { path: PathBuf, message: String },
    /// Store contents could not be serialized
    Serialize(String),
    /// Snapshot file is not valid JSON or not a snapshot at all
    Malformed { path: PathBuf, message: String },
    /// Snapshot was written by a newer format version
    UnsupportedVersion { path: PathBuf, version: u32 },
    /// Snapshot entries do not match the recorded checksum
    ChecksumMismatch { path: PathBuf },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        StoreError::Io { path: path.into(), message: err.to_string() }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        StoreError::Malformed { path: path.into(), message: message.into() }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io { path, message } => {
                write!(f, "I/O error on {}: {}", path.display(), message)
            }
            StoreError::Serialize(msg) => write!(f, "Serialization error: {}", msg),
            StoreError::Malformed { path, message } => {
                write!(f, "{} is not a valid preferences file: {}", path.display(), message)
            }
            StoreError::UnsupportedVersion { path, version } => write!(
                f,
                "{} uses snapshot version {}, which this version cannot read",
                path.display(),
                version
            ),
            StoreError::ChecksumMismatch { path } => {
                write!(f, "{} is corrupted (checksum mismatch)", path.display())
            }
        }
    }
}

impl std::error::Error for StoreError {}
