use std::fmt;

use prefsuite_store::StoreError;

/// A tab could not load its values from the store.
#[derive(Debug)]
pub enum TabError {
    /// A stored value cannot be represented by the tab
    BadValue { key: String, value: String, reason: String },
    /// Any other load problem
    Failed(String),
}

impl fmt::Display for TabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabError::BadValue { key, value, reason } => {
                write!(f, "invalid value '{}' for '{}': {}", value, key, reason)
            }
            TabError::Failed(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for TabError {}

/// Dialog operation, used to name the failing step in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Save,
    Reset,
    Import,
    Export,
}

impl Operation {
    /// Title for the error dialog reporting a failure of this operation.
    pub fn title(&self) -> &'static str {
        match self {
            Operation::Load => "Load preferences",
            Operation::Save => "Save preferences",
            Operation::Reset => "Reset preferences",
            Operation::Import => "Import preferences",
            Operation::Export => "Export preferences",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Load => "load",
            Operation::Save => "save",
            Operation::Reset => "reset",
            Operation::Import => "import",
            Operation::Export => "export",
        };
        write!(f, "{}", name)
    }
}

/// Error type for session operations.
#[derive(Debug)]
pub enum SessionError {
    /// A tab failed to load and the load policy is `Abort`
    Load { tab: String, source: TabError },
    /// The store could not persist, import, export, or reset
    Persistence { operation: Operation, source: StoreError },
}

impl SessionError {
    pub fn operation(&self) -> Operation {
        match self {
            SessionError::Load { .. } => Operation::Load,
            SessionError::Persistence { operation, .. } => *operation,
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Load { tab, source } => {
                write!(f, "Could not load tab '{}': {}", tab, source)
            }
            SessionError::Persistence { operation, source } => {
                write!(f, "Could not {} preferences: {}", operation, source)
            }
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Load { source, .. } => Some(source),
            SessionError::Persistence { source, .. } => Some(source),
        }
    }
}
