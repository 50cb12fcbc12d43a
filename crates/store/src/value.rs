//! Preference values
//!
//! A key holds one of four shapes. JSON represents them naturally:
//! `true`, `42`, `"text"`, `["a", "b"]`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single stored preference value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreferenceValue {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<String>),
}

impl PreferenceValue {
    /// Declared type name, as shown by the option inspector.
    pub fn type_name(&self) -> &'static str {
        match self {
            PreferenceValue::Bool(_) => "boolean",
            PreferenceValue::Int(_) => "integer",
            PreferenceValue::Str(_) => "string",
            PreferenceValue::List(_) => "list",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PreferenceValue::Bool(b) => Some(*b),
            PreferenceValue::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PreferenceValue::Int(i) => Some(*i),
            PreferenceValue::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// String form of any value. Lists are joined with `;`.
    pub fn as_string(&self) -> String {
        match self {
            PreferenceValue::Str(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// List form. A scalar string becomes a one-element list unless empty.
    pub fn as_list(&self) -> Vec<String> {
        match self {
            PreferenceValue::List(items) => items.clone(),
            PreferenceValue::Str(s) if s.is_empty() => Vec::new(),
            other => vec![other.as_string()],
        }
    }
}

impl fmt::Display for PreferenceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferenceValue::Bool(b) => write!(f, "{}", b),
            PreferenceValue::Int(i) => write!(f, "{}", i),
            PreferenceValue::Str(s) => write!(f, "{}", s),
            PreferenceValue::List(items) => write!(f, "{}", items.join(";")),
        }
    }
}

impl From<bool> for PreferenceValue {
    fn from(value: bool) -> Self {
        PreferenceValue::Bool(value)
    }
}

impl From<i64> for PreferenceValue {
    fn from(value: i64) -> Self {
        PreferenceValue::Int(value)
    }
}

impl From<&str> for PreferenceValue {
    fn from(value: &str) -> Self {
        PreferenceValue::Str(value.to_string())
    }
}

impl From<String> for PreferenceValue {
    fn from(value: String) -> Self {
        PreferenceValue::Str(value)
    }
}

impl From<Vec<String>> for PreferenceValue {
    fn from(value: Vec<String>) -> Self {
        PreferenceValue::List(value)
    }
}
