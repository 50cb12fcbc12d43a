//! Preference store for Prefsuite
//!
//! The dialog core never owns preference values. Everything it reads or
//! writes goes through the `PreferenceStore` trait defined here:
//! - `PreferenceValue`: the four value shapes a key can hold
//! - `PreferenceMap`: explicit values layered over built-in defaults
//! - `MemoryStore`: in-process store (tests, embedding)
//! - `JsonFileStore`: store persisted as JSON in the user config dir
//! - `Snapshot`: the whole-store export/import file

mod error;
mod file;
mod map;
mod memory;
mod snapshot;
mod store;
mod value;

pub use error::*;
pub use file::*;
pub use map::*;
pub use memory::*;
pub use snapshot::*;
pub use store::*;
pub use value::*;
