//! Reference preference tabs
//!
//! Four panels implementing `PreferenceTab` against the shared store:
//! - `GeneralTab`: language, font size, theme, startup behavior
//! - `NetworkTab`: remote operation port and proxy settings
//! - `TableColumnsTab`: ordered main table columns
//! - `CitationStylesTab`: style directory scanned in the background
//!
//! Widget state lives in public fields; the shell edits them through
//! `TabRegistry::downcast_mut` and the dialog core takes it from there.

use std::rc::Rc;

use prefsuite_core::{
    BackgroundTaskRunner, DialogService, DialogSettings, PreferenceStore, PreferenceTab,
    PreferenceValue,
};
use prefsuite_store::JsonFileStore;

pub mod citation_styles;
pub mod general;
pub mod network;
pub mod table_columns;

pub use citation_styles::{CitationStylesTab, StyleDiscovery};
pub use general::{GeneralTab, Theme};
pub use network::NetworkTab;
pub use table_columns::TableColumnsTab;

/// Every tab in dialog order.
pub fn default_tabs(runner: &Rc<dyn BackgroundTaskRunner>) -> Vec<Box<dyn PreferenceTab>> {
    vec![
        Box::new(GeneralTab::new()),
        Box::new(NetworkTab::new()),
        Box::new(TableColumnsTab::new()),
        Box::new(CitationStylesTab::new(Rc::clone(runner))),
    ]
}

/// Built-in defaults for every key the reference tabs use.
pub fn default_preferences() -> Vec<(&'static str, PreferenceValue)> {
    let mut defaults = general::defaults();
    defaults.extend(network::defaults());
    defaults.extend(table_columns::defaults());
    defaults.extend(citation_styles::defaults());
    defaults
}

/// The user's preference file (see `DialogSettings::preferences_path`),
/// with the reference defaults layered underneath.
pub fn open_store(settings: &DialogSettings) -> JsonFileStore {
    JsonFileStore::open(settings.preferences_path(), default_preferences())
}

/// Read access for `set_values`: the store's value when it has one, else
/// the reference default for that key.
///
/// Tabs must load from a store that carries no defaults layer at all.
pub(crate) struct StoredValues<'a> {
    store: &'a dyn PreferenceStore,
}

impl<'a> StoredValues<'a> {
    pub(crate) fn new(store: &'a dyn PreferenceStore) -> Self {
        Self { store }
    }

    /// The store's value, if it holds one.
    fn explicit(&self, key: &str) -> Option<PreferenceValue> {
        self.store.value(key)
    }

    fn fallback(key: &str) -> Option<PreferenceValue> {
        default_preferences()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    pub(crate) fn get(&self, key: &str) -> String {
        self.explicit(key)
            .or_else(|| Self::fallback(key))
            .map(|v| v.as_string())
            .unwrap_or_default()
    }

    /// A stored value of the wrong shape also falls back to the default.
    pub(crate) fn get_boolean(&self, key: &str) -> bool {
        self.explicit(key)
            .and_then(|v| v.as_bool())
            .or_else(|| Self::fallback(key).and_then(|v| v.as_bool()))
            .unwrap_or(false)
    }

    pub(crate) fn get_int(&self, key: &str) -> i64 {
        self.explicit(key)
            .and_then(|v| v.as_int())
            .or_else(|| Self::fallback(key).and_then(|v| v.as_int()))
            .unwrap_or(0)
    }

    pub(crate) fn get_string_list(&self, key: &str) -> Vec<String> {
        self.explicit(key)
            .or_else(|| Self::fallback(key))
            .map(|v| v.as_list())
            .unwrap_or_default()
    }
}

/// Validation error in the "Tab > Section" form the dialog uses.
pub(crate) fn report_invalid(
    dialogs: &mut dyn DialogService,
    tab: &str,
    section: &str,
    message: &str,
) {
    dialogs.show_error(&format!("{} > {}", tab, section), message);
}
