//! The contract every preferences tab implements.

use std::any::Any;

use prefsuite_store::PreferenceStore;

use crate::dialogs::DialogService;
use crate::error::TabError;
use crate::layout::Layout;

/// One self-contained settings panel.
///
/// Tabs hold their own in-memory state (what the widgets show). The store is
/// passed in on every call; tabs never keep a reference to it.
///
/// Lifecycle within one dialog session:
/// - `set_values` may run many times (open, after import, after reset)
/// - `validate_settings` may run any number of times
/// - `store_settings` runs at most once per save, and only after this tab's
///   own `validate_settings` returned true
/// - `restart_warnings` is read right after `store_settings`
pub trait PreferenceTab: Any {
    /// Stable, non-empty display name. Used for the tab list and search.
    fn name(&self) -> &str;

    /// Declared control tree, fixed at construction.
    fn layout(&self) -> &Layout;

    /// Pull current values from the store into the tab's state.
    ///
    /// Missing keys must fall back to defaults rather than fail. An error
    /// here means the stored data cannot be shown at all.
    fn set_values(&mut self, store: &dyn PreferenceStore) -> Result<(), TabError>;

    /// Check the in-memory state. No store access.
    ///
    /// A tab that returns false is responsible for telling the user why,
    /// typically through `dialogs.show_error`.
    fn validate_settings(&self, dialogs: &mut dyn DialogService) -> bool;

    /// Push the in-memory state into the store. Does not flush.
    fn store_settings(&mut self, store: &mut dyn PreferenceStore);

    /// Changes made by the last `store_settings` call that need a restart.
    fn restart_warnings(&self) -> Vec<String>;

    /// Access to the concrete tab, for shells that edit its fields.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
