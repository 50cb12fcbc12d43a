//! Load / validate / save / reset / import / export over every tab
//!
//! The orchestrator owns the registry, the store and the dialog service for
//! one dialog session. Each operation is a single call on `&mut self`, so
//! two operations can never interleave.
//!
//! Save is the only transactional step: either every tab passes validation
//! and every tab is stored followed by exactly one flush, or nothing is
//! written at all.

use std::path::Path;

use prefsuite_config::{DialogSettings, LoadFailurePolicy, ValidationMode};
use prefsuite_store::PreferenceStore;

use crate::dialogs::DialogService;
use crate::error::{Operation, SessionError};
use crate::inspector::{list_options, PreferenceOption};
use crate::registry::{TabRegistry, TabState};

pub const RESTART_TITLE: &str = "Restart required";
pub const RESTART_NOTICE: &str =
    "You must restart the application for this to come into effect.";
const SAVED_NOTICE: &str = "Preferences recorded.";
const RESET_QUESTION: &str = "Are you sure you want to reset all settings to default values?";

/// Result of a save attempt that did not hit a persistence error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Every tab was stored and the store flushed once
    Saved { restart_warnings: Vec<String> },
    /// Validation failed; nothing was written
    Invalid { failed_tabs: Vec<String> },
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved { .. })
    }
}

pub struct SessionOrchestrator<S, D> {
    registry: TabRegistry,
    store: S,
    dialogs: D,
    validation_mode: ValidationMode,
    load_failure: LoadFailurePolicy,
    /// Restart warnings of stored changes that have not reached a
    /// successful flush yet
    unflushed_warnings: Vec<String>,
}

impl<S: PreferenceStore, D: DialogService> SessionOrchestrator<S, D> {
    pub fn new(registry: TabRegistry, store: S, dialogs: D, settings: &DialogSettings) -> Self {
        Self {
            registry,
            store,
            dialogs,
            validation_mode: settings.validation_mode,
            load_failure: settings.load_failure,
            unflushed_warnings: Vec::new(),
        }
    }

    pub fn registry(&self) -> &TabRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TabRegistry {
        &mut self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn dialogs(&self) -> &D {
        &self.dialogs
    }

    pub fn dialogs_mut(&mut self) -> &mut D {
        &mut self.dialogs
    }

    /// Tear down the session. Tabs (and their background work) are dropped.
    pub fn into_store(self) -> S {
        self.store
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// `set_values` on every tab in registry order.
    pub fn load_all(&mut self) -> Result<(), SessionError> {
        for index in 0..self.registry.len() {
            self.load_tab(index)?;
        }
        log::debug!("Loaded {} tabs", self.registry.len());
        Ok(())
    }

    /// Load a single tab, applying the load failure policy.
    pub fn load_tab(&mut self, index: usize) -> Result<(), SessionError> {
        let Some((tab, _)) = self.registry.entry_mut(index) else {
            return Ok(());
        };

        match tab.set_values(&self.store) {
            Ok(()) => {
                self.registry.set_state(index, TabState::Populated);
                Ok(())
            }
            Err(source) => {
                let name = tab.name().to_string();
                match self.load_failure {
                    LoadFailurePolicy::Abort => {
                        log::error!("Tab '{}' failed to load: {}", name, source);
                        Err(SessionError::Load { tab: name, source })
                    }
                    LoadFailurePolicy::Isolate => {
                        log::warn!(
                            "Tab '{}' failed to load, continuing without it: {}",
                            name,
                            source
                        );
                        self.dialogs.show_warning(
                            Operation::Load.title(),
                            &format!("{}: {}", name, source),
                        );
                        self.registry.set_state(index, TabState::Degraded);
                        Ok(())
                    }
                }
            }
        }
    }

    // ========================================================================
    // Validate / save
    // ========================================================================

    /// True when every (non-degraded) tab accepts its current state.
    pub fn validate_all(&mut self) -> bool {
        self.find_invalid().is_empty()
    }

    /// Names of the tabs that failed validation. Fail-fast stops at the
    /// first one; collect-all asks every tab.
    fn find_invalid(&mut self) -> Vec<String> {
        let mut failed = Vec::new();

        for index in 0..self.registry.len() {
            let Some((tab, state)) = self.registry.entry_mut(index) else {
                continue;
            };
            if state == TabState::Degraded {
                continue;
            }

            if tab.validate_settings(&mut self.dialogs) {
                self.registry.set_state(index, TabState::Validated);
            } else {
                log::info!("Validation failed in tab '{}'", tab.name());
                failed.push(tab.name().to_string());
                self.registry.set_state(index, TabState::Populated);
                if self.validation_mode == ValidationMode::FailFast {
                    break;
                }
            }
        }

        failed
    }

    /// Validate every tab; if all pass, store every tab, flush once and
    /// tell the user what happened.
    pub fn save_all(&mut self) -> Result<SaveOutcome, SessionError> {
        let failed_tabs = self.find_invalid();
        if !failed_tabs.is_empty() {
            log::info!("Save aborted, nothing written");
            return Ok(SaveOutcome::Invalid { failed_tabs });
        }

        let restart_warnings = self.commit()?;

        if restart_warnings.is_empty() {
            self.dialogs.show_info(Operation::Save.title(), SAVED_NOTICE);
        } else {
            let notice = format!("{}\n\n{}", restart_warnings.join("\n"), RESTART_NOTICE);
            self.dialogs.show_warning(RESTART_TITLE, &notice);
        }

        Ok(SaveOutcome::Saved { restart_warnings })
    }

    /// Store every validated tab, then flush once. Restart warnings are
    /// collected in registry order and held until a flush succeeds.
    fn commit(&mut self) -> Result<Vec<String>, SessionError> {
        let mut stored = Vec::new();
        let mut fresh = Vec::new();
        for index in 0..self.registry.len() {
            let Some((tab, state)) = self.registry.entry_mut(index) else {
                continue;
            };
            if state != TabState::Validated {
                continue;
            }
            tab.store_settings(&mut self.store);
            fresh.extend(tab.restart_warnings());
            self.registry.set_state(index, TabState::Stored);
            stored.push(index);
        }

        // A retry may repeat what the failed attempt already reported
        fresh.retain(|w| !self.unflushed_warnings.contains(w));
        self.unflushed_warnings.extend(fresh);

        if let Err(source) = self.store.flush() {
            for index in stored {
                self.registry.set_state(index, TabState::Validated);
            }
            log::warn!(
                "Flush failed, keeping {} restart warning(s) for the next save",
                self.unflushed_warnings.len()
            );
            return Err(self.report(SessionError::Persistence {
                operation: Operation::Save,
                source,
            }));
        }

        let warnings = std::mem::take(&mut self.unflushed_warnings);
        log::info!(
            "Saved preferences ({} restart warning(s))",
            warnings.len()
        );
        Ok(warnings)
    }

    // ========================================================================
    // Reset / import / export
    // ========================================================================

    /// Ask, then return every key to its default and reload all tabs.
    /// Ok(false) when the user declined.
    pub fn reset_all(&mut self) -> Result<bool, SessionError> {
        let confirmed = self.dialogs.confirm(
            Operation::Reset.title(),
            RESET_QUESTION,
            Operation::Reset.title(),
            "Cancel",
        );
        if !confirmed {
            log::debug!("Reset declined");
            return Ok(false);
        }

        if let Err(source) = self.store.clear() {
            return Err(self.report(SessionError::Persistence {
                operation: Operation::Reset,
                source,
            }));
        }
        log::info!("Preferences reset to defaults");
        self.unflushed_warnings.clear();

        self.reload_after(Operation::Reset)?;
        Ok(true)
    }

    /// Replace the whole store from a snapshot and reload all tabs. On
    /// failure the store is unchanged.
    pub fn import_from(&mut self, path: &Path) -> Result<(), SessionError> {
        if let Err(source) = self.store.import_from(path) {
            return Err(self.report(SessionError::Persistence {
                operation: Operation::Import,
                source,
            }));
        }
        log::info!("Imported preferences from {}", path.display());
        self.unflushed_warnings.clear();

        self.reload_after(Operation::Import)
    }

    /// Save first so the file matches what the tabs show, then write the
    /// snapshot. Nothing is written when validation fails.
    pub fn export_to(&mut self, path: &Path) -> Result<SaveOutcome, SessionError> {
        let outcome = self.save_all()?;
        if !outcome.is_saved() {
            log::info!("Export skipped, preferences are invalid");
            return Ok(outcome);
        }

        if let Err(source) = self.store.export_to(path) {
            return Err(self.report(SessionError::Persistence {
                operation: Operation::Export,
                source,
            }));
        }
        log::info!("Exported preferences to {}", path.display());
        Ok(outcome)
    }

    /// Read-only listing of every preference.
    pub fn preference_options(&self, filter: &str) -> Vec<PreferenceOption> {
        list_options(&self.store, filter)
    }

    fn reload_after(&mut self, operation: Operation) -> Result<(), SessionError> {
        if let Err(e) = self.load_all() {
            return Err(self.report(e));
        }
        log::debug!("Reloaded tabs after {}", operation);
        self.dialogs.show_info(RESTART_TITLE, RESTART_NOTICE);
        Ok(())
    }

    /// Show an error dialog titled by the failing operation.
    pub(crate) fn report(&mut self, error: SessionError) -> SessionError {
        log::error!("{}", error);
        self.dialogs
            .show_error(error.operation().title(), &error.to_string());
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogs::{MessageLevel, ScriptedDialogs};
    use crate::error::TabError;
    use crate::layout::Layout;
    use crate::tab::PreferenceTab;
    use prefsuite_store::MemoryStore;
    use std::any::Any;

    /// Mirrors one string key; rejects empty values.
    struct Field {
        name: &'static str,
        key: &'static str,
        value: String,
        layout: Layout,
    }

    impl Field {
        fn boxed(name: &'static str, key: &'static str) -> Box<dyn PreferenceTab> {
            Box::new(Field { name, key, value: String::new(), layout: Layout::new() })
        }
    }

    impl PreferenceTab for Field {
        fn name(&self) -> &str {
            self.name
        }
        fn layout(&self) -> &Layout {
            &self.layout
        }
        fn set_values(&mut self, store: &dyn PreferenceStore) -> Result<(), TabError> {
            self.value = store.get(self.key);
            Ok(())
        }
        fn validate_settings(&self, dialogs: &mut dyn DialogService) -> bool {
            if self.value.is_empty() {
                dialogs.show_error(self.name, "Please specify a value");
                return false;
            }
            true
        }
        fn store_settings(&mut self, store: &mut dyn PreferenceStore) {
            store.put_string(self.key, &self.value);
        }
        fn restart_warnings(&self) -> Vec<String> {
            Vec::new()
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn session(settings: &DialogSettings) -> SessionOrchestrator<MemoryStore, ScriptedDialogs> {
        let store = MemoryStore::with_defaults([("a", "1".into()), ("b", "2".into())]);
        let registry =
            TabRegistry::from_tabs(vec![Field::boxed("A", "a"), Field::boxed("B", "b")]);
        let mut session =
            SessionOrchestrator::new(registry, store, ScriptedDialogs::new(), settings);
        session.load_all().unwrap();
        session
    }

    #[test]
    fn test_save_stores_and_flushes_once() {
        let mut session = session(&DialogSettings::default());
        let outcome = session.save_all().unwrap();

        assert_eq!(outcome, SaveOutcome::Saved { restart_warnings: vec![] });
        assert_eq!(session.store().flush_count(), 1);
        assert_eq!(session.registry().state(1), Some(TabState::Stored));
        assert_eq!(session.dialogs().last_message().unwrap().message, SAVED_NOTICE);
    }

    #[test]
    fn test_collect_all_reports_every_failing_tab() {
        let settings = DialogSettings {
            validation_mode: ValidationMode::CollectAll,
            ..DialogSettings::default()
        };
        let mut session = session(&settings);
        for index in 0..2 {
            session.registry_mut().downcast_mut::<Field>(index).unwrap().value.clear();
        }

        let outcome = session.save_all().unwrap();
        assert_eq!(
            outcome,
            SaveOutcome::Invalid { failed_tabs: vec!["A".to_string(), "B".to_string()] }
        );
        assert_eq!(session.dialogs().messages_at(MessageLevel::Error).len(), 2);
        assert_eq!(session.store().flush_count(), 0);
    }

    #[test]
    fn test_fail_fast_stops_at_first_failure() {
        let mut session = session(&DialogSettings::default());
        for index in 0..2 {
            session.registry_mut().downcast_mut::<Field>(index).unwrap().value.clear();
        }

        let outcome = session.save_all().unwrap();
        assert_eq!(outcome, SaveOutcome::Invalid { failed_tabs: vec!["A".to_string()] });
        assert_eq!(session.dialogs().messages_at(MessageLevel::Error).len(), 1);
    }

    #[test]
    fn test_declined_reset_changes_nothing() {
        let mut session = session(&DialogSettings::default());
        session.store_mut().put_string("a", "custom");

        assert!(!session.reset_all().unwrap());
        assert_eq!(session.store().get("a"), "custom");
        assert_eq!(session.dialogs().confirm_prompts(), ["Reset preferences"]);
    }
}
