//! The preferences dialog as seen by the application shell.
//!
//! One `open` call, then one method per on-screen action. The shell draws
//! `visible_tab_names()` and the selected tab, forwards the search box to
//! `set_search_query`, and calls `pump_background_tasks` from its event loop
//! so tabs receive the results of their background work.

use std::path::PathBuf;
use std::rc::Rc;

use prefsuite_config::DialogSettings;
use prefsuite_store::PreferenceStore;

use crate::dialogs::DialogService;
use crate::error::{Operation, SessionError};
use crate::registry::TabRegistry;
use crate::search::{normalize_query, SearchIndex};
use crate::session::{SaveOutcome, SessionOrchestrator};
use crate::tab::PreferenceTab;
use crate::task::BackgroundTaskRunner;

/// Suggested file name for exports.
pub const EXPORT_FILE_NAME: &str = "prefsuite-preferences.json";

pub struct PreferencesDialog<S, D> {
    session: SessionOrchestrator<S, D>,
    index: SearchIndex,
    query: String,
    runner: Rc<dyn BackgroundTaskRunner>,
}

impl<S: PreferenceStore, D: DialogService> PreferencesDialog<S, D> {
    /// Build the dialog and load every tab from the store.
    ///
    /// With the `Abort` load policy a failing tab keeps the dialog from
    /// opening; the error is shown before it is returned.
    pub fn open(
        store: S,
        dialogs: D,
        tabs: Vec<Box<dyn PreferenceTab>>,
        runner: Rc<dyn BackgroundTaskRunner>,
        settings: &DialogSettings,
    ) -> Result<Self, SessionError> {
        let registry = TabRegistry::from_tabs(tabs);
        let index = SearchIndex::build(&registry);
        let mut session = SessionOrchestrator::new(registry, store, dialogs, settings);

        if let Err(e) = session.load_all() {
            return Err(session.report(e));
        }

        log::info!("Opened preferences with {} tabs", session.registry().len());
        Ok(Self {
            session,
            index,
            query: String::new(),
            runner,
        })
    }

    pub fn session(&self) -> &SessionOrchestrator<S, D> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionOrchestrator<S, D> {
        &mut self.session
    }

    pub fn registry(&self) -> &TabRegistry {
        self.session.registry()
    }

    pub fn registry_mut(&mut self) -> &mut TabRegistry {
        self.session.registry_mut()
    }

    pub fn runner(&self) -> &Rc<dyn BackgroundTaskRunner> {
        &self.runner
    }

    /// Add a tab after opening. It is loaded right away and the active
    /// query is applied to the new tab set.
    pub fn add_tab(&mut self, tab: Box<dyn PreferenceTab>) -> Result<usize, SessionError> {
        let index = self.session.registry_mut().add(tab);
        if let Err(e) = self.session.load_tab(index) {
            return Err(self.session.report(e));
        }
        let query = std::mem::take(&mut self.query);
        self.set_search_query(&query);
        Ok(index)
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Filter the tab list. An empty query shows every tab.
    pub fn set_search_query(&mut self, query: &str) {
        if !self.index.is_current(self.session.registry()) {
            self.index = SearchIndex::build(self.session.registry());
        }

        self.query = query.to_string();
        let registry = self.session.registry_mut();
        if normalize_query(query).is_empty() {
            registry.clear_filter();
        } else {
            registry.set_filter(self.index.filter(query));
        }
    }

    pub fn search_query(&self) -> &str {
        &self.query
    }

    pub fn visible_tab_names(&self) -> Vec<&str> {
        self.session
            .registry()
            .visible()
            .into_iter()
            .map(|tab| tab.name())
            .collect()
    }

    /// Labels of one tab matching the active query, for highlighting.
    pub fn matching_labels(&self, tab: usize) -> Vec<&str> {
        self.index.matching_labels(tab, &self.query)
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// Save every tab. The shell closes the dialog when the outcome is
    /// `Saved`.
    pub fn save(&mut self) -> Result<SaveOutcome, SessionError> {
        self.session.save_all()
    }

    /// Pick a snapshot file and import it. Ok(false) when the picker was
    /// cancelled.
    pub fn import(&mut self) -> Result<bool, SessionError> {
        let Some(path) = self.session.dialogs_mut().choose_open_file(Operation::Import.title())
        else {
            return Ok(false);
        };
        self.session.import_from(&path)?;
        Ok(true)
    }

    /// Pick a destination, save, then export. Returns the written path, or
    /// None when the picker was cancelled or validation failed.
    pub fn export(&mut self) -> Result<Option<PathBuf>, SessionError> {
        let Some(path) = self
            .session
            .dialogs_mut()
            .choose_save_file(Operation::Export.title(), EXPORT_FILE_NAME)
        else {
            return Ok(None);
        };

        let outcome = self.session.export_to(&path)?;
        Ok(outcome.is_saved().then_some(path))
    }

    /// Open the read-only inspector over every preference.
    pub fn show_all_preferences(&mut self, filter: &str) {
        let options = self.session.preference_options(filter);
        self.session.dialogs_mut().show_options(&options);
    }

    pub fn reset(&mut self) -> Result<bool, SessionError> {
        self.session.reset_all()
    }

    /// Deliver finished background work to the tabs that started it.
    pub fn pump_background_tasks(&mut self) -> usize {
        self.runner.dispatch_completed()
    }

    /// Close without saving. Tabs are dropped, which cancels their
    /// background work; unsaved edits are discarded.
    pub fn close(self) -> S {
        log::debug!("Closing preferences ({} pending tasks)", self.runner.pending());
        self.session.into_store()
    }
}
