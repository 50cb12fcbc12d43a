//! Preferences dialog core for Prefsuite
//!
//! A preferences dialog is a set of independent tabs, each owning a slice of
//! one shared `PreferenceStore`. This crate provides everything above the
//! individual tabs:
//! - `PreferenceTab`: the contract every tab implements
//! - `TabRegistry`: ordered tabs, selection and the visible (filtered) list
//! - `SearchIndex`: one-time label index used by the search box
//! - `SessionOrchestrator`: load/validate/save/reset/import/export
//! - `PreferencesDialog`: the single entry point the application shell opens
//! - `BackgroundTaskRunner`: cancellable background work for tabs
//!
//! Everything runs on the dialog's thread except background work, whose
//! results come back through `PreferencesDialog::pump_background_tasks`.

pub mod dialog;
pub mod dialogs;
pub mod error;
pub mod inspector;
pub mod layout;
pub mod registry;
pub mod search;
pub mod session;
pub mod tab;
pub mod task;

pub use dialog::PreferencesDialog;
pub use dialogs::{DialogMessage, DialogService, MessageLevel, ScriptedDialogs};
pub use error::{Operation, SessionError, TabError};
pub use inspector::{list_options, PreferenceOption};
pub use layout::{Control, Layout};
pub use registry::{TabRegistry, TabState};
pub use search::SearchIndex;
pub use session::{SaveOutcome, SessionOrchestrator};
pub use tab::PreferenceTab;
pub use task::{
    BackgroundTask, BackgroundTaskRunner, CancellationToken, InlineTaskRunner, Job, JobFinish,
    JobOutput, JobWork, PendingTasks, TaskError, TaskHandle, TaskId, ThreadTaskRunner,
};

pub use prefsuite_config::{DialogSettings, LoadFailurePolicy, ValidationMode};
pub use prefsuite_store::{PreferenceStore, PreferenceValue, StoreError};
