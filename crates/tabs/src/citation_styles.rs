//! Citation styles tab
//!
//! The user points the tab at a directory of CSL files and picks one. The
//! directory is scanned on a background task each time the tab loads; until
//! the scan finishes the tab shows whatever it has and never blocks saving.

use std::any::Any;
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use prefsuite_core::{
    BackgroundTask, BackgroundTaskRunner, DialogService, Layout, PreferenceStore, PreferenceTab,
    PreferenceValue, TabError, TaskError, TaskHandle,
};

use crate::{report_invalid, StoredValues};

pub const STYLE_DIRECTORY: &str = "citation.style_directory";
pub const SELECTED_STYLE: &str = "citation.selected_style";

const DEFAULT_STYLE: &str = "ieee.csl";

pub(crate) fn defaults() -> Vec<(&'static str, PreferenceValue)> {
    vec![
        (STYLE_DIRECTORY, "".into()),
        (SELECTED_STYLE, DEFAULT_STYLE.into()),
    ]
}

/// State of the background scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleDiscovery {
    /// No directory configured
    Idle,
    Pending,
    Ready(Vec<String>),
    Failed(String),
}

/// Sorted `*.csl` file names directly inside `dir`.
pub fn discover_styles(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut styles: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name.to_lowercase().ends_with(".csl"))
        .collect();
    styles.sort();
    Ok(styles)
}

pub struct CitationStylesTab {
    layout: Layout,
    runner: Rc<dyn BackgroundTaskRunner>,
    discovery: Rc<RefCell<StyleDiscovery>>,
    /// Scan in flight; replaced (and so cancelled) on every reload
    scan: Option<TaskHandle>,

    pub style_directory: String,
    pub selected_style: String,
}

impl CitationStylesTab {
    pub fn new(runner: Rc<dyn BackgroundTaskRunner>) -> Self {
        let layout = Layout::new()
            .text_field("Style directory")
            .choice("Preview style")
            .label("Styles are read from *.csl files in the style directory");

        Self {
            layout,
            runner,
            discovery: Rc::new(RefCell::new(StyleDiscovery::Idle)),
            scan: None,
            style_directory: String::new(),
            selected_style: DEFAULT_STYLE.to_string(),
        }
    }

    pub fn discovery(&self) -> StyleDiscovery {
        self.discovery.borrow().clone()
    }

    /// Styles found so far (empty while the scan is pending).
    pub fn available_styles(&self) -> Vec<String> {
        match &*self.discovery.borrow() {
            StyleDiscovery::Ready(styles) => styles.clone(),
            _ => Vec::new(),
        }
    }

    /// Start scanning the current directory, dropping any earlier scan.
    pub fn rescan(&mut self) {
        self.scan = None;

        let dir = self.style_directory.trim().to_string();
        if dir.is_empty() {
            *self.discovery.borrow_mut() = StyleDiscovery::Idle;
            return;
        }

        *self.discovery.borrow_mut() = StyleDiscovery::Pending;
        let on_ready = Rc::clone(&self.discovery);
        let on_error = Rc::clone(&self.discovery);

        let handle = BackgroundTask::new(move |_token| {
            discover_styles(Path::new(&dir))
                .map_err(|e| TaskError::Failed(format!("{}: {}", dir, e)))
        })
        .on_success(move |styles: Vec<String>| {
            log::debug!("Found {} citation styles", styles.len());
            *on_ready.borrow_mut() = StyleDiscovery::Ready(styles);
        })
        .on_failure(move |e| {
            *on_error.borrow_mut() = StyleDiscovery::Failed(e.to_string());
        })
        .run(self.runner.as_ref());

        self.scan = Some(handle);
    }
}

impl PreferenceTab for CitationStylesTab {
    fn name(&self) -> &str {
        "Citation styles"
    }

    fn layout(&self) -> &Layout {
        &self.layout
    }

    fn set_values(&mut self, store: &dyn PreferenceStore) -> Result<(), TabError> {
        let store = StoredValues::new(store);
        self.style_directory = store.get(STYLE_DIRECTORY);
        self.selected_style = store.get(SELECTED_STYLE);
        self.rescan();
        Ok(())
    }

    fn validate_settings(&self, dialogs: &mut dyn DialogService) -> bool {
        if self.selected_style.trim().is_empty() {
            report_invalid(
                dialogs,
                "Citation styles",
                "Preview style",
                "Please select a citation style.",
            );
            return false;
        }

        // Only a finished scan can prove a style missing
        if let StyleDiscovery::Ready(styles) = &*self.discovery.borrow() {
            let selected = self.selected_style.trim();
            if !styles.is_empty() && !styles.iter().any(|s| s == selected) {
                report_invalid(
                    dialogs,
                    "Citation styles",
                    "Preview style",
                    &format!("Style '{}' was not found in the style directory.", selected),
                );
                return false;
            }
        }

        true
    }

    fn store_settings(&mut self, store: &mut dyn PreferenceStore) {
        store.put_string(STYLE_DIRECTORY, self.style_directory.trim());
        store.put_string(SELECTED_STYLE, self.selected_style.trim());
    }

    fn restart_warnings(&self) -> Vec<String> {
        Vec::new()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
