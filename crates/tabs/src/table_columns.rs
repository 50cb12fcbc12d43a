//! Table columns tab: which columns the main table shows, in order.

use std::any::Any;
use std::collections::HashSet;

use prefsuite_core::{
    DialogService, Layout, PreferenceStore, PreferenceTab, PreferenceValue, TabError,
};

use crate::{report_invalid, StoredValues};

pub const COLUMNS: &str = "table.columns";
pub const SHOW_FILE_COLUMN: &str = "table.show_file_column";
pub const SHOW_URL_COLUMN: &str = "table.show_url_column";
pub const SPECIAL_FIELDS: &str = "table.special_fields";

const DEFAULT_COLUMNS: &[&str] = &["entrytype", "author", "title", "year", "journal"];

pub(crate) fn defaults() -> Vec<(&'static str, PreferenceValue)> {
    let columns: Vec<String> = DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect();
    vec![
        (COLUMNS, columns.into()),
        (SHOW_FILE_COLUMN, true.into()),
        (SHOW_URL_COLUMN, true.into()),
        (SPECIAL_FIELDS, false.into()),
    ]
}

pub struct TableColumnsTab {
    layout: Layout,
    loaded_special_fields: bool,
    restart_warnings: Vec<String>,

    /// Field names in display order
    pub columns: Vec<String>,
    pub show_file_column: bool,
    pub show_url_column: bool,
    pub special_fields: bool,
}

impl TableColumnsTab {
    pub fn new() -> Self {
        let layout = Layout::new()
            .group("Entry table columns", |g| {
                g.label("Field name")
                    .check_box("Show file column")
                    .check_box("Show URL/DOI column")
            })
            .group("Special table columns", |g| g.check_box("Enable special fields"));

        Self {
            layout,
            loaded_special_fields: false,
            restart_warnings: Vec::new(),
            columns: Vec::new(),
            show_file_column: true,
            show_url_column: true,
            special_fields: false,
        }
    }

    /// Move a column one position up. False at the top or out of range.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.columns.len() {
            return false;
        }
        self.columns.swap(index - 1, index);
        true
    }

    fn first_problem(&self) -> Option<String> {
        if self.columns.is_empty() {
            return Some("Please specify at least one column.".to_string());
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            let name = column.trim().to_lowercase();
            if name.is_empty() {
                return Some("Column names must not be empty.".to_string());
            }
            if !seen.insert(name) {
                return Some(format!("Column '{}' is listed more than once.", column.trim()));
            }
        }
        None
    }
}

impl Default for TableColumnsTab {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceTab for TableColumnsTab {
    fn name(&self) -> &str {
        "Table columns"
    }

    fn layout(&self) -> &Layout {
        &self.layout
    }

    fn set_values(&mut self, store: &dyn PreferenceStore) -> Result<(), TabError> {
        let store = StoredValues::new(store);
        self.columns = store.get_string_list(COLUMNS);
        self.show_file_column = store.get_boolean(SHOW_FILE_COLUMN);
        self.show_url_column = store.get_boolean(SHOW_URL_COLUMN);
        self.special_fields = store.get_boolean(SPECIAL_FIELDS);
        self.loaded_special_fields = self.special_fields;
        Ok(())
    }

    fn validate_settings(&self, dialogs: &mut dyn DialogService) -> bool {
        match self.first_problem() {
            Some(message) => {
                report_invalid(dialogs, "Table columns", "Entry table columns", &message);
                false
            }
            None => true,
        }
    }

    fn store_settings(&mut self, store: &mut dyn PreferenceStore) {
        self.restart_warnings.clear();

        let columns: Vec<String> = self.columns.iter().map(|c| c.trim().to_string()).collect();
        store.put_string_list(COLUMNS, &columns);
        store.put_boolean(SHOW_FILE_COLUMN, self.show_file_column);
        store.put_boolean(SHOW_URL_COLUMN, self.show_url_column);

        if self.special_fields != self.loaded_special_fields {
            self.restart_warnings
                .push("Changed special field settings".to_string());
            self.loaded_special_fields = self.special_fields;
        }
        store.put_boolean(SPECIAL_FIELDS, self.special_fields);
    }

    fn restart_warnings(&self) -> Vec<String> {
        self.restart_warnings.clone()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prefsuite_core::ScriptedDialogs;
    use prefsuite_store::MemoryStore;

    fn loaded() -> (TableColumnsTab, MemoryStore) {
        let store = MemoryStore::with_defaults(defaults());
        let mut tab = TableColumnsTab::new();
        tab.set_values(&store).unwrap();
        (tab, store)
    }

    #[test]
    fn test_columns_loaded_in_order() {
        let (tab, _) = loaded();
        assert_eq!(tab.columns, DEFAULT_COLUMNS);
    }

    #[test]
    fn test_rejects_empty_blank_and_duplicate() {
        let (mut tab, _) = loaded();
        let mut dialogs = ScriptedDialogs::new();
        assert!(tab.validate_settings(&mut dialogs));

        tab.columns.push("Author ".to_string());
        assert!(!tab.validate_settings(&mut dialogs));
        assert!(dialogs.last_message().unwrap().message.contains("'Author'"));

        tab.columns = vec!["title".to_string(), "  ".to_string()];
        assert!(!tab.validate_settings(&mut dialogs));

        tab.columns.clear();
        assert!(!tab.validate_settings(&mut dialogs));
        assert_eq!(
            dialogs.last_message().unwrap().title,
            "Table columns > Entry table columns"
        );
    }

    #[test]
    fn test_reorder_and_special_fields_warning() {
        let (mut tab, mut store) = loaded();
        assert!(tab.move_up(1));
        assert!(!tab.move_up(0));
        tab.special_fields = true;

        tab.store_settings(&mut store);
        assert_eq!(store.get_string_list(COLUMNS)[..2], ["author", "entrytype"]);
        assert_eq!(tab.restart_warnings(), vec!["Changed special field settings"]);
    }

    #[test]
    fn test_missing_columns_load_defaults() {
        let mut tab = TableColumnsTab::new();
        tab.set_values(&MemoryStore::new()).unwrap();
        assert_eq!(tab.columns, DEFAULT_COLUMNS);
        assert!(tab.show_file_column);
        assert!(tab.validate_settings(&mut ScriptedDialogs::new()));
    }
}
