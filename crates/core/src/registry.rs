//! Ordered holder of all tabs for one dialog session.

use crate::tab::PreferenceTab;

/// Where a tab is in its per-session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabState {
    /// Constructed, values not loaded yet
    Created,
    /// Values pulled from the store
    Populated,
    /// Handed out for editing since the last load or store
    Edited,
    /// Passed validation in the current save
    Validated,
    /// Values pushed to the store
    Stored,
    /// Load failed; skipped by validation and storing
    Degraded,
}

struct RegisteredTab {
    tab: Box<dyn PreferenceTab>,
    state: TabState,
}

/// Tabs in insertion order, plus the search filter and the selection.
///
/// The registry owns its tabs; dropping it drops every tab (and with them
/// any background work the tabs still own).
pub struct TabRegistry {
    tabs: Vec<RegisteredTab>,
    /// Positions passing the active filter; None = no filter
    filter: Option<Vec<usize>>,
    selected: Option<usize>,
    /// Bumped whenever the tab set changes
    generation: u64,
}

impl TabRegistry {
    pub fn new() -> Self {
        Self {
            tabs: Vec::new(),
            filter: None,
            selected: None,
            generation: 0,
        }
    }

    pub fn from_tabs(tabs: Vec<Box<dyn PreferenceTab>>) -> Self {
        let mut registry = Self::new();
        for tab in tabs {
            registry.add(tab);
        }
        registry
    }

    /// Append a tab. The first tab ever added starts selected.
    pub fn add(&mut self, tab: Box<dyn PreferenceTab>) -> usize {
        debug_assert!(!tab.name().is_empty(), "tab names must not be empty");
        self.tabs.push(RegisteredTab { tab, state: TabState::Created });
        self.generation += 1;
        let index = self.tabs.len() - 1;
        if self.selected.is_none() && self.filter.is_none() {
            self.selected = Some(index);
        }
        index
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Every tab in insertion order.
    pub fn all(&self) -> impl Iterator<Item = &dyn PreferenceTab> + '_ {
        self.tabs.iter().map(|entry| entry.tab.as_ref())
    }

    /// Tabs passing the active filter, in insertion order.
    pub fn visible(&self) -> Vec<&dyn PreferenceTab> {
        self.visible_indices()
            .into_iter()
            .map(|i| self.tabs[i].tab.as_ref())
            .collect()
    }

    pub fn visible_indices(&self) -> Vec<usize> {
        match &self.filter {
            Some(indices) => indices.clone(),
            None => (0..self.tabs.len()).collect(),
        }
    }

    pub fn is_visible(&self, index: usize) -> bool {
        match &self.filter {
            Some(indices) => indices.contains(&index),
            None => index < self.tabs.len(),
        }
    }

    pub fn is_filtered(&self) -> bool {
        self.filter.is_some()
    }

    pub fn tab(&self, index: usize) -> Option<&dyn PreferenceTab> {
        self.tabs.get(index).map(|entry| entry.tab.as_ref())
    }

    /// Mutable access for editing. Marks the tab edited.
    pub fn tab_mut(&mut self, index: usize) -> Option<&mut dyn PreferenceTab> {
        let entry = self.tabs.get_mut(index)?;
        if entry.state != TabState::Degraded {
            entry.state = TabState::Edited;
        }
        Some(entry.tab.as_mut())
    }

    /// Mutable access to the concrete tab type. Marks the tab edited.
    pub fn downcast_mut<T: PreferenceTab>(&mut self, index: usize) -> Option<&mut T> {
        self.tab_mut(index)?.as_any_mut().downcast_mut::<T>()
    }

    /// Position of the first tab with this name.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.tabs.iter().position(|entry| entry.tab.name() == name)
    }

    pub fn state(&self, index: usize) -> Option<TabState> {
        self.tabs.get(index).map(|entry| entry.state)
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_tab(&self) -> Option<&dyn PreferenceTab> {
        self.selected.and_then(|i| self.tab(i))
    }

    /// Select a visible tab. Returns false if it is hidden or out of range.
    pub fn select(&mut self, index: usize) -> bool {
        if !self.is_visible(index) {
            return false;
        }
        self.selected = Some(index);
        true
    }

    /// Restrict the visible list to `indices` (kept in registry order).
    ///
    /// If the selected tab is filtered out, the first visible tab becomes
    /// selected (none if nothing matches).
    pub fn set_filter(&mut self, mut indices: Vec<usize>) {
        indices.retain(|&i| i < self.tabs.len());
        indices.sort_unstable();
        indices.dedup();

        if !self.selected.is_some_and(|s| indices.contains(&s)) {
            self.selected = indices.first().copied();
        }
        self.filter = Some(indices);
    }

    /// Show every tab again. With nothing selected, the first tab is.
    pub fn clear_filter(&mut self) {
        self.filter = None;
        if self.selected.is_none() && !self.tabs.is_empty() {
            self.selected = Some(0);
        }
    }

    pub(crate) fn set_state(&mut self, index: usize, state: TabState) {
        if let Some(entry) = self.tabs.get_mut(index) {
            entry.state = state;
        }
    }

    pub(crate) fn entry_mut(&mut self, index: usize) -> Option<(&mut dyn PreferenceTab, TabState)> {
        self.tabs
            .get_mut(index)
            .map(|entry| (entry.tab.as_mut(), entry.state))
    }
}

impl Default for TabRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogs::DialogService;
    use crate::error::TabError;
    use crate::layout::Layout;
    use prefsuite_store::PreferenceStore;
    use std::any::Any;

    struct Named {
        name: &'static str,
        layout: Layout,
        touched: bool,
    }

    impl PreferenceTab for Named {
        fn name(&self) -> &str {
            self.name
        }
        fn layout(&self) -> &Layout {
            &self.layout
        }
        fn set_values(&mut self, _store: &dyn PreferenceStore) -> Result<(), TabError> {
            Ok(())
        }
        fn validate_settings(&self, _dialogs: &mut dyn DialogService) -> bool {
            true
        }
        fn store_settings(&mut self, _store: &mut dyn PreferenceStore) {}
        fn restart_warnings(&self) -> Vec<String> {
            Vec::new()
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn registry() -> TabRegistry {
        TabRegistry::from_tabs(
            ["General", "Network", "Advanced"]
                .into_iter()
                .map(|name| {
                    Box::new(Named { name, layout: Layout::new(), touched: false })
                        as Box<dyn PreferenceTab>
                })
                .collect(),
        )
    }

    fn names(registry: &TabRegistry) -> Vec<&str> {
        registry.visible().iter().map(|t| t.name()).collect()
    }

    #[test]
    fn test_insertion_order_and_first_selected() {
        let registry = registry();
        assert_eq!(names(&registry), vec!["General", "Network", "Advanced"]);
        assert_eq!(registry.selected(), Some(0));
        assert_eq!(registry.state(1), Some(TabState::Created));
        assert_eq!(registry.generation(), 3);
    }

    #[test]
    fn test_filter_moves_hidden_selection() {
        let mut registry = registry();
        registry.set_filter(vec![2, 1, 2, 9]);
        assert_eq!(names(&registry), vec!["Network", "Advanced"]);
        assert_eq!(registry.selected(), Some(1));

        // Selection still visible: untouched
        assert!(registry.select(2));
        registry.set_filter(vec![2]);
        assert_eq!(registry.selected(), Some(2));

        assert!(!registry.select(0), "hidden tabs cannot be selected");

        registry.set_filter(Vec::new());
        assert!(registry.visible().is_empty());
        assert_eq!(registry.selected(), None);

        registry.clear_filter();
        assert_eq!(names(&registry), vec!["General", "Network", "Advanced"]);
        assert_eq!(registry.selected(), Some(0));
    }

    #[test]
    fn test_downcast_marks_edited() {
        let mut registry = registry();
        let index = registry.find("Network").unwrap();
        registry.downcast_mut::<Named>(index).unwrap().touched = true;
        assert_eq!(registry.state(index), Some(TabState::Edited));
        assert!(registry.downcast_mut::<Named>(index).unwrap().touched);
        assert_eq!(registry.state(0), Some(TabState::Created));
    }
}
