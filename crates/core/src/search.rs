//! Search over tab names and labels
//!
//! The index is built once from each tab's declared layout. Typing in the
//! search box only re-filters the index; it never walks the tabs again.
//! Rebuild (`SearchIndex::build`) only when the registry's tab set changes,
//! which `is_current` detects.

use crate::registry::TabRegistry;

/// Where an index entry's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySource {
    Name,
    Label,
}

/// One searchable text belonging to one tab.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    /// Position of the tab in the registry
    pub tab: usize,
    pub text: String,
    pub source: EntrySource,
    lowered: String,
}

impl IndexEntry {
    fn new(tab: usize, text: &str, source: EntrySource) -> Self {
        Self {
            tab,
            text: text.to_string(),
            source,
            lowered: text.to_lowercase(),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.lowered.contains(needle)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    entries: Vec<IndexEntry>,
    tab_count: usize,
    generation: u64,
}

impl SearchIndex {
    /// Walk every tab's name and layout once.
    pub fn build(registry: &TabRegistry) -> Self {
        let mut entries = Vec::new();
        for (position, tab) in registry.all().enumerate() {
            entries.push(IndexEntry::new(position, tab.name(), EntrySource::Name));
            for text in tab.layout().label_texts() {
                entries.push(IndexEntry::new(position, text, EntrySource::Label));
            }
        }

        log::debug!(
            "Built search index: {} entries over {} tabs",
            entries.len(),
            registry.len()
        );

        Self {
            entries,
            tab_count: registry.len(),
            generation: registry.generation(),
        }
    }

    /// False once tabs were added to the registry after this index was built.
    pub fn is_current(&self, registry: &TabRegistry) -> bool {
        self.generation == registry.generation()
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Tabs with at least one entry containing `query` (case-insensitive),
    /// in registry order. An empty query matches every tab.
    pub fn filter(&self, query: &str) -> Vec<usize> {
        let needle = normalize_query(query);
        if needle.is_empty() {
            return (0..self.tab_count).collect();
        }

        let mut hits: Vec<usize> = self
            .entries
            .iter()
            .filter(|entry| entry.matches(&needle))
            .map(|entry| entry.tab)
            .collect();
        hits.dedup();
        hits
    }

    /// Label texts of one tab that contain `query`, for highlighting.
    /// Empty for an empty query.
    pub fn matching_labels(&self, tab: usize, query: &str) -> Vec<&str> {
        let needle = normalize_query(query);
        if needle.is_empty() {
            return Vec::new();
        }

        self.entries
            .iter()
            .filter(|entry| {
                entry.tab == tab && entry.source == EntrySource::Label && entry.matches(&needle)
            })
            .map(|entry| entry.text.as_str())
            .collect()
    }
}

/// Queries are trimmed and lowercased before matching.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}
