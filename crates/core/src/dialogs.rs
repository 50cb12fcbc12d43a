//! User-facing dialogs requested by the core and by tabs.
//!
//! The shell implements `DialogService` with real modal windows.
//! `ScriptedDialogs` is a headless implementation: it records every message
//! and answers prompts from a queue, for automation and tests.

use std::collections::VecDeque;
use std::path::PathBuf;

use crate::inspector::PreferenceOption;

pub trait DialogService {
    fn show_info(&mut self, title: &str, message: &str);

    fn show_warning(&mut self, title: &str, message: &str);

    fn show_error(&mut self, title: &str, message: &str);

    /// Yes/no question. Returns true only for an explicit yes.
    fn confirm(&mut self, title: &str, message: &str, ok_label: &str, cancel_label: &str) -> bool;

    /// File picker for reading. None when the user cancels.
    fn choose_open_file(&mut self, title: &str) -> Option<PathBuf>;

    /// File picker for writing. None when the user cancels.
    fn choose_save_file(&mut self, title: &str, default_name: &str) -> Option<PathBuf>;

    /// Read-only listing of every preference.
    fn show_options(&mut self, options: &[PreferenceOption]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogMessage {
    pub level: MessageLevel,
    pub title: String,
    pub message: String,
}

/// Headless dialog service with scripted answers.
///
/// Unanswered confirmations are declined and unanswered file pickers are
/// cancelled.
#[derive(Debug, Default)]
pub struct ScriptedDialogs {
    messages: Vec<DialogMessage>,
    confirm_answers: VecDeque<bool>,
    open_files: VecDeque<PathBuf>,
    save_files: VecDeque<PathBuf>,
    confirm_prompts: Vec<String>,
    shown_options: Vec<Vec<PreferenceOption>>,
}

impl ScriptedDialogs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer for the next confirmation.
    pub fn answer_confirm(mut self, answer: bool) -> Self {
        self.confirm_answers.push_back(answer);
        self
    }

    /// Queue the path the next open-file picker returns.
    pub fn pick_open_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.open_files.push_back(path.into());
        self
    }

    /// Queue the path the next save-file picker returns.
    pub fn pick_save_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_files.push_back(path.into());
        self
    }

    pub fn messages(&self) -> &[DialogMessage] {
        &self.messages
    }

    pub fn messages_at(&self, level: MessageLevel) -> Vec<&DialogMessage> {
        self.messages.iter().filter(|m| m.level == level).collect()
    }

    pub fn last_message(&self) -> Option<&DialogMessage> {
        self.messages.last()
    }

    /// Titles of every confirmation asked so far.
    pub fn confirm_prompts(&self) -> &[String] {
        &self.confirm_prompts
    }

    /// Each listing passed to `show_options`.
    pub fn shown_options(&self) -> &[Vec<PreferenceOption>] {
        &self.shown_options
    }

    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }

    fn record(&mut self, level: MessageLevel, title: &str, message: &str) {
        log::debug!("[{:?}] {}: {}", level, title, message);
        self.messages.push(DialogMessage {
            level,
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}

impl DialogService for ScriptedDialogs {
    fn show_info(&mut self, title: &str, message: &str) {
        self.record(MessageLevel::Info, title, message);
    }

    fn show_warning(&mut self, title: &str, message: &str) {
        self.record(MessageLevel::Warning, title, message);
    }

    fn show_error(&mut self, title: &str, message: &str) {
        self.record(MessageLevel::Error, title, message);
    }

    fn confirm(
        &mut self,
        title: &str,
        _message: &str,
        _ok_label: &str,
        _cancel_label: &str,
    ) -> bool {
        self.confirm_prompts.push(title.to_string());
        self.confirm_answers.pop_front().unwrap_or(false)
    }

    fn choose_open_file(&mut self, _title: &str) -> Option<PathBuf> {
        self.open_files.pop_front()
    }

    fn choose_save_file(&mut self, _title: &str, _default_name: &str) -> Option<PathBuf> {
        self.save_files.pop_front()
    }

    fn show_options(&mut self, options: &[PreferenceOption]) {
        self.shown_options.push(options.to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_answers_then_defaults() {
        let mut dialogs = ScriptedDialogs::new()
            .answer_confirm(true)
            .pick_open_file("/tmp/a.json");

        assert!(dialogs.confirm("Reset", "Sure?", "Reset", "Cancel"));
        assert!(!dialogs.confirm("Reset", "Sure?", "Reset", "Cancel"));
        assert_eq!(dialogs.confirm_prompts(), ["Reset", "Reset"]);

        assert_eq!(dialogs.choose_open_file("Import"), Some(PathBuf::from("/tmp/a.json")));
        assert_eq!(dialogs.choose_open_file("Import"), None);
        assert_eq!(dialogs.choose_save_file("Export", "x.json"), None);
    }

    #[test]
    fn test_messages_recorded_by_level() {
        let mut dialogs = ScriptedDialogs::new();
        dialogs.show_info("Preferences", "Saved");
        dialogs.show_error("Network", "Please specify a port");

        assert_eq!(dialogs.messages().len(), 2);
        assert_eq!(dialogs.messages_at(MessageLevel::Error)[0].title, "Network");
        assert_eq!(dialogs.last_message().unwrap().message, "Please specify a port");
    }
}
