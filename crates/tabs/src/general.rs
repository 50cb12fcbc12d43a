//! General tab: language, fonts, theme and startup behavior.

use std::any::Any;

use prefsuite_core::{
    DialogService, Layout, PreferenceStore, PreferenceTab, PreferenceValue, TabError,
};

use crate::{report_invalid, StoredValues};

pub const LANGUAGE: &str = "general.language";
pub const FONT_SIZE_OVERRIDE: &str = "general.font_size_override";
pub const FONT_SIZE: &str = "general.font_size";
pub const THEME: &str = "general.theme";
pub const THEME_PATH: &str = "general.theme_path";
pub const OPEN_LAST_EDITED: &str = "general.open_last_edited";
pub const CONFIRM_DELETE: &str = "general.confirm_delete";

const DEFAULT_FONT_SIZE: i64 = 9;
const MIN_FONT_SIZE: i64 = 8;

/// Supported UI languages: (code, display name).
pub const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("de", "German"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("it", "Italian"),
    ("sv", "Swedish"),
];

pub(crate) fn defaults() -> Vec<(&'static str, PreferenceValue)> {
    vec![
        (LANGUAGE, "en".into()),
        (FONT_SIZE_OVERRIDE, false.into()),
        (FONT_SIZE, DEFAULT_FONT_SIZE.into()),
        (THEME, Theme::Light.as_str().into()),
        (THEME_PATH, "".into()),
        (OPEN_LAST_EDITED, true.into()),
        (CONFIRM_DELETE, true.into()),
    ]
}

pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
    /// User-supplied stylesheet at `theme_path`
    Custom,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Custom => "custom",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            "custom" => Some(Theme::Custom),
            _ => None,
        }
    }
}

pub struct GeneralTab {
    layout: Layout,
    /// Language code as stored when the tab was last loaded
    loaded_language: String,
    restart_warnings: Vec<String>,

    pub language: String,
    pub font_size_override: bool,
    /// Text field contents; parsed on validate
    pub font_size: String,
    pub theme: Theme,
    pub theme_path: String,
    pub open_last_edited: bool,
    pub confirm_delete: bool,
}

impl GeneralTab {
    pub fn new() -> Self {
        let layout = Layout::new()
            .choice("Language")
            .group("Font settings", |g| {
                g.check_box("Override default font settings").text_field("Size")
            })
            .group("Visual theme", |g| {
                g.choice("Light theme")
                    .choice("Dark theme")
                    .choice("Custom theme")
                    .text_field("Path to custom theme")
            })
            .heading("Startup")
            .check_box("Open last edited libraries on startup")
            .check_box("Show confirmation dialog when deleting entries");

        Self {
            layout,
            loaded_language: String::new(),
            restart_warnings: Vec::new(),
            language: "en".to_string(),
            font_size_override: false,
            font_size: DEFAULT_FONT_SIZE.to_string(),
            theme: Theme::Light,
            theme_path: String::new(),
            open_last_edited: true,
            confirm_delete: true,
        }
    }
}

impl Default for GeneralTab {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceTab for GeneralTab {
    fn name(&self) -> &str {
        "General"
    }

    fn layout(&self) -> &Layout {
        &self.layout
    }

    fn set_values(&mut self, store: &dyn PreferenceStore) -> Result<(), TabError> {
        let store = StoredValues::new(store);
        let language = store.get(LANGUAGE);
        if language_name(&language).is_none() {
            return Err(TabError::BadValue {
                key: LANGUAGE.to_string(),
                value: language,
                reason: "unknown language".to_string(),
            });
        }

        let theme = store.get(THEME);
        self.theme = Theme::parse(&theme).unwrap_or_else(|| {
            log::warn!("Unknown theme '{}', using light", theme);
            Theme::Light
        });
        self.theme_path = store.get(THEME_PATH);

        self.loaded_language = language.clone();
        self.language = language;
        self.font_size_override = store.get_boolean(FONT_SIZE_OVERRIDE);
        self.font_size = store.get_int(FONT_SIZE).to_string();
        self.open_last_edited = store.get_boolean(OPEN_LAST_EDITED);
        self.confirm_delete = store.get_boolean(CONFIRM_DELETE);
        Ok(())
    }

    fn validate_settings(&self, dialogs: &mut dyn DialogService) -> bool {
        if language_name(&self.language).is_none() {
            report_invalid(dialogs, "General", "Language", "Please select a language.");
            return false;
        }

        if self.font_size_override {
            match self.font_size.trim().parse::<i64>() {
                Ok(size) if size > MIN_FONT_SIZE => {}
                _ => {
                    report_invalid(
                        dialogs,
                        "General",
                        "Font settings",
                        "You must enter an integer value higher than 8.",
                    );
                    return false;
                }
            }
        }

        if self.theme == Theme::Custom && self.theme_path.trim().is_empty() {
            report_invalid(dialogs, "General", "Visual theme", "Please specify a css theme file.");
            return false;
        }

        true
    }

    fn store_settings(&mut self, store: &mut dyn PreferenceStore) {
        self.restart_warnings.clear();

        if self.language != self.loaded_language {
            let name = language_name(&self.language).unwrap_or(self.language.as_str());
            self.restart_warnings.push(format!("Changed language: {}", name));
            self.loaded_language = self.language.clone();
        }
        store.put_string(LANGUAGE, &self.language);

        store.put_boolean(FONT_SIZE_OVERRIDE, self.font_size_override);
        if let Ok(size) = self.font_size.trim().parse::<i64>() {
            store.put_int(FONT_SIZE, size);
        }

        store.put_string(THEME, self.theme.as_str());
        store.put_string(THEME_PATH, self.theme_path.trim());
        store.put_boolean(OPEN_LAST_EDITED, self.open_last_edited);
        store.put_boolean(CONFIRM_DELETE, self.confirm_delete);
    }

    fn restart_warnings(&self) -> Vec<String> {
        self.restart_warnings.clone()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
