//! Declared panel structure
//!
//! A tab describes its surface once, at construction, as a tree of
//! `Control`s. The dialog shell renders from it and the search index reads
//! its texts. Controls a tab creates later (for example rows filled in by a
//! background task) are not part of the layout and are not searchable.

/// One declared control. Every variant carries the text the user sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Heading(String),
    Label(String),
    CheckBox(String),
    TextField(String),
    /// Drop-down or radio choice, identified by its caption
    Choice(String),
    Group { title: String, children: Vec<Control> },
}

impl Control {
    /// The caption shown for this control.
    pub fn text(&self) -> &str {
        match self {
            Control::Heading(text)
            | Control::Label(text)
            | Control::CheckBox(text)
            | Control::TextField(text)
            | Control::Choice(text) => text,
            Control::Group { title, .. } => title,
        }
    }
}

/// Builder-style control tree for one tab.
///
/// ```
/// use prefsuite_core::Layout;
///
/// let layout = Layout::new()
///     .heading("Proxy configuration")
///     .check_box("Use custom proxy configuration")
///     .group("Authentication", |g| g.text_field("Username").text_field("Password"));
/// assert_eq!(layout.label_texts().len(), 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    controls: Vec<Control>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heading(self, text: impl Into<String>) -> Self {
        self.with(Control::Heading(text.into()))
    }

    pub fn label(self, text: impl Into<String>) -> Self {
        self.with(Control::Label(text.into()))
    }

    pub fn check_box(self, text: impl Into<String>) -> Self {
        self.with(Control::CheckBox(text.into()))
    }

    pub fn text_field(self, text: impl Into<String>) -> Self {
        self.with(Control::TextField(text.into()))
    }

    pub fn choice(self, text: impl Into<String>) -> Self {
        self.with(Control::Choice(text.into()))
    }

    pub fn group(self, title: impl Into<String>, build: impl FnOnce(Layout) -> Layout) -> Self {
        let children = build(Layout::new()).controls;
        self.with(Control::Group { title: title.into(), children })
    }

    /// Append an already-built control.
    pub fn with(mut self, control: Control) -> Self {
        self.controls.push(control);
        self
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    /// Every non-empty caption in declaration order, groups before their
    /// children.
    pub fn label_texts(&self) -> Vec<&str> {
        let mut texts = Vec::new();
        collect_texts(&self.controls, &mut texts);
        texts
    }
}

fn collect_texts<'a>(controls: &'a [Control], out: &mut Vec<&'a str>) {
    for control in controls {
        let text = control.text();
        if !text.trim().is_empty() {
            out.push(text);
        }
        if let Control::Group { children, .. } = control {
            collect_texts(children, out);
        }
    }
}
