//! Network tab: remote operation and proxy configuration.

use std::any::Any;

use prefsuite_core::{
    DialogService, Layout, PreferenceStore, PreferenceTab, PreferenceValue, TabError,
};

use crate::{report_invalid, StoredValues};

pub const REMOTE_ENABLED: &str = "remote.enabled";
pub const REMOTE_PORT: &str = "remote.port";
pub const PROXY_USE: &str = "proxy.use";
pub const PROXY_HOSTNAME: &str = "proxy.hostname";
pub const PROXY_PORT: &str = "proxy.port";
pub const PROXY_USE_AUTHENTICATION: &str = "proxy.use_authentication";
pub const PROXY_USERNAME: &str = "proxy.username";
pub const PROXY_PASSWORD: &str = "proxy.password";

pub const DEFAULT_REMOTE_PORT: i64 = 6050;

/// Ports below 1025 are reserved.
const REMOTE_PORT_RANGE: std::ops::RangeInclusive<i64> = 1025..=65535;

pub(crate) fn defaults() -> Vec<(&'static str, PreferenceValue)> {
    vec![
        (REMOTE_ENABLED, false.into()),
        (REMOTE_PORT, DEFAULT_REMOTE_PORT.into()),
        (PROXY_USE, false.into()),
        (PROXY_HOSTNAME, "".into()),
        (PROXY_PORT, "80".into()),
        (PROXY_USE_AUTHENTICATION, false.into()),
        (PROXY_USERNAME, "".into()),
        (PROXY_PASSWORD, "".into()),
    ]
}

fn parse_port(input: &str) -> Option<i64> {
    input.trim().parse::<i64>().ok()
}

pub struct NetworkTab {
    layout: Layout,
    loaded_port: i64,
    restart_warnings: Vec<String>,

    pub remote_enabled: bool,
    pub remote_port: String,
    pub proxy_use: bool,
    pub proxy_hostname: String,
    pub proxy_port: String,
    pub proxy_use_authentication: bool,
    pub proxy_username: String,
    pub proxy_password: String,
}

impl NetworkTab {
    pub fn new() -> Self {
        let layout = Layout::new()
            .group("Remote operation", |g| {
                g.check_box("Listen for remote operation on port").text_field("Port")
            })
            .group("Proxy configuration", |g| {
                g.check_box("Use custom proxy configuration")
                    .text_field("Hostname")
                    .text_field("Port")
                    .check_box("Proxy requires authentication")
                    .text_field("Username")
                    .text_field("Password")
                    .label("Password is stored in plain text")
            });

        Self {
            layout,
            loaded_port: DEFAULT_REMOTE_PORT,
            restart_warnings: Vec::new(),
            remote_enabled: false,
            remote_port: DEFAULT_REMOTE_PORT.to_string(),
            proxy_use: false,
            proxy_hostname: String::new(),
            proxy_port: "80".to_string(),
            proxy_use_authentication: false,
            proxy_username: String::new(),
            proxy_password: String::new(),
        }
    }

    /// First problem with the current state as (section, message).
    fn first_problem(&self) -> Option<(&'static str, &'static str)> {
        if self.remote_enabled
            && !parse_port(&self.remote_port).is_some_and(|p| REMOTE_PORT_RANGE.contains(&p))
        {
            return Some((
                "Remote operation",
                "You must enter an integer value in the interval 1025-65535",
            ));
        }

        if self.proxy_use {
            const SECTION: &str = "Proxy configuration";
            if self.proxy_hostname.trim().is_empty() {
                return Some((SECTION, "Please specify a hostname"));
            }
            if parse_port(&self.proxy_port).is_none() {
                return Some((SECTION, "Please specify a port"));
            }
            if self.proxy_use_authentication {
                if self.proxy_username.trim().is_empty() {
                    return Some((SECTION, "Please specify a username"));
                }
                if self.proxy_password.is_empty() {
                    return Some((SECTION, "Please specify a password"));
                }
            }
        }

        None
    }
}

impl Default for NetworkTab {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceTab for NetworkTab {
    fn name(&self) -> &str {
        "Network"
    }

    fn layout(&self) -> &Layout {
        &self.layout
    }

    fn set_values(&mut self, store: &dyn PreferenceStore) -> Result<(), TabError> {
        let store = StoredValues::new(store);
        self.remote_enabled = store.get_boolean(REMOTE_ENABLED);
        self.loaded_port = store.get_int(REMOTE_PORT);
        self.remote_port = self.loaded_port.to_string();

        self.proxy_use = store.get_boolean(PROXY_USE);
        self.proxy_hostname = store.get(PROXY_HOSTNAME);
        self.proxy_port = store.get(PROXY_PORT);
        self.proxy_use_authentication = store.get_boolean(PROXY_USE_AUTHENTICATION);
        self.proxy_username = store.get(PROXY_USERNAME);
        self.proxy_password = store.get(PROXY_PASSWORD);
        Ok(())
    }

    fn validate_settings(&self, dialogs: &mut dyn DialogService) -> bool {
        match self.first_problem() {
            Some((section, message)) => {
                report_invalid(dialogs, "Network", section, message);
                false
            }
            None => true,
        }
    }

    fn store_settings(&mut self, store: &mut dyn PreferenceStore) {
        self.restart_warnings.clear();

        store.put_boolean(REMOTE_ENABLED, self.remote_enabled);
        // An unparsable port while remote operation is off keeps the old one
        if let Some(port) = parse_port(&self.remote_port) {
            if port != self.loaded_port {
                if self.remote_enabled {
                    self.restart_warnings
                        .push(format!("Changed remote operation port: {}", port));
                }
                self.loaded_port = port;
            }
            store.put_int(REMOTE_PORT, port);
        }

        store.put_boolean(PROXY_USE, self.proxy_use);
        store.put_string(PROXY_HOSTNAME, self.proxy_hostname.trim());
        store.put_string(PROXY_PORT, self.proxy_port.trim());
        store.put_boolean(PROXY_USE_AUTHENTICATION, self.proxy_use_authentication);
        store.put_string(PROXY_USERNAME, self.proxy_username.trim());
        store.put_string(PROXY_PASSWORD, &self.proxy_password);
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

    fn loaded() -> (NetworkTab, MemoryStore) {
        let store = MemoryStore::with_defaults(defaults());
        let mut tab = NetworkTab::new();
        tab.set_values(&store).unwrap();
        (tab, store)
    }

    fn error_of(tab: &NetworkTab) -> Option<(String, String)> {
        let mut dialogs = ScriptedDialogs::new();
        if tab.validate_settings(&mut dialogs) {
            return None;
        }
        let msg = dialogs.last_message().unwrap();
        Some((msg.title.clone(), msg.message.clone()))
    }

    #[test]
    fn test_remote_port_range() {
        let (mut tab, _) = loaded();
        tab.remote_enabled = true;

        for bad in ["1024", "65536", "0", "port", ""] {
            tab.remote_port = bad.to_string();
            let (title, message) = error_of(&tab).unwrap();
            assert_eq!(title, "Network > Remote operation");
            assert!(message.contains("1025-65535"), "{}", bad);
        }
        for good in ["1025", "65535", " 7000 "] {
            tab.remote_port = good.to_string();
            assert_eq!(error_of(&tab), None, "{}", good);
        }

        tab.remote_enabled = false;
        tab.remote_port = "1".to_string();
        assert_eq!(error_of(&tab), None);
    }

    #[test]
    fn test_proxy_checks_in_order() {
        let (mut tab, _) = loaded();
        tab.proxy_use = true;
        tab.proxy_port = "x".to_string();
        assert_eq!(error_of(&tab).unwrap().1, "Please specify a hostname");

        tab.proxy_hostname = "proxy.example.org".to_string();
        assert_eq!(error_of(&tab).unwrap().1, "Please specify a port");

        tab.proxy_port = "3128".to_string();
        tab.proxy_use_authentication = true;
        assert_eq!(error_of(&tab).unwrap().1, "Please specify a username");

        tab.proxy_username = "alice".to_string();
        assert_eq!(error_of(&tab).unwrap().1, "Please specify a password");

        tab.proxy_password = "secret".to_string();
        assert_eq!(error_of(&tab), None);
    }

    #[test]
    fn test_port_change_warns_only_when_listening() {
        let (mut tab, mut store) = loaded();
        tab.remote_port = "7000".to_string();
        tab.store_settings(&mut store);
        assert!(tab.restart_warnings().is_empty());
        assert_eq!(store.get_int(REMOTE_PORT), 7000);

        tab.remote_enabled = true;
        tab.remote_port = "7001".to_string();
        tab.store_settings(&mut store);
        assert_eq!(tab.restart_warnings(), vec!["Changed remote operation port: 7001"]);
    }

    #[test]
    fn test_proxy_values_trimmed_on_store() {
        let (mut tab, mut store) = loaded();
        tab.proxy_use = true;
        tab.proxy_hostname = "  proxy.example.org ".to_string();
        tab.proxy_port = " 3128".to_string();
        tab.store_settings(&mut store);

        assert!(store.get_boolean(PROXY_USE));
        assert_eq!(store.get(PROXY_HOSTNAME), "proxy.example.org");
        assert_eq!(store.get(PROXY_PORT), "3128");
    }

    #[test]
    fn test_missing_keys_load_defaults() {
        let mut tab = NetworkTab::new();
        tab.set_values(&MemoryStore::new()).unwrap();
        assert_eq!(tab.remote_port, DEFAULT_REMOTE_PORT.to_string());
        assert_eq!(tab.proxy_port, "80");

        tab.remote_enabled = true;
        assert_eq!(error_of(&tab), None);
    }
}
