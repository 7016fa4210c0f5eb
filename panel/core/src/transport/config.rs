//! Transport Configuration
//!
//! Configuration types for selecting and configuring the printer-host
//! connection.

use serde::{Deserialize, Serialize};

use super::in_process::DEFAULT_CHANNEL_CAPACITY;

/// Default Moonraker WebSocket endpoint
pub const DEFAULT_MOONRAKER_URL: &str = "ws://127.0.0.1:7125/websocket";

/// Default notification carrying console output
pub const DEFAULT_NOTIFICATION_METHOD: &str = "notify_gcode_response";

/// Default method for running G-code
pub const DEFAULT_GCODE_METHOD: &str = "printer.gcode.script";

/// Transport type selection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportType {
    /// Direct in-process channels (embedded mode, transcript replay)
    #[default]
    InProcess,

    /// Moonraker JSON-RPC over WebSocket
    ///
    /// Only usable when built with the `websocket` feature.
    WebSocket,
}

/// Transport configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Which transport to use
    pub transport: TransportType,

    /// Moonraker WebSocket URL
    pub url: String,

    /// Notification whose first parameter is a console line
    pub notification_method: String,

    /// Method used to run G-code scripts
    pub gcode_method: String,

    /// Capacity of in-process channels
    pub channel_capacity: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            transport: TransportType::default(),
            url: DEFAULT_MOONRAKER_URL.to_string(),
            notification_method: DEFAULT_NOTIFICATION_METHOD.to_string(),
            gcode_method: DEFAULT_GCODE_METHOD.to_string(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl TransportConfig {
    /// Create configuration for embedded (in-process) mode
    #[must_use]
    pub fn embedded() -> Self {
        Self {
            transport: TransportType::InProcess,
            ..Default::default()
        }
    }

    /// Create configuration for a Moonraker socket at `url`
    #[must_use]
    pub fn websocket(url: impl Into<String>) -> Self {
        Self {
            transport: TransportType::WebSocket,
            url: url.into(),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `PRINTPANEL_TRANSPORT`: "inprocess", "embedded", "websocket", "ws"
    /// - `PRINTPANEL_MOONRAKER_URL`: WebSocket URL
    /// - `PRINTPANEL_NOTIFY_METHOD`: Console notification method
    /// - `PRINTPANEL_GCODE_METHOD`: G-code method
    /// - `PRINTPANEL_CHANNEL_CAPACITY`: In-process channel capacity
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_from(|key| std::env::var(key).ok());
        config
    }

    /// Overlay values from an environment lookup
    ///
    /// Unset or unparsable variables leave the current value in place.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        match lookup("PRINTPANEL_TRANSPORT").map(|v| v.to_lowercase()) {
            Some(ref s) if s == "inprocess" || s == "embedded" => {
                self.transport = TransportType::InProcess;
            }
            Some(ref s) if s == "websocket" || s == "ws" => {
                self.transport = TransportType::WebSocket;
            }
            Some(other) => {
                tracing::warn!(value = %other, "Unknown PRINTPANEL_TRANSPORT, keeping current");
            }
            None => {}
        }

        if let Some(url) = lookup("PRINTPANEL_MOONRAKER_URL") {
            self.url = url;
        }
        if let Some(method) = lookup("PRINTPANEL_NOTIFY_METHOD") {
            self.notification_method = method;
        }
        if let Some(method) = lookup("PRINTPANEL_GCODE_METHOD") {
            self.gcode_method = method;
        }
        self.channel_capacity = lookup("PRINTPANEL_CHANNEL_CAPACITY")
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.channel_capacity);
    }

    /// Check if this is an in-process (embedded) configuration
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        matches!(self.transport, TransportType::InProcess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = TransportConfig::default();
        assert!(config.is_embedded());
        assert_eq!(config.url, DEFAULT_MOONRAKER_URL);
        assert_eq!(config.notification_method, "notify_gcode_response");
        assert_eq!(config.gcode_method, "printer.gcode.script");
    }

    #[test]
    fn test_env_selects_websocket() {
        let mut config = TransportConfig::default();
        config.apply_env_from(env(&[
            ("PRINTPANEL_TRANSPORT", "WS"),
            ("PRINTPANEL_MOONRAKER_URL", "ws://printer.local:7125/websocket"),
        ]));

        assert_eq!(config.transport, TransportType::WebSocket);
        assert_eq!(config.url, "ws://printer.local:7125/websocket");
    }

    #[test]
    fn test_unparsable_capacity_is_ignored() {
        let mut config = TransportConfig::default();
        config.apply_env_from(env(&[("PRINTPANEL_CHANNEL_CAPACITY", "lots")]));
        assert_eq!(config.channel_capacity, DEFAULT_CHANNEL_CAPACITY);

        config.apply_env_from(env(&[("PRINTPANEL_CHANNEL_CAPACITY", "8")]));
        assert_eq!(config.channel_capacity, 8);
    }

    #[test]
    fn test_unknown_transport_keeps_current() {
        let mut config = TransportConfig::websocket("ws://x/websocket");
        config.apply_env_from(env(&[("PRINTPANEL_TRANSPORT", "carrier-pigeon")]));
        assert_eq!(config.transport, TransportType::WebSocket);
    }
}
