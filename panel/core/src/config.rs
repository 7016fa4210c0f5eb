//! Panel Configuration
//!
//! Settings are layered, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. TOML file (`$XDG_CONFIG_HOME/printpanel/panel.toml`, or an explicit path)
//! 3. Environment variables (`PRINTPANEL_*`)
//! 4. Command-line overrides
//!
//! ```toml
//! [display]
//! vertical_resolution = 600
//!
//! [transport]
//! transport = "websocket"
//! url = "ws://voron.local:7125/websocket"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::presenter::REFERENCE_VERTICAL_RESOLUTION;
use crate::transport::{TransportConfig, TransportType};

/// Directory name under the user config dir
pub const CONFIG_DIR_NAME: &str = "printpanel";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "panel.toml";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// File that was being parsed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },

    /// A value is out of range
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// No file was found; defaults plus environment
    Defaults,
    /// Loaded from this file
    File(PathBuf),
}

/// Display settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Display height used to scale the prompt's button row
    pub vertical_resolution: u32,
}

impl Default for DisplayConfig {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn default() -> Self {
        Self {
            vertical_resolution: REFERENCE_VERTICAL_RESOLUTION as u32,
        }
    }
}

/// Complete panel configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Display settings
    pub display: DisplayConfig,
    /// Printer-host connection
    pub transport: TransportConfig,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Replaces `display.vertical_resolution`
    pub vertical_resolution: Option<u32>,
    /// Replaces `transport.url` and selects the WebSocket transport
    pub moonraker_url: Option<String>,
}

impl PanelConfig {
    /// Parse a TOML document
    ///
    /// # Errors
    ///
    /// Returns the TOML error if the document does not match the schema.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is malformed.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay environment variables
    ///
    /// - `PRINTPANEL_VRES`: display vertical resolution
    /// - everything [`TransportConfig::apply_env_from`] reads
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        self.display.vertical_resolution = lookup("PRINTPANEL_VRES")
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.display.vertical_resolution);
        self.transport.apply_env_from(lookup);
    }

    /// Overlay command-line values
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(vres) = overrides.vertical_resolution {
            self.display.vertical_resolution = vres;
        }
        if let Some(url) = &overrides.moonraker_url {
            self.transport.transport = TransportType::WebSocket;
            self.transport.url.clone_from(url);
        }
    }

    /// Reject values the panel cannot work with
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display.vertical_resolution == 0 {
            return Err(ConfigError::Invalid(
                "display.vertical_resolution must be positive".to_string(),
            ));
        }
        if self.transport.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "transport.channel_capacity must be positive".to_string(),
            ));
        }
        if self.transport.notification_method.is_empty() {
            return Err(ConfigError::Invalid(
                "transport.notification_method must not be empty".to_string(),
            ));
        }
        if self.transport.gcode_method.is_empty() {
            return Err(ConfigError::Invalid(
                "transport.gcode_method must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default config file location
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load the effective configuration
///
/// An explicit path must exist. The default path is optional: when it is
/// missing, defaults are used.
///
/// # Errors
///
/// Returns an error if a file exists but cannot be read or parsed, or if
/// the merged result fails validation.
pub fn load_config(
    explicit: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<(PanelConfig, ConfigSource), ConfigError> {
    load_config_with_env(explicit, default_config_path(), overrides, |key| {
        std::env::var(key).ok()
    })
}

fn load_config_with_env(
    explicit: Option<&Path>,
    default_path: Option<PathBuf>,
    overrides: &ConfigOverrides,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(PanelConfig, ConfigSource), ConfigError> {
    let (mut config, source) = match explicit {
        Some(path) => (PanelConfig::load_file(path)?, ConfigSource::File(path.to_path_buf())),
        None => match default_path.filter(|p| p.is_file()) {
            Some(path) => (PanelConfig::load_file(&path)?, ConfigSource::File(path)),
            None => (PanelConfig::default(), ConfigSource::Defaults),
        },
    };

    config.apply_env_from(lookup);
    config.apply_overrides(overrides);
    config.validate()?;

    tracing::debug!(?source, vres = config.display.vertical_resolution, "Configuration loaded");
    Ok((config, source))
}
