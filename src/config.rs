//! Configuration file support for the wound annotator.
//!
//! Application settings (viewport caps, gesture options, log level) live in a
//! small versioned JSON file. The annotation vocabulary is not part of it; it
//! comes from the persistence backend at load time.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_VIEWPORT_HEIGHT, DEFAULT_MAX_VIEWPORT_WIDTH, DEFAULT_WINDOW_MARGIN,
};
use crate::fit_math::ViewportCap;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Canvas sizing
    #[serde(default)]
    pub viewport: ViewportConfig,

    /// Whether existing rectangles can be moved by dragging
    #[serde(default = "default_drag_enabled")]
    pub drag_enabled: bool,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_drag_enabled() -> bool {
    true
}

/// Canvas sizing section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Upper bound for the canvas width
    #[serde(default = "default_max_width")]
    pub max_width: f64,

    /// Canvas height target
    #[serde(default = "default_max_height")]
    pub max_height: f64,

    /// Space kept free beside the canvas when sizing from the window width
    #[serde(default = "default_window_margin")]
    pub window_margin: f64,
}

fn default_max_width() -> f64 {
    DEFAULT_MAX_VIEWPORT_WIDTH
}

fn default_max_height() -> f64 {
    DEFAULT_MAX_VIEWPORT_HEIGHT
}

fn default_window_margin() -> f64 {
    DEFAULT_WINDOW_MARGIN
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
            max_height: default_max_height(),
            window_margin: default_window_margin(),
        }
    }
}

impl ViewportConfig {
    /// Viewport cap for a window of the given width, or the plain cap
    /// when the window width is unknown.
    pub fn cap_for_window(&self, window_width: Option<f64>) -> ViewportCap {
        let max_width = match window_width {
            Some(w) => self.max_width.min(w - self.window_margin),
            None => self.max_width,
        };
        ViewportCap::new(max_width, self.max_height)
    }
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            viewport: ViewportConfig::default(),
            drag_enabled: default_drag_enabled(),
            log_level: LogLevel::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "wound-annotator.json"
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
