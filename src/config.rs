//! Configuration file support.
//!
//! Interaction thresholds and overlay sizes can be tuned through a JSON file
//! stored in the user's config directory.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Log level setting.
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

/// Pointer interaction thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionConfig {
    /// Longest press-to-release time that still counts as a click
    #[serde(default = "default_click_time_ms")]
    pub click_time_ms: u64,

    /// Largest pointer travel that still counts as a click
    #[serde(default = "default_click_distance_px")]
    pub click_distance_px: f64,

    /// Close a polygon when clicking this close to its first vertex
    #[serde(default = "default_polygon_close_px")]
    pub polygon_close_px: f64,
}

fn default_click_time_ms() -> u64 {
    constants::CLICK_TIME_THRESHOLD_MS
}

fn default_click_distance_px() -> f64 {
    constants::CLICK_DISTANCE_THRESHOLD_PX
}

fn default_polygon_close_px() -> f64 {
    constants::POLYGON_CLOSE_THRESHOLD_PX
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            click_time_ms: default_click_time_ms(),
            click_distance_px: default_click_distance_px(),
            polygon_close_px: default_polygon_close_px(),
        }
    }
}

/// Overlay sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AppearanceConfig {
    #[serde(default = "default_marker_diameter_px")]
    pub marker_diameter_px: f64,

    #[serde(default = "default_marker_hover_scale")]
    pub marker_hover_scale: f64,

    #[serde(default = "default_vertex_diameter_px")]
    pub vertex_diameter_px: f64,
}

fn default_marker_diameter_px() -> f64 {
    constants::MARKER_DIAMETER_PX
}

fn default_marker_hover_scale() -> f64 {
    constants::MARKER_HOVER_SCALE
}

fn default_vertex_diameter_px() -> f64 {
    constants::DRAW_VERTEX_DIAMETER_PX
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            marker_diameter_px: default_marker_diameter_px(),
            marker_hover_scale: default_marker_hover_scale(),
            vertex_diameter_px: default_vertex_diameter_px(),
        }
    }
}

/// Overlay engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Version of the configuration file format
    pub version: u32,

    #[serde(default)]
    pub interaction: InteractionConfig,

    #[serde(default)]
    pub appearance: AppearanceConfig,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

impl OverlayConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            interaction: InteractionConfig::default(),
            appearance: AppearanceConfig::default(),
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

    pub fn default_filename() -> &'static str {
        "siteplan-overlay.json"
    }

    /// Default config file path: `<config dir>/siteplan/siteplan-overlay.json`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("siteplan").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("siteplan")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load a configuration file.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, self.to_json()?)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

impl Default for OverlayConfig {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = OverlayConfig::default();
        assert_eq!(config.interaction.click_time_ms, 300);
        assert_eq!(config.interaction.click_distance_px, 8.0);
        assert_eq!(config.interaction.polygon_close_px, 20.0);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let json = r#"{ "version": 1, "interaction": { "click_time_ms": 250 } }"#;
        let config = OverlayConfig::from_json(json).unwrap();
        assert_eq!(config.interaction.click_time_ms, 250);
        assert_eq!(config.interaction.click_distance_px, 8.0);
        assert_eq!(config.appearance, AppearanceConfig::default());
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_newer_version_rejected() {
        let json = r#"{ "version": 99 }"#;
        assert!(matches!(
            OverlayConfig::from_json(json),
            Err(ConfigError::VersionTooNew {
                file_version: 99,
                ..
            })
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = OverlayConfig::new();
        config.log_level = LogLevel::Debug;
        let json = config.to_json().unwrap();
        assert!(json.contains("\"debug\""));
        assert_eq!(OverlayConfig::from_json(&json).unwrap(), config);
    }
}
