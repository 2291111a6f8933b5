//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default export parameters.
    #[serde(default)]
    pub export: ExportDefaults,

    /// Defaults applied to newly created posters.
    #[serde(default)]
    pub editor: EditorDefaults,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default export parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportDefaults {
    /// Raster resolution used when the poster is measured in millimeters.
    pub pixels_per_mm: f64,

    /// Raster resolution used when the poster is measured in inches.
    pub pixels_per_inch: f64,

    /// Base name of the exported document (no extension).
    pub base_filename: String,

    /// Upper bound on the composited surface area, in pixels.
    pub max_surface_pixels: u64,
}

/// Defaults for new posters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorDefaults {
    /// Active unit for new posters (`mm` or `in`).
    pub unit: String,

    /// Paper catalog id for new posters.
    pub paper_id: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "posterkit=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for ExportDefaults {
    fn default() -> Self {
        Self {
            pixels_per_mm: 5.0,
            pixels_per_inch: 120.0,
            base_filename: "poster".to_string(),
            // 20000 x 20000 RGBA, about 1.6 GB.
            max_surface_pixels: 400_000_000,
        }
    }
}

impl Default for EditorDefaults {
    fn default() -> Self {
        Self {
            unit: "mm".to_string(),
            paper_id: "a4".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Where `load` and `save` look for the config file.
    pub fn path() -> PathBuf {
        config_file_path()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("posterkit").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_defaults_match_print_resolution() {
        let defaults = ExportDefaults::default();
        assert_eq!(defaults.pixels_per_mm, 5.0);
        assert_eq!(defaults.pixels_per_inch, 120.0);
        assert_eq!(defaults.base_filename, "poster");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: AppConfig =
            serde_json::from_str(r#"{ "export": { "pixels_per_mm": 8.0 } }"#).unwrap();
        assert_eq!(parsed.export.pixels_per_mm, 8.0);
        assert_eq!(parsed.export.pixels_per_inch, 120.0);
        assert_eq!(parsed.editor.paper_id, "a4");
        assert_eq!(parsed.logging.level, "info");
    }
}
