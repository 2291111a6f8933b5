//! Poster document files.
//!
//! A poster document (`poster.json`) is the saved form of an editing
//! session: sizing config plus the ordered layer list.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::PosterConfig;
use crate::layer::Layer;

/// Current document schema version.
pub const DOCUMENT_VERSION: &str = "1.0";

/// Top-level poster file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosterDocument {
    /// Schema version.
    #[serde(default = "default_version")]
    pub version: String,

    /// Human-readable poster name.
    pub name: String,

    /// Document identifier.
    pub id: String,

    /// Creation timestamp (RFC 3339).
    pub created_at: String,

    /// Last modified timestamp (RFC 3339).
    pub modified_at: String,

    /// Sizing configuration.
    #[serde(default)]
    pub config: PosterConfig,

    /// Layers in paint order (last is on top).
    #[serde(default)]
    pub layers: Vec<Layer>,
}

fn default_version() -> String {
    DOCUMENT_VERSION.to_string()
}

impl PosterDocument {
    /// Create a new, empty poster.
    pub fn new(name: impl Into<String>, config: PosterConfig) -> Self {
        let now = chrono::Utc::now();
        Self {
            version: DOCUMENT_VERSION.to_string(),
            name: name.into(),
            id: format!("poster-{:x}", now.timestamp_micros()),
            created_at: now.to_rfc3339(),
            modified_at: now.to_rfc3339(),
            config,
            layers: vec![],
        }
    }

    /// Load a poster from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| DocumentError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let document: PosterDocument =
            serde_json::from_str(&json).map_err(|e| DocumentError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;
        document.check_layer_ids()?;
        Ok(document)
    }

    /// Save the poster as pretty-printed JSON, updating `modified_at`.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| DocumentError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        self.modified_at = chrono::Utc::now().to_rfc3339();
        let json = serde_json::to_string_pretty(self).map_err(|e| DocumentError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| DocumentError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Create a new poster file on disk.
    pub fn create(
        path: impl AsRef<Path>,
        name: impl Into<String>,
        config: PosterConfig,
    ) -> Result<Self, DocumentError> {
        let mut document = Self::new(name, config);
        document.save(path)?;
        Ok(document)
    }

    fn check_layer_ids(&self) -> Result<(), DocumentError> {
        for (i, layer) in self.layers.iter().enumerate() {
            if self.layers[..i].iter().any(|l| l.id == layer.id) {
                return Err(DocumentError::ValidationError {
                    message: format!("duplicate layer id `{}`", layer.id),
                });
            }
        }
        Ok(())
    }
}

/// Errors that can occur when reading or writing poster files.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid poster: {message}")]
    ValidationError { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SizingMode;

    #[test]
    fn test_document_creation() {
        let doc = PosterDocument::new("Concert", PosterConfig::default());
        assert_eq!(doc.name, "Concert");
        assert_eq!(doc.version, DOCUMENT_VERSION);
        assert!(doc.id.starts_with("poster-"));
        assert!(doc.layers.is_empty());
    }

    #[test]
    fn test_document_create_and_load() {
        let path = std::env::temp_dir()
            .join("posterkit_test_document")
            .join("poster.json");
        let _ = std::fs::remove_file(&path);

        let config = PosterConfig {
            mode: SizingMode::Size,
            target_width: 900.0,
            ..PosterConfig::default()
        };
        let mut created = PosterDocument::create(&path, "Round Trip", config).unwrap();
        created.layers.push(Layer::text("layer-1", "Hello"));
        created.save(&path).unwrap();

        let loaded = PosterDocument::load(&path).unwrap();
        assert_eq!(loaded.name, "Round Trip");
        assert_eq!(loaded.config.target_width, 900.0);
        assert_eq!(loaded.layers.len(), 1);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_rejects_duplicate_layer_ids() {
        let path = std::env::temp_dir().join("posterkit_test_duplicate_ids.json");
        let mut doc = PosterDocument::new("Dupes", PosterConfig::default());
        doc.layers.push(Layer::text("same", "a"));
        doc.layers.push(Layer::text("same", "b"));
        doc.save(&path).unwrap();

        let err = PosterDocument::load(&path).unwrap_err();
        assert!(matches!(err, DocumentError::ValidationError { .. }));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let err = PosterDocument::load("/nonexistent/posterkit/poster.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/posterkit/poster.json"));
    }

    #[test]
    fn test_legacy_document_without_version_or_config() {
        let doc: PosterDocument = serde_json::from_str(
            r#"{ "name": "Old", "id": "x", "created_at": "", "modified_at": "" }"#,
        )
        .unwrap();
        assert_eq!(doc.version, DOCUMENT_VERSION);
        assert_eq!(doc.config, PosterConfig::default());
        assert!(doc.layers.is_empty());
    }
}
