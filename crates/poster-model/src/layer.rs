//! Poster layers: image and text elements placed on the poster.
//!
//! Layers are kept in an ordered list; later layers paint over earlier ones.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::geometry::FracRect;
use crate::palette::Rgba;

/// Bounds given to a new image layer.
pub const DEFAULT_IMAGE_BOUNDS: FracRect = FracRect {
    x: 0.05,
    y: 0.05,
    width: 0.3,
    height: 0.3,
};

/// Bounds given to a new text layer.
pub const DEFAULT_TEXT_BOUNDS: FracRect = FracRect {
    x: 0.05,
    y: 0.05,
    width: 0.4,
    height: 0.1,
};

/// A placed content element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Unique within a poster.
    pub id: String,

    #[serde(flatten)]
    pub content: LayerContent,

    /// Position and size as fractions of the poster bounds.
    pub bounds: FracRect,

    /// Clockwise rotation in degrees about the layer's own center.
    #[serde(default)]
    pub rotation: f64,

    /// Opacity in `[0.0, 1.0]`.
    #[serde(default = "default_opacity")]
    pub opacity: f64,

    /// Text styling; ignored for image layers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<TextStyle>,
}

fn default_opacity() -> f64 {
    1.0
}

/// What a layer draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum LayerContent {
    Image(ImageSource),
    Text(String),
}

/// Layer kind without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Image,
    Text,
}

impl Layer {
    /// New image layer with the default bounds.
    pub fn image(id: impl Into<String>, source: ImageSource) -> Self {
        Self {
            id: id.into(),
            content: LayerContent::Image(source),
            bounds: DEFAULT_IMAGE_BOUNDS,
            rotation: 0.0,
            opacity: 1.0,
            style: None,
        }
    }

    /// New text layer with the default bounds and style.
    pub fn text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: LayerContent::Text(text.into()),
            bounds: DEFAULT_TEXT_BOUNDS,
            rotation: 0.0,
            opacity: 1.0,
            style: Some(TextStyle::default()),
        }
    }

    pub fn kind(&self) -> LayerKind {
        match self.content {
            LayerContent::Image(_) => LayerKind::Image,
            LayerContent::Text(_) => LayerKind::Text,
        }
    }

    /// Effective text style (default when unset).
    pub fn text_style(&self) -> TextStyle {
        self.style.clone().unwrap_or_default()
    }

    /// Set opacity, clamped to `[0.0, 1.0]`.
    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
    }

    /// Short label for layer lists.
    pub fn label(&self) -> String {
        match &self.content {
            LayerContent::Image(source) => format!("Image ({})", source.mime_type()),
            LayerContent::Text(text) => {
                let first = text.lines().next().unwrap_or_default();
                let mut label: String = first.chars().take(24).collect();
                if first.chars().count() > 24 {
                    label.push('…');
                }
                format!("Text \"{label}\"")
            }
        }
    }
}

/// Font weight for text layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    /// CSS numeric weight.
    pub fn numeric(self) -> u16 {
        match self {
            FontWeight::Normal => 400,
            FontWeight::Bold => 700,
        }
    }
}

/// Styling for text layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    /// Hex color (`#rrggbb`).
    pub color: String,

    /// Multiplier on the base font size (5% of the poster height).
    pub font_size: f64,

    pub font_family: String,

    pub font_weight: FontWeight,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: "#000000".to_string(),
            font_size: 1.0,
            font_family: "sans-serif".to_string(),
            font_weight: FontWeight::Normal,
        }
    }
}

impl TextStyle {
    /// Parsed color; unparseable values render black.
    pub fn rgba(&self) -> Rgba {
        Rgba::parse_hex(&self.color).unwrap_or(Rgba::BLACK)
    }
}

/// An opaque, decodable image handle stored as a data URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageSource {
    uri: String,
}

/// Errors extracting bytes from an [`ImageSource`].
#[derive(Debug, thiserror::Error)]
pub enum ImageSourceError {
    #[error("not a base64 data URL")]
    NotDataUrl,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl ImageSource {
    /// Wrap encoded image bytes (PNG, JPEG, ...) into a data URL.
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Self {
        Self {
            uri: format!("data:{mime_type};base64,{}", BASE64.encode(bytes)),
        }
    }

    /// Wrap an existing data URL without validating it.
    pub fn from_data_url(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }

    pub fn data_url(&self) -> &str {
        &self.uri
    }

    /// Declared MIME type, or `application/octet-stream`.
    pub fn mime_type(&self) -> &str {
        self.uri
            .strip_prefix("data:")
            .and_then(|rest| rest.split([';', ',']).next())
            .filter(|mime| !mime.is_empty())
            .unwrap_or("application/octet-stream")
    }

    /// Decode the encoded image bytes carried by the data URL.
    pub fn payload(&self) -> Result<Vec<u8>, ImageSourceError> {
        let rest = self
            .uri
            .strip_prefix("data:")
            .ok_or(ImageSourceError::NotDataUrl)?;
        let (header, data) = rest.split_once(',').ok_or(ImageSourceError::NotDataUrl)?;
        if !header.ends_with(";base64") {
            return Err(ImageSourceError::NotDataUrl);
        }
        Ok(BASE64.decode(data.trim())?)
    }
}
