//! Error types shared across PosterKit crates.

/// Top-level error type for PosterKit operations.
#[derive(Debug, thiserror::Error)]
pub enum PosterError {
    #[error(
        "Margin {margin}{unit} leaves no printable area on a {paper_width}{unit} x {paper_height}{unit} page"
    )]
    InvalidMargin {
        margin: f64,
        paper_width: f64,
        paper_height: f64,
        unit: String,
    },

    #[error("Invalid value for `{field}`: {value} ({reason})")]
    InvalidConfig {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unknown paper size: {id}")]
    MissingPaper { id: String },

    #[error("Image for layer {layer_id} could not be decoded: {message}")]
    ImageDecode { layer_id: String, message: String },

    #[error("Text layer could not be drawn: {message}")]
    TextLayer { message: String },

    #[error("An export is already in progress")]
    ExportInProgress,

    #[error("Poster surface of {width}x{height} pixels exceeds the raster limit")]
    SurfaceTooLarge { width: u64, height: u64 },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Sink error: {message}")]
    Sink { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using PosterError.
pub type PosterResult<T> = Result<T, PosterError>;

impl PosterError {
    pub fn invalid_config(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn image_decode(layer_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::ImageDecode {
            layer_id: layer_id.into(),
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn text_layer(msg: impl Into<String>) -> Self {
        Self::TextLayer {
            message: msg.into(),
        }
    }

    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink {
            message: msg.into(),
        }
    }

    /// Whether this error aborts an export.
    ///
    /// Decode failures, undrawable text and unknown paper ids are absorbed
    /// where they occur.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::ImageDecode { .. } | Self::TextLayer { .. } | Self::MissingPaper { .. }
        )
    }
}
