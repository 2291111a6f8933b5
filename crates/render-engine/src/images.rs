//! Image layer decoding.
//!
//! Decoding runs on the blocking pool and is awaited by the compositor
//! before the layer is drawn. A payload that cannot be decoded yields no
//! pixmap; the layer is then simply not drawn.

use posterkit_common::error::{PosterError, PosterResult};
use posterkit_poster_model::layer::ImageSource;
use tiny_skia::{ColorU8, Pixmap};

/// Decode an image source into a premultiplied pixmap.
pub fn decode_image(layer_id: &str, source: &ImageSource) -> PosterResult<Pixmap> {
    let bytes = source
        .payload()
        .map_err(|e| PosterError::image_decode(layer_id, e.to_string()))?;

    let rgba = image::load_from_memory(&bytes)
        .map_err(|e| PosterError::image_decode(layer_id, e.to_string()))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        PosterError::image_decode(layer_id, format!("unsupported size {width}x{height}"))
    })?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Decode on the blocking pool and wait for the result.
///
/// Failures are logged and reported as `None`.
pub async fn load_layer_image(layer_id: &str, source: &ImageSource) -> Option<Pixmap> {
    let id = layer_id.to_string();
    let source = source.clone();
    let result = tokio::task::spawn_blocking(move || decode_image(&id, &source)).await;

    match result {
        Ok(Ok(pixmap)) => {
            tracing::debug!(
                layer = layer_id,
                width = pixmap.width(),
                height = pixmap.height(),
                "Decoded layer image"
            );
            Some(pixmap)
        }
        Ok(Err(e)) => {
            tracing::warn!(layer = layer_id, error = %e, "Image layer will be left blank");
            None
        }
        Err(e) => {
            tracing::warn!(layer = layer_id, error = %e, "Image decode task failed");
            None
        }
    }
}
