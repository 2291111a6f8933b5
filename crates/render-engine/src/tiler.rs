//! Page tiling: slicing the composited poster into per-page images.
//!
//! Tile edges are rounded independently and then clamped to the surface,
//! so neighbouring tiles share an edge exactly and never overlap or leave
//! a gap, whatever the scale.

use std::io::Cursor;

use posterkit_common::error::{PosterError, PosterResult};
use posterkit_layout::resolver::TileSpec;
use serde::Serialize;
use tiny_skia::{IntRect, Pixmap};

/// A tile's source region on the surface, in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Map a tile onto the surface. `None` when nothing of the tile lands on it.
pub fn tile_pixel_rect(
    tile: &TileSpec,
    scale: f64,
    surface_width: u32,
    surface_height: u32,
) -> Option<PixelRect> {
    let (x0, x1) = pixel_span(tile.x, tile.width, scale, surface_width);
    let (y0, y1) = pixel_span(tile.y, tile.height, scale, surface_height);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(PixelRect {
        x: x0,
        y: y0,
        width: x1 - x0,
        height: y1 - y0,
    })
}

fn pixel_span(start: f64, extent: f64, scale: f64, limit: u32) -> (u32, u32) {
    let clamp = |v: f64| v.round().clamp(0.0, limit as f64) as u32;
    (clamp(start * scale), clamp((start + extent) * scale))
}

/// An extracted page tile.
#[derive(Clone)]
pub struct TileImage {
    pub row: u32,
    pub col: u32,
    pub source: PixelRect,
    pub pixmap: Pixmap,
}

impl TileImage {
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// PNG encoding of the tile.
    pub fn encode_png(&self) -> PosterResult<Vec<u8>> {
        encode_png(&self.pixmap)
    }
}

impl std::fmt::Debug for TileImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileImage")
            .field("row", &self.row)
            .field("col", &self.col)
            .field("source", &self.source)
            .finish()
    }
}

/// Copy the tile's region out of the composited surface.
pub fn extract_tile(surface: &Pixmap, tile: &TileSpec, scale: f64) -> Option<TileImage> {
    let source = tile_pixel_rect(tile, scale, surface.width(), surface.height())?;
    let rect = IntRect::from_xywh(
        source.x as i32,
        source.y as i32,
        source.width,
        source.height,
    )?;
    let pixmap = surface.clone_rect(rect)?;
    Some(TileImage {
        row: tile.row,
        col: tile.col,
        source,
        pixmap,
    })
}

/// Encode a pixmap as PNG with straight (non-premultiplied) alpha.
pub fn encode_png(pixmap: &Pixmap) -> PosterResult<Vec<u8>> {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    let image = image::RgbaImage::from_raw(pixmap.width(), pixmap.height(), rgba)
        .ok_or_else(|| PosterError::render("tile buffer size mismatch"))?;

    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| PosterError::render(format!("PNG encode failed: {e}")))?;
    Ok(out.into_inner())
}
