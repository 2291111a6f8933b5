//! Layout resolution: poster size, page grid, and printable area.
//!
//! The resolver is a pure function of the config and the paper catalog.
//! It is cheap enough to re-run on every config change.

use posterkit_common::error::{PosterError, PosterResult};
use posterkit_poster_model::config::{Orientation, PosterConfig, SizingMode};
use posterkit_poster_model::paper::{resolve_paper, ResolvedPaper};
use posterkit_poster_model::units::Unit;
use serde::Serialize;

/// Slack applied before rounding page counts up, so that a poster that is
/// an exact multiple of the printable area does not gain a sliver page from
/// floating-point noise.
const PAGE_FIT_EPSILON: f64 = 1e-9;

/// Resolved poster geometry. All lengths are in `unit`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PosterLayout {
    pub unit: Unit,

    pub orientation: Orientation,

    /// Page width after orientation.
    pub page_width: f64,

    /// Page height after orientation.
    pub page_height: f64,

    pub margin: f64,

    pub printable_width: f64,

    pub printable_height: f64,

    pub poster_width: f64,

    pub poster_height: f64,

    pub cols: u32,

    pub rows: u32,

    /// True when the configured paper id was unknown and the default was used.
    pub paper_substituted: bool,
}

/// One page's slice of the poster, in physical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TileSpec {
    pub row: u32,
    pub col: u32,
    /// Left edge on the poster.
    pub x: f64,
    /// Top edge on the poster.
    pub y: f64,
    /// Width of poster content on this page; smaller than the printable
    /// width for a trailing partial column.
    pub width: f64,
    /// Height of poster content on this page.
    pub height: f64,
}

impl TileSpec {
    /// Whether the tile carries any poster content.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Validate the config and resolve its layout against the paper catalog.
pub fn resolve_layout(config: &PosterConfig) -> PosterResult<PosterLayout> {
    config.validate()?;
    let paper = resolve_paper(&config.paper_id, config.unit);
    resolve_layout_with_paper(config, &paper)
}

/// Resolve a layout against already-resolved paper dimensions.
///
/// `paper` must be expressed in `config.unit`.
pub fn resolve_layout_with_paper(
    config: &PosterConfig,
    paper: &ResolvedPaper,
) -> PosterResult<PosterLayout> {
    let (page_width, page_height) = paper.oriented(config.orientation);

    let printable_width = page_width - 2.0 * config.margin;
    let printable_height = page_height - 2.0 * config.margin;
    if printable_width <= 0.0 || printable_height <= 0.0 {
        return Err(PosterError::InvalidMargin {
            margin: config.margin,
            paper_width: page_width,
            paper_height: page_height,
            unit: config.unit.symbol().to_string(),
        });
    }

    let (poster_width, poster_height, cols, rows) = match config.mode {
        SizingMode::Grid => (
            config.grid_cols as f64 * printable_width,
            config.grid_rows as f64 * printable_height,
            config.grid_cols,
            config.grid_rows,
        ),
        SizingMode::Size => (
            config.target_width,
            config.target_height,
            pages_to_cover(config.target_width, printable_width),
            pages_to_cover(config.target_height, printable_height),
        ),
    };

    Ok(PosterLayout {
        unit: config.unit,
        orientation: config.orientation,
        page_width,
        page_height,
        margin: config.margin,
        printable_width,
        printable_height,
        poster_width,
        poster_height,
        cols,
        rows,
        paper_substituted: paper.substituted,
    })
}

fn pages_to_cover(extent: f64, printable: f64) -> u32 {
    let pages = (extent / printable - PAGE_FIT_EPSILON).ceil();
    pages.max(1.0) as u32
}

impl PosterLayout {
    /// Total number of pages.
    pub fn page_count(&self) -> u64 {
        self.rows as u64 * self.cols as u64
    }

    /// The poster region printed on page `(row, col)`.
    pub fn tile(&self, row: u32, col: u32) -> TileSpec {
        let x = col as f64 * self.printable_width;
        let y = row as f64 * self.printable_height;
        TileSpec {
            row,
            col,
            x,
            y,
            width: self.printable_width.min(self.poster_width - x),
            height: self.printable_height.min(self.poster_height - y),
        }
    }

    /// All tiles in row-major order.
    ///
    /// Callers bound `page_count()` first; this allocates one entry per page.
    pub fn tiles(&self) -> Vec<TileSpec> {
        let mut tiles = Vec::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                tiles.push(self.tile(row, col));
            }
        }
        tiles
    }

    /// Poster aspect ratio (width / height).
    pub fn aspect_ratio(&self) -> f64 {
        self.poster_width / self.poster_height
    }

    /// Logical canvas size that fits the poster's longer side into `max_extent`.
    pub fn canvas_size(&self, max_extent: f64) -> (f64, f64) {
        if self.poster_width >= self.poster_height {
            (max_extent, max_extent / self.aspect_ratio())
        } else {
            (max_extent * self.aspect_ratio(), max_extent)
        }
    }
}
