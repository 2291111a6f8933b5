//! Export pipeline: composite, tile, mark, and emit pages to a sink.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use posterkit_common::config::ExportDefaults;
use posterkit_common::error::{PosterError, PosterResult};
use posterkit_layout::resolver::{resolve_layout, PosterLayout};
use posterkit_poster_model::config::PosterConfig;
use posterkit_poster_model::layer::Layer;
use serde::Serialize;

use crate::compositor::{check_surface, composite, CompositeOptions};
use crate::marks::{draw_cut_lines, draw_page_label};
use crate::sink::PdfSink;
use crate::text::FontStore;
use crate::tiler::extract_tile;

/// Largest page count a single export will emit.
pub const MAX_EXPORT_PAGES: u32 = 10_000;

/// Progress callback for export rendering.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send + Sync>;

/// Export progress report.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Pages emitted so far.
    pub pages_done: u32,

    /// Total pages in the document.
    pub total_pages: u32,

    /// Current stage.
    pub stage: ExportStage,
}

/// Stages of the export process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Preparing,
    Compositing,
    Paginating,
    Finalizing,
    Complete,
}

/// Summary of a finished export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub pages: u32,
    pub rows: u32,
    pub cols: u32,
    pub surface_width: u32,
    pub surface_height: u32,
    /// Raster pixels per layout unit.
    pub scale: f64,
    /// Pages emitted without an image because their tile held no pixels.
    pub degenerate_pages: Vec<(u32, u32)>,
    /// Image layers that could not be decoded.
    pub skipped_layers: Vec<String>,
    /// Name passed to the sink's `save`.
    pub filename: String,
}

/// Runs exports, one at a time.
///
/// A second export started while one is running fails with
/// [`PosterError::ExportInProgress`] instead of queuing.
#[derive(Debug, Clone)]
pub struct PosterExporter {
    in_flight: Arc<AtomicBool>,
    fonts: FontStore,
    defaults: ExportDefaults,
}

/// Marks an export as running until dropped.
#[derive(Debug)]
pub struct ExportGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for ExportGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl PosterExporter {
    pub fn new(fonts: FontStore, defaults: ExportDefaults) -> Self {
        Self {
            in_flight: Arc::new(AtomicBool::new(false)),
            fonts,
            defaults,
        }
    }

    pub fn defaults(&self) -> &ExportDefaults {
        &self.defaults
    }

    /// Whether an export is currently running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claim the exporter. Fails if an export is already running.
    pub fn try_begin(&self) -> PosterResult<ExportGuard> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PosterError::ExportInProgress)?;
        Ok(ExportGuard {
            flag: Arc::clone(&self.in_flight),
        })
    }

    /// Export the poster to `sink`.
    ///
    /// Layout problems fail before the sink sees any call. Pages are emitted
    /// in row-major order.
    pub async fn export(
        &self,
        config: &PosterConfig,
        layers: &[Layer],
        sink: &mut dyn PdfSink,
        progress: Option<ProgressCallback>,
    ) -> PosterResult<ExportReport> {
        let _guard = self.try_begin()?;
        let report = |stage: ExportStage, pages_done: u32, total_pages: u32| {
            if let Some(cb) = &progress {
                let fraction = match stage {
                    ExportStage::Preparing => 0.0,
                    ExportStage::Compositing => 0.1,
                    ExportStage::Paginating => {
                        0.3 + 0.6 * pages_done as f64 / total_pages.max(1) as f64
                    }
                    ExportStage::Finalizing => 0.95,
                    ExportStage::Complete => 1.0,
                };
                cb(ExportProgress {
                    progress: fraction,
                    pages_done,
                    total_pages,
                    stage,
                });
            }
        };

        report(ExportStage::Preparing, 0, 0);
        let layout = resolve_layout(config)?;
        let options = CompositeOptions::new(
            layout.unit.raster_scale(&self.defaults),
            self.defaults.max_surface_pixels,
        );
        check_surface(&layout, &options)?;
        let total = checked_page_count(&layout)?;

        tracing::info!(
            sink = sink.name(),
            rows = layout.rows,
            cols = layout.cols,
            unit = %layout.unit,
            scale = options.scale,
            "Starting poster export"
        );

        report(ExportStage::Compositing, 0, total);
        let poster = composite(&layout, layers, &options, &self.fonts).await?;

        sink.new_document(layout.unit, layout.orientation)?;
        let mut degenerate_pages = Vec::new();
        for (index, tile) in layout.tiles().iter().enumerate() {
            sink.add_page(layout.page_width, layout.page_height, layout.orientation)?;

            let image = if tile.is_degenerate() {
                None
            } else {
                extract_tile(&poster.pixmap, tile, poster.scale)
            };
            match image {
                Some(image) => {
                    sink.draw_image(&image, layout.margin, layout.margin, tile.width, tile.height)?
                }
                None => {
                    tracing::warn!(row = tile.row, col = tile.col, "Page tile is empty");
                    degenerate_pages.push((tile.row, tile.col));
                }
            }

            draw_overlays(sink, config, &layout, tile.row, tile.col)?;
            report(ExportStage::Paginating, index as u32 + 1, total);
        }

        report(ExportStage::Finalizing, total, total);
        let filename = format!("{}.pdf", self.defaults.base_filename);
        sink.save(&filename)?;
        report(ExportStage::Complete, total, total);

        tracing::info!(pages = total, filename = %filename, "Poster export complete");
        Ok(ExportReport {
            pages: total,
            rows: layout.rows,
            cols: layout.cols,
            surface_width: poster.pixmap.width(),
            surface_height: poster.pixmap.height(),
            scale: poster.scale,
            degenerate_pages,
            skipped_layers: poster.skipped_layers,
            filename,
        })
    }
}

/// Page count of `layout`, rejected when it exceeds [`MAX_EXPORT_PAGES`].
fn checked_page_count(layout: &PosterLayout) -> PosterResult<u32> {
    let pages = layout.page_count();
    u32::try_from(pages)
        .ok()
        .filter(|&n| n <= MAX_EXPORT_PAGES)
        .ok_or_else(|| {
            PosterError::invalid_config(
                "pages",
                pages,
                format!("export is limited to {MAX_EXPORT_PAGES} pages"),
            )
        })
}

fn draw_overlays(
    sink: &mut dyn PdfSink,
    config: &PosterConfig,
    layout: &PosterLayout,
    row: u32,
    col: u32,
) -> PosterResult<()> {
    if config.draws_cut_lines() {
        draw_cut_lines(sink, layout, config.cut_line_style)?;
    }
    if config.show_page_numbers {
        draw_page_label(sink, layout, row, col)?;
    }
    Ok(())
}
