//! Export a poster into printable page tiles.

use std::io::Write;
use std::path::PathBuf;

use posterkit_common::config::AppConfig;
use posterkit_poster_model::{PosterDocument, Unit};
use posterkit_render_engine::text::FontStore;
use posterkit_render_engine::{ExportProgress, ExportStage, PosterExporter, RecordingSink};

pub async fn run(
    app_config: &AppConfig,
    path: PathBuf,
    output: Option<PathBuf>,
    scale: Option<f64>,
) -> anyhow::Result<()> {
    let document =
        PosterDocument::load(&path).map_err(|e| anyhow::anyhow!("Failed to load poster: {e}"))?;

    let mut defaults = app_config.export.clone();
    if let Some(scale) = scale {
        match document.config.unit {
            Unit::Millimeter => defaults.pixels_per_mm = scale,
            Unit::Inch => defaults.pixels_per_inch = scale,
        }
    }

    let output_dir = output.unwrap_or_else(|| {
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    });

    println!("Exporting poster '{}'", document.name);

    let exporter = PosterExporter::new(FontStore::system(), defaults);
    let mut sink = RecordingSink::new();
    let report = exporter
        .export(
            &document.config,
            &document.layers,
            &mut sink,
            Some(Box::new(|p: ExportProgress| {
                if p.stage == ExportStage::Paginating {
                    print!("\r  Page {}/{}", p.pages_done, p.total_pages);
                    let _ = std::io::stdout().flush();
                } else if p.stage == ExportStage::Complete {
                    println!();
                }
            })),
        )
        .await
        .map_err(|e| anyhow::anyhow!("Export failed: {e}"))?;

    let manifest = sink.write_bundle(&output_dir)?;

    println!("Export complete:");
    println!(
        "  Pages: {} ({} across x {} down)",
        report.pages, report.cols, report.rows
    );
    println!(
        "  Raster: {}x{} px",
        report.surface_width, report.surface_height
    );
    for id in &report.skipped_layers {
        println!("  Skipped layer {id}: image could not be decoded");
    }
    println!("  Manifest: {}", manifest.display());
    tracing::debug!(report = %serde_json::to_string(&report)?, "Export report");

    Ok(())
}
