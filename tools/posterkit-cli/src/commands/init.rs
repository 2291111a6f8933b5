//! Create a new poster document.

use std::path::PathBuf;

use posterkit_common::config::AppConfig;
use posterkit_layout::resolve_layout;
use posterkit_poster_model::{Orientation, PosterConfig, PosterDocument, SizingMode, Unit};

pub struct InitOptions {
    pub name: String,
    pub output: Option<PathBuf>,
    pub unit: Option<String>,
    pub paper: Option<String>,
    pub landscape: bool,
    pub margin: Option<f64>,
    pub rows: u32,
    pub cols: u32,
    /// Explicit poster size; selects size mode.
    pub size: Option<(f64, f64)>,
}

pub fn run(app_config: &AppConfig, options: InitOptions) -> anyhow::Result<()> {
    let unit: Unit = options
        .unit
        .as_deref()
        .unwrap_or(app_config.editor.unit.as_str())
        .parse()?;

    let mut config = PosterConfig::default();
    config.set_unit(unit);
    config.paper_id = options
        .paper
        .unwrap_or_else(|| app_config.editor.paper_id.clone());
    if options.landscape {
        config.orientation = Orientation::Landscape;
    }
    if let Some(margin) = options.margin {
        config.margin = margin;
    }
    config.grid_rows = options.rows;
    config.grid_cols = options.cols;
    if let Some((width, height)) = options.size {
        config.mode = SizingMode::Size;
        config.target_width = width;
        config.target_height = height;
    }

    let layout = resolve_layout(&config)?;
    if layout.paper_substituted {
        println!(
            "Unknown paper '{}', using the default paper instead.",
            config.paper_id
        );
    }

    let path = options
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}.poster.json", options.name)));
    println!("Creating poster '{}' at {}", options.name, path.display());

    let document = PosterDocument::create(&path, &options.name, config)
        .map_err(|e| anyhow::anyhow!("Failed to create poster: {e}"))?;

    let u = layout.unit;
    println!("Poster created successfully:");
    println!("  ID: {}", document.id);
    println!(
        "  Size: {:.2}{u} x {:.2}{u}",
        layout.poster_width, layout.poster_height
    );
    println!(
        "  Pages: {} ({} across x {} down)",
        layout.page_count(),
        layout.cols,
        layout.rows
    );

    Ok(())
}
