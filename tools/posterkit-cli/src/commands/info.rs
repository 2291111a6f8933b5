//! Show poster information.

use std::path::PathBuf;

use posterkit_layout::PosterSession;
use posterkit_poster_model::{LayerContent, PosterDocument};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let document =
        PosterDocument::load(&path).map_err(|e| anyhow::anyhow!("Failed to load poster: {e}"))?;
    let session = PosterSession::from_document(&document);

    println!("Poster: {}", document.name);
    println!("  ID: {}", document.id);
    println!("  Created: {}", document.created_at);
    println!("  Modified: {}", document.modified_at);
    println!();

    let config = session.config();
    println!("Config:");
    println!("  Mode: {:?}", config.mode);
    println!("  Paper: {} ({:?})", config.paper_id, config.orientation);
    println!("  Margin: {}{}", config.margin, config.unit);
    println!(
        "  Cut lines: {}",
        if config.draws_cut_lines() {
            format!("{:?}", config.cut_line_style)
        } else {
            "off".to_string()
        }
    );
    println!("  Page numbers: {}", config.show_page_numbers);
    println!();

    let layout = session.layout()?;
    let u = layout.unit;
    println!("Layout:");
    println!(
        "  Page: {:.2}{u} x {:.2}{u} (printable {:.2}{u} x {:.2}{u})",
        layout.page_width, layout.page_height, layout.printable_width, layout.printable_height
    );
    println!(
        "  Poster: {:.2}{u} x {:.2}{u}",
        layout.poster_width, layout.poster_height
    );
    println!(
        "  Pages: {} ({} across x {} down)",
        layout.page_count(),
        layout.cols,
        layout.rows
    );
    println!();

    println!("Layers ({}, bottom to top):", session.layers().len());
    for layer in session.layers() {
        let b = &layer.bounds;
        println!(
            "  {:<10} {:<34} at ({:.3}, {:.3}) size {:.3} x {:.3}, rot {}°, opacity {}",
            layer.id,
            layer.label(),
            b.x,
            b.y,
            b.width,
            b.height,
            layer.rotation,
            layer.opacity
        );
        if let LayerContent::Text(_) = &layer.content {
            let style = layer.text_style();
            println!(
                "  {:<10} {} {} x{} {:?}",
                "", style.color, style.font_family, style.font_size, style.font_weight
            );
        }
    }

    Ok(())
}
