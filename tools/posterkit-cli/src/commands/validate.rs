//! Validate a poster document.

use std::path::PathBuf;

use posterkit_layout::resolve_layout;
use posterkit_poster_model::{LayerContent, PosterDocument};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating poster at: {}", path.display());

    let document =
        PosterDocument::load(&path).map_err(|e| anyhow::anyhow!("Failed to load poster: {e}"))?;

    println!("  Name: {}", document.name);
    println!("  Version: {}", document.version);
    println!("  Layers: {}", document.layers.len());

    let mut issues = Vec::new();
    match resolve_layout(&document.config) {
        Ok(layout) => {
            if layout.paper_substituted {
                issues.push(format!(
                    "unknown paper '{}' (the default paper will be used)",
                    document.config.paper_id
                ));
            }
            println!("  Pages: {}", layout.page_count());
        }
        Err(e) => issues.push(e.to_string()),
    }

    for layer in &document.layers {
        if let LayerContent::Image(source) = &layer.content {
            if let Err(e) = source.payload() {
                issues.push(format!("layer {}: {e}", layer.id));
            }
        }
        let b = &layer.bounds;
        if b.width <= 0.0 || b.height <= 0.0 {
            issues.push(format!("layer {} has an empty size", layer.id));
        }
    }

    if issues.is_empty() {
        println!("\nPoster is valid.");
    } else {
        println!("\nValidation issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
        println!(
            "\n{} issue(s) found. Export may fail or leave layers blank.",
            issues.len()
        );
    }

    Ok(())
}
