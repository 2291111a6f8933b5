//! Edit the layer list and units of a saved poster.

use std::path::{Path, PathBuf};

use anyhow::Context;
use posterkit_layout::PosterSession;
use posterkit_poster_model::palette::{Rgba, FONT_FAMILIES};
use posterkit_poster_model::{FontWeight, ImageSource, PosterDocument, Unit};

use crate::Placement;

pub struct StyleOptions {
    pub color: Option<String>,
    pub font_size: Option<f64>,
    pub font: Option<String>,
    pub bold: bool,
}

pub fn add_text(
    path: PathBuf,
    text: String,
    style: StyleOptions,
    placement: Placement,
) -> anyhow::Result<()> {
    let (mut document, mut session) = open(&path)?;

    let id = session.add_text_layer(text.replace("\\n", "\n"));
    let mut text_style = session
        .layer(&id)
        .map(|l| l.text_style())
        .unwrap_or_default();
    if let Some(color) = style.color {
        let parsed = Rgba::from_name_or_hex(&color).ok_or_else(|| {
            anyhow::anyhow!("Invalid color '{color}', expected #rrggbb or a palette name")
        })?;
        text_style.color = parsed.to_hex();
    }
    if let Some(size) = style.font_size {
        text_style.font_size = size;
    }
    if let Some(font) = style.font {
        if !FONT_FAMILIES.iter().any(|f| f.eq_ignore_ascii_case(&font)) {
            println!("Note: '{font}' is not a listed font family; it renders only if installed.");
        }
        text_style.font_family = font;
    }
    if style.bold {
        text_style.font_weight = FontWeight::Bold;
    }
    session.set_style(&id, text_style)?;
    apply_placement(&mut session, &id, &placement)?;

    save(&path, &mut document, &session)?;
    println!("Added text layer {id}");
    Ok(())
}

pub fn add_image(path: PathBuf, image: PathBuf, placement: Placement) -> anyhow::Result<()> {
    let (mut document, mut session) = open(&path)?;

    let bytes = std::fs::read(&image)
        .with_context(|| format!("Failed to read image {}", image.display()))?;
    let source = ImageSource::from_bytes(&bytes, mime_for(&image));
    let id = session.add_image_layer(source);
    apply_placement(&mut session, &id, &placement)?;

    save(&path, &mut document, &session)?;
    println!("Added image layer {id} from {}", image.display());
    Ok(())
}

pub fn set_unit(path: PathBuf, unit: &str) -> anyhow::Result<()> {
    let unit: Unit = unit.parse()?;
    let (mut document, mut session) = open(&path)?;

    let from = session.config().unit;
    session.set_unit(unit);
    save(&path, &mut document, &session)?;

    let config = session.config();
    println!("Converted poster from {from} to {unit}");
    println!("  Margin: {}{unit}", config.margin);
    println!(
        "  Target size: {}{unit} x {}{unit}",
        config.target_width, config.target_height
    );
    Ok(())
}

fn open(path: &Path) -> anyhow::Result<(PosterDocument, PosterSession)> {
    let document =
        PosterDocument::load(path).map_err(|e| anyhow::anyhow!("Failed to load poster: {e}"))?;
    let session = PosterSession::from_document(&document);
    Ok((document, session))
}

fn save(path: &Path, document: &mut PosterDocument, session: &PosterSession) -> anyhow::Result<()> {
    session.write_to(document);
    document
        .save(path)
        .map_err(|e| anyhow::anyhow!("Failed to save poster: {e}"))
}

fn apply_placement(
    session: &mut PosterSession,
    id: &str,
    placement: &Placement,
) -> anyhow::Result<()> {
    if let Some(layer) = session.layer(id) {
        let mut bounds = layer.bounds;
        bounds.x = placement.x.unwrap_or(bounds.x);
        bounds.y = placement.y.unwrap_or(bounds.y);
        bounds.width = placement.width.unwrap_or(bounds.width);
        bounds.height = placement.height.unwrap_or(bounds.height);
        session.set_bounds(id, bounds)?;
    }
    if let Some(rotation) = placement.rotation {
        session.set_rotation(id, rotation)?;
    }
    if let Some(opacity) = placement.opacity {
        session.set_opacity(id, opacity)?;
    }
    Ok(())
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}
