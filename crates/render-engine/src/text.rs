//! Text layer layout and rasterization.
//!
//! Font size scales with the surface height, so a text layer keeps the same
//! proportions in the editor preview and in a print-resolution export.
//! Lines are split on line breaks only; there is no word wrapping.

use std::fmt::Write as _;
use std::sync::Arc;

use posterkit_common::error::{PosterError, PosterResult};
use posterkit_poster_model::geometry::SurfaceRect;
use posterkit_poster_model::layer::TextStyle;
use tiny_skia::{Pixmap, Transform};

/// Base font size as a fraction of the surface height.
pub const BASE_FONT_SIZE_RATIO: f64 = 0.05;

/// Distance between consecutive line tops, in font sizes.
pub const LINE_HEIGHT: f64 = 1.2;

/// Baseline offset below the line top, in font sizes.
const ASCENT_RATIO: f64 = 0.8;

/// A positioned line of text, in surface pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub x: f64,
    /// Top of the line box.
    pub top: f64,
    /// Alphabetic baseline.
    pub baseline: f64,
}

/// Layout of a text layer on a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub font_size: f64,
    pub lines: Vec<TextLine>,
}

/// Lay out `text` top-aligned at the top-left corner of `rect`.
pub fn layout_text(
    text: &str,
    rect: &SurfaceRect,
    surface_height: f64,
    style: &TextStyle,
) -> TextLayout {
    let font_size = BASE_FONT_SIZE_RATIO * surface_height * style.font_size;
    let lines = text
        .split('\n')
        .enumerate()
        .map(|(i, line)| {
            let top = rect.y + i as f64 * LINE_HEIGHT * font_size;
            TextLine {
                text: line.trim_end_matches('\r').to_string(),
                x: rect.x,
                top,
                baseline: top + ASCENT_RATIO * font_size,
            }
        })
        .collect();
    TextLayout { font_size, lines }
}

/// Shared font database used to shape text layers.
#[derive(Clone)]
pub struct FontStore {
    db: Arc<fontdb::Database>,
}

impl FontStore {
    /// Fonts installed on the system.
    pub fn system() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "Loaded system fonts");
        Self { db: Arc::new(db) }
    }

    /// No fonts at all; text layers render nothing.
    pub fn empty() -> Self {
        Self {
            db: Arc::new(fontdb::Database::new()),
        }
    }

    /// Add a font file's data (TTF/OTF/TTC).
    pub fn with_font_data(mut self, data: Vec<u8>) -> Self {
        Arc::make_mut(&mut self.db).load_font_data(data);
        self
    }

    pub fn face_count(&self) -> usize {
        self.db.len()
    }
}

impl std::fmt::Debug for FontStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontStore")
            .field("faces", &self.db.len())
            .finish()
    }
}

/// Build an SVG document drawing one text layer onto a surface.
pub fn text_layer_svg(
    layout: &TextLayout,
    rect: &SurfaceRect,
    surface_width: u32,
    surface_height: u32,
    rotation: f64,
    opacity: f64,
    style: &TextStyle,
) -> String {
    let (cx, cy) = rect.center();
    let color = style.rgba();
    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{surface_width}" height="{surface_height}" viewBox="0 0 {surface_width} {surface_height}">"#
    );
    let _ = write!(
        svg,
        r#"<g transform="rotate({rotation} {cx} {cy})" opacity="{opacity}">"#
    );
    for line in &layout.lines {
        if line.text.is_empty() {
            continue;
        }
        let _ = write!(
            svg,
            r#"<text xml:space="preserve" x="{}" y="{}" font-family="{}" font-size="{}" font-weight="{}" fill="{}" fill-opacity="{}">{}</text>"#,
            line.x,
            line.baseline,
            escape_xml(&style.font_family),
            layout.font_size,
            style.font_weight.numeric(),
            color.to_hex(),
            color.a as f64 / 255.0,
            escape_xml(&line.text),
        );
    }
    svg.push_str("</g></svg>");
    svg
}

/// Draw a text layer over the existing contents of `pixmap`.
#[allow(clippy::too_many_arguments)]
pub fn draw_text_layer(
    pixmap: &mut Pixmap,
    fonts: &FontStore,
    text: &str,
    rect: &SurfaceRect,
    rotation: f64,
    opacity: f64,
    style: &TextStyle,
) -> PosterResult<TextLayout> {
    let layout = layout_text(text, rect, pixmap.height() as f64, style);
    let svg = text_layer_svg(
        &layout,
        rect,
        pixmap.width(),
        pixmap.height(),
        rotation,
        opacity,
        style,
    );

    let mut options = usvg::Options::default();
    options.fontdb = Arc::clone(&fonts.db);
    let tree = usvg::Tree::from_data(svg.as_bytes(), &options)
        .map_err(|e| PosterError::text_layer(e.to_string()))?;

    resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());
    Ok(layout)
}

fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if !is_xml_char(c) => {}
            _ => out.push(c),
        }
    }
    out
}

/// Characters allowed in an XML 1.0 document.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}')
        || c >= '\u{10000}'
}
