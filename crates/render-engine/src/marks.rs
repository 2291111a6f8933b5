//! Cut guides and page labels drawn on top of each page tile.
//!
//! Mark sizes are fixed per unit so a printed page looks the same whether
//! the poster was laid out in millimeters or inches.

use posterkit_common::error::PosterResult;
use posterkit_layout::resolver::PosterLayout;
use posterkit_poster_model::config::CutLineStyle;
use posterkit_poster_model::palette::Rgba;
use posterkit_poster_model::units::Unit;

use crate::sink::{LineStyle, PdfSink};

/// Outline color for the printable-area rectangle.
pub const OUTLINE_COLOR: Rgba = Rgba::rgb(128, 128, 128);

/// Scissor mark color.
pub const SCISSOR_COLOR: Rgba = Rgba::BLACK;

/// Page label color.
pub const LABEL_COLOR: Rgba = Rgba::rgb(0x66, 0x66, 0x66);

/// Page label font size in points.
pub const LABEL_FONT_SIZE: f64 = 8.0;

/// Mark dimensions in one unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkMetrics {
    pub line_width: f64,
    /// Dash and gap length for dashed outlines.
    pub dash: f64,
    /// Gap between a printable-area corner and its scissor mark.
    pub scissor_offset: f64,
    pub scissor_length: f64,
    /// Smallest distance from the label baseline to the page bottom.
    pub label_min_inset: f64,
}

impl MarkMetrics {
    pub fn for_unit(unit: Unit) -> Self {
        match unit {
            Unit::Millimeter => Self {
                line_width: 0.2,
                dash: 3.0,
                scissor_offset: 2.0,
                scissor_length: 5.0,
                label_min_inset: 3.0,
            },
            Unit::Inch => Self {
                line_width: 0.008,
                dash: 0.12,
                scissor_offset: 0.08,
                scissor_length: 0.2,
                label_min_inset: 0.12,
            },
        }
    }
}

/// Draw the printable-area outline and the corner scissor marks.
///
/// Does nothing for [`CutLineStyle::None`].
pub fn draw_cut_lines(
    sink: &mut dyn PdfSink,
    layout: &PosterLayout,
    style: CutLineStyle,
) -> PosterResult<()> {
    let metrics = MarkMetrics::for_unit(layout.unit);
    let outline = match style {
        CutLineStyle::None => return Ok(()),
        CutLineStyle::Solid => LineStyle::solid(metrics.line_width, OUTLINE_COLOR),
        CutLineStyle::Dashed => LineStyle::dashed(metrics.line_width, OUTLINE_COLOR, metrics.dash),
    };

    let m = layout.margin;
    sink.set_line_style(&outline)?;
    sink.draw_rect(m, m, layout.printable_width, layout.printable_height)?;

    sink.set_line_style(&LineStyle::solid(metrics.line_width, SCISSOR_COLOR))?;
    for (x1, y1, x2, y2) in scissor_marks(layout, &metrics) {
        sink.draw_line(x1, y1, x2, y2)?;
    }
    Ok(())
}

/// Two short lines per printable-area corner, pointing away from it.
pub fn scissor_marks(layout: &PosterLayout, metrics: &MarkMetrics) -> Vec<(f64, f64, f64, f64)> {
    let left = layout.margin;
    let top = layout.margin;
    let right = layout.margin + layout.printable_width;
    let bottom = layout.margin + layout.printable_height;
    let near = metrics.scissor_offset;
    let far = metrics.scissor_offset + metrics.scissor_length;

    let mut lines = Vec::with_capacity(8);
    for (cx, cy, dx, dy) in [
        (left, top, -1.0, -1.0),
        (right, top, 1.0, -1.0),
        (left, bottom, -1.0, 1.0),
        (right, bottom, 1.0, 1.0),
    ] {
        lines.push((cx + dx * near, cy, cx + dx * far, cy));
        lines.push((cx, cy + dy * near, cx, cy + dy * far));
    }
    lines
}

/// Label text for the page at `(row, col)`.
pub fn page_label(row: u32, col: u32) -> String {
    format!(
        "Page {}-{} (Row {}, Col {})",
        row + 1,
        col + 1,
        row + 1,
        col + 1
    )
}

/// Baseline position of the page label, inside the bottom-left margin.
pub fn label_position(layout: &PosterLayout) -> (f64, f64) {
    let metrics = MarkMetrics::for_unit(layout.unit);
    let inset = (layout.margin / 2.0).max(metrics.label_min_inset);
    (layout.margin, layout.page_height - inset)
}

pub fn draw_page_label(
    sink: &mut dyn PdfSink,
    layout: &PosterLayout,
    row: u32,
    col: u32,
) -> PosterResult<()> {
    let (x, y) = label_position(layout);
    sink.draw_text(&page_label(row, col), x, y, LABEL_FONT_SIZE, LABEL_COLOR)
}
