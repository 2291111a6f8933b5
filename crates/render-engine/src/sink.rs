//! Output document sink.
//!
//! The exporter drives a [`PdfSink`] with page-level drawing commands in the
//! document's own unit. [`RecordingSink`] keeps the command stream in memory
//! and can write it out as a JSON manifest plus one PNG per page tile.

use std::fs;
use std::path::{Path, PathBuf};

use posterkit_common::error::{PosterError, PosterResult};
use posterkit_poster_model::config::Orientation;
use posterkit_poster_model::palette::Rgba;
use posterkit_poster_model::units::Unit;
use serde::Serialize;

use crate::tiler::{PixelRect, TileImage};

/// Stroke settings for subsequent lines and rectangles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub width: f64,
    pub color: Rgba,
    /// Dash pattern (on, off, ...); `None` draws solid lines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<Vec<f64>>,
}

impl LineStyle {
    pub fn solid(width: f64, color: Rgba) -> Self {
        Self {
            width,
            color,
            dash: None,
        }
    }

    pub fn dashed(width: f64, color: Rgba, dash: f64) -> Self {
        Self {
            width,
            color,
            dash: Some(vec![dash, dash]),
        }
    }
}

/// A paginated vector document target.
///
/// All coordinates are in the unit passed to `new_document`, with the origin
/// at the top-left of the current page.
pub trait PdfSink: Send {
    fn new_document(&mut self, unit: Unit, orientation: Orientation) -> PosterResult<()>;

    /// Start a page. The first call produces the first page.
    fn add_page(&mut self, width: f64, height: f64, orientation: Orientation) -> PosterResult<()>;

    fn draw_image(
        &mut self,
        image: &TileImage,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> PosterResult<()>;

    fn set_line_style(&mut self, style: &LineStyle) -> PosterResult<()>;

    /// Stroke a rectangle outline.
    fn draw_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> PosterResult<()>;

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> PosterResult<()>;

    /// Draw text with its baseline at `y`.
    fn draw_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        font_size: f64,
        color: Rgba,
    ) -> PosterResult<()>;

    /// Finish the document under `filename`.
    fn save(&mut self, filename: &str) -> PosterResult<()>;

    /// Sink name for logs.
    fn name(&self) -> &str;
}

/// One recorded sink call.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SinkCommand {
    NewDocument {
        unit: Unit,
        orientation: Orientation,
    },
    AddPage {
        width: f64,
        height: f64,
        orientation: Orientation,
    },
    DrawImage {
        row: u32,
        col: u32,
        source: PixelRect,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        /// File name of the tile inside a written bundle.
        #[serde(skip_serializing_if = "Option::is_none")]
        file: Option<String>,
        #[serde(skip)]
        png: Vec<u8>,
    },
    SetLineStyle(LineStyle),
    DrawRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    DrawLine {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    DrawText {
        text: String,
        x: f64,
        y: f64,
        font_size: f64,
        color: Rgba,
    },
    Save {
        filename: String,
    },
}

/// In-memory sink that records every call.
#[derive(Debug, Default)]
pub struct RecordingSink {
    commands: Vec<SinkCommand>,
    saved_as: Option<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[SinkCommand] {
        &self.commands
    }

    /// Number of pages started.
    pub fn page_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, SinkCommand::AddPage { .. }))
            .count()
    }

    /// Commands grouped per page, in page order.
    pub fn pages(&self) -> Vec<&[SinkCommand]> {
        let starts: Vec<usize> = self
            .commands
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, SinkCommand::AddPage { .. }))
            .map(|(i, _)| i)
            .collect();

        starts
            .iter()
            .enumerate()
            .map(|(n, &start)| {
                let end = starts
                    .get(n + 1)
                    .copied()
                    .unwrap_or_else(|| self.page_end(start));
                &self.commands[start..end]
            })
            .collect()
    }

    fn page_end(&self, start: usize) -> usize {
        self.commands[start..]
            .iter()
            .position(|c| matches!(c, SinkCommand::Save { .. }))
            .map_or(self.commands.len(), |offset| start + offset)
    }

    /// Every text drawn, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                SinkCommand::DrawText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Filename passed to `save`, if the document was finished.
    pub fn saved_as(&self) -> Option<&str> {
        self.saved_as.as_deref()
    }

    /// Write the recorded document into `dir`: a `<base>.json` manifest of
    /// all commands and one `<base>-page-R-C.png` per drawn tile.
    ///
    /// Returns the manifest path.
    pub fn write_bundle(&mut self, dir: &Path) -> PosterResult<PathBuf> {
        let filename = self
            .saved_as
            .clone()
            .ok_or_else(|| PosterError::sink("document was never saved"))?;
        let base = Path::new(&filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("poster")
            .to_string();

        fs::create_dir_all(dir)?;
        for command in &mut self.commands {
            if let SinkCommand::DrawImage {
                row,
                col,
                file,
                png,
                ..
            } = command
            {
                let name = format!("{base}-page-{}-{}.png", *row + 1, *col + 1);
                fs::write(dir.join(&name), &*png)?;
                *file = Some(name);
            }
        }

        let manifest = dir.join(format!("{base}.json"));
        let json = serde_json::to_string_pretty(&self.commands)?;
        fs::write(&manifest, json)?;
        tracing::info!(path = %manifest.display(), "Wrote export bundle");
        Ok(manifest)
    }
}

impl PdfSink for RecordingSink {
    fn new_document(&mut self, unit: Unit, orientation: Orientation) -> PosterResult<()> {
        self.commands.clear();
        self.saved_as = None;
        self.commands
            .push(SinkCommand::NewDocument { unit, orientation });
        Ok(())
    }

    fn add_page(&mut self, width: f64, height: f64, orientation: Orientation) -> PosterResult<()> {
        self.commands.push(SinkCommand::AddPage {
            width,
            height,
            orientation,
        });
        Ok(())
    }

    fn draw_image(
        &mut self,
        image: &TileImage,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> PosterResult<()> {
        self.commands.push(SinkCommand::DrawImage {
            row: image.row,
            col: image.col,
            source: image.source,
            x,
            y,
            width,
            height,
            file: None,
            png: image.encode_png()?,
        });
        Ok(())
    }

    fn set_line_style(&mut self, style: &LineStyle) -> PosterResult<()> {
        self.commands.push(SinkCommand::SetLineStyle(style.clone()));
        Ok(())
    }

    fn draw_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> PosterResult<()> {
        self.commands.push(SinkCommand::DrawRect {
            x,
            y,
            width,
            height,
        });
        Ok(())
    }

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> PosterResult<()> {
        self.commands.push(SinkCommand::DrawLine { x1, y1, x2, y2 });
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        font_size: f64,
        color: Rgba,
    ) -> PosterResult<()> {
        self.commands.push(SinkCommand::DrawText {
            text: text.to_string(),
            x,
            y,
            font_size,
            color,
        });
        Ok(())
    }

    fn save(&mut self, filename: &str) -> PosterResult<()> {
        self.commands.push(SinkCommand::Save {
            filename: filename.to_string(),
        });
        self.saved_as = Some(filename.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::Pixmap;

    fn tile(row: u32, col: u32) -> TileImage {
        TileImage {
            row,
            col,
            source: PixelRect {
                x: 0,
                y: 0,
                width: 2,
                height: 2,
            },
            pixmap: Pixmap::new(2, 2).unwrap(),
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("posterkit-sink-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_pages_group_commands() {
        let mut sink = RecordingSink::new();
        sink.new_document(Unit::Millimeter, Orientation::Portrait).unwrap();
        sink.add_page(210.0, 297.0, Orientation::Portrait).unwrap();
        sink.draw_line(0.0, 0.0, 1.0, 1.0).unwrap();
        sink.add_page(210.0, 297.0, Orientation::Portrait).unwrap();
        sink.draw_text("hi", 1.0, 2.0, 8.0, Rgba::BLACK).unwrap();
        sink.draw_rect(0.0, 0.0, 5.0, 5.0).unwrap();
        sink.save("poster.pdf").unwrap();

        assert_eq!(sink.page_count(), 2);
        let pages = sink.pages();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].len(), 2);
        assert_eq!(pages[1].len(), 3);
        assert_eq!(sink.texts(), vec!["hi"]);
        assert_eq!(sink.saved_as(), Some("poster.pdf"));
    }

    #[test]
    fn test_new_document_resets() {
        let mut sink = RecordingSink::new();
        sink.new_document(Unit::Inch, Orientation::Landscape).unwrap();
        sink.add_page(11.0, 8.5, Orientation::Landscape).unwrap();
        sink.save("a.pdf").unwrap();
        sink.new_document(Unit::Inch, Orientation::Landscape).unwrap();
        assert_eq!(sink.commands().len(), 1);
        assert!(sink.saved_as().is_none());
    }

    #[test]
    fn test_write_bundle_requires_save() {
        let mut sink = RecordingSink::new();
        sink.new_document(Unit::Millimeter, Orientation::Portrait).unwrap();
        let err = sink.write_bundle(&scratch_dir("unsaved")).unwrap_err();
        assert!(matches!(err, PosterError::Sink { .. }));
    }

    #[test]
    fn test_write_bundle_writes_manifest_and_tiles() {
        let dir = scratch_dir("bundle");
        let mut sink = RecordingSink::new();
        sink.new_document(Unit::Millimeter, Orientation::Portrait).unwrap();
        sink.add_page(210.0, 297.0, Orientation::Portrait).unwrap();
        sink.draw_image(&tile(0, 1), 10.0, 10.0, 190.0, 277.0).unwrap();
        sink.save("my-poster.pdf").unwrap();

        let manifest = sink.write_bundle(&dir).unwrap();
        assert_eq!(manifest, dir.join("my-poster.json"));
        assert!(dir.join("my-poster-page-1-2.png").exists());

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&manifest).unwrap()).unwrap();
        let ops: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["op"].as_str().unwrap())
            .collect();
        assert_eq!(ops, vec!["new_document", "add_page", "draw_image", "save"]);
        assert_eq!(json[2]["file"], "my-poster-page-1-2.png");
        assert!(json[2].get("png").is_none());

        fs::remove_dir_all(&dir).unwrap();
    }
}
