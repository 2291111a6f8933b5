//! The editing session.
//!
//! A [`PosterSession`] owns the poster config, the ordered layer list and
//! the gesture state. Everything downstream (layout, compositing, tiling)
//! is a pure function of what the session holds.

use posterkit_common::error::{PosterError, PosterResult};
use posterkit_poster_model::config::PosterConfig;
use posterkit_poster_model::document::PosterDocument;
use posterkit_poster_model::geometry::{FracRect, Point2D};
use posterkit_poster_model::layer::{ImageSource, Layer, LayerContent, TextStyle};
use posterkit_poster_model::units::Unit;

use crate::interaction::{GestureController, ResizeHandle};
use crate::resolver::{resolve_layout, PosterLayout};

/// Logical size of the longer poster side on the editing canvas.
pub const DEFAULT_CANVAS_EXTENT: f64 = 800.0;

/// Editing state for one poster.
#[derive(Debug, Clone)]
pub struct PosterSession {
    config: PosterConfig,
    layers: Vec<Layer>,
    selected: Option<String>,
    gestures: GestureController,
    next_layer_number: u64,
}

impl PosterSession {
    /// Start a session with an empty layer list.
    pub fn new(config: PosterConfig) -> Self {
        Self::with_layers(config, vec![])
    }

    /// Start a session from a saved document.
    pub fn from_document(document: &PosterDocument) -> Self {
        Self::with_layers(document.config.clone(), document.layers.clone())
    }

    fn with_layers(config: PosterConfig, layers: Vec<Layer>) -> Self {
        let next_layer_number = layers
            .iter()
            .filter_map(|l| l.id.strip_prefix("layer-")?.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let mut session = Self {
            config,
            layers,
            selected: None,
            gestures: GestureController::new(DEFAULT_CANVAS_EXTENT, DEFAULT_CANVAS_EXTENT),
            next_layer_number,
        };
        session.refresh_canvas();
        session
    }

    /// Copy the session's config and layers back into a document.
    pub fn write_to(&self, document: &mut PosterDocument) {
        document.config = self.config.clone();
        document.layers = self.layers.clone();
    }

    pub fn config(&self) -> &PosterConfig {
        &self.config
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Resolve the current layout.
    pub fn layout(&self) -> PosterResult<PosterLayout> {
        resolve_layout(&self.config)
    }

    /// Replace the config after validating it.
    ///
    /// An invalid config (including a margin that leaves no printable area)
    /// is rejected and the previous config kept.
    pub fn set_config(&mut self, config: PosterConfig) -> PosterResult<PosterLayout> {
        let layout = resolve_layout(&config)?;
        self.config = config;
        self.apply_canvas(&layout);
        Ok(layout)
    }

    /// Switch units, converting every physical config field.
    pub fn set_unit(&mut self, unit: Unit) {
        self.config.set_unit(unit);
        self.refresh_canvas();
    }

    // --- Layer list -------------------------------------------------------

    /// Append a text layer on top and select it. Returns its id.
    pub fn add_text_layer(&mut self, text: impl Into<String>) -> String {
        let layer = Layer::text(self.next_layer_id(), text);
        self.push_layer(layer)
    }

    /// Append an image layer on top and select it. Returns its id.
    pub fn add_image_layer(&mut self, source: ImageSource) -> String {
        let layer = Layer::image(self.next_layer_id(), source);
        self.push_layer(layer)
    }

    /// Remove a layer, clearing the selection and any gesture on it.
    pub fn remove_layer(&mut self, id: &str) -> Option<Layer> {
        let index = self.index_of(id)?;
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        if self.gestures.gesture().layer_id() == Some(id) {
            self.gestures.finish();
        }
        tracing::debug!(layer = id, "Removed layer");
        Some(self.layers.remove(index))
    }

    pub fn select(&mut self, id: Option<&str>) -> PosterResult<()> {
        if let Some(id) = id {
            self.index_or_err(id)?;
        }
        self.selected = id.map(str::to_string);
        Ok(())
    }

    pub fn selected(&self) -> Option<&Layer> {
        self.selected.as_deref().and_then(|id| self.layer(id))
    }

    /// Move a layer one step up the stack. Returns false if already on top.
    pub fn bring_forward(&mut self, id: &str) -> PosterResult<bool> {
        let index = self.index_or_err(id)?;
        if index + 1 >= self.layers.len() {
            return Ok(false);
        }
        self.layers.swap(index, index + 1);
        Ok(true)
    }

    /// Move a layer one step down the stack. Returns false if already at the bottom.
    pub fn send_backward(&mut self, id: &str) -> PosterResult<bool> {
        let index = self.index_or_err(id)?;
        if index == 0 {
            return Ok(false);
        }
        self.layers.swap(index, index - 1);
        Ok(true)
    }

    pub fn bring_to_front(&mut self, id: &str) -> PosterResult<()> {
        let index = self.index_or_err(id)?;
        let layer = self.layers.remove(index);
        self.layers.push(layer);
        Ok(())
    }

    pub fn send_to_back(&mut self, id: &str) -> PosterResult<()> {
        let index = self.index_or_err(id)?;
        let layer = self.layers.remove(index);
        self.layers.insert(0, layer);
        Ok(())
    }

    // --- Property edits ---------------------------------------------------

    pub fn set_bounds(&mut self, id: &str, bounds: FracRect) -> PosterResult<()> {
        self.layer_mut(id)?.bounds = bounds;
        Ok(())
    }

    pub fn set_opacity(&mut self, id: &str, opacity: f64) -> PosterResult<()> {
        self.layer_mut(id)?.set_opacity(opacity);
        Ok(())
    }

    pub fn set_rotation(&mut self, id: &str, degrees: f64) -> PosterResult<()> {
        if !degrees.is_finite() {
            return Err(PosterError::invalid_config(
                "rotation",
                degrees,
                "must be a finite angle",
            ));
        }
        self.layer_mut(id)?.rotation = degrees;
        Ok(())
    }

    /// Replace the text of a text layer.
    pub fn set_text(&mut self, id: &str, text: impl Into<String>) -> PosterResult<()> {
        let layer = self.layer_mut(id)?;
        match &mut layer.content {
            LayerContent::Text(current) => {
                *current = text.into();
                Ok(())
            }
            LayerContent::Image(_) => Err(PosterError::invalid_config(
                "text",
                id,
                "layer is not a text layer",
            )),
        }
    }

    /// Replace the style of a text layer.
    pub fn set_style(&mut self, id: &str, style: TextStyle) -> PosterResult<()> {
        if !style.font_size.is_finite() || style.font_size <= 0.0 {
            return Err(PosterError::invalid_config(
                "font_size",
                style.font_size,
                "must be greater than zero",
            ));
        }
        let layer = self.layer_mut(id)?;
        if !matches!(layer.content, LayerContent::Text(_)) {
            return Err(PosterError::invalid_config(
                "style",
                id,
                "layer is not a text layer",
            ));
        }
        layer.style = Some(style);
        Ok(())
    }

    // --- Canvas interaction -----------------------------------------------

    /// Topmost layer whose bounds contain the fractional point.
    pub fn layer_at(&self, point: Point2D) -> Option<&Layer> {
        self.layers
            .iter()
            .rev()
            .find(|l| l.bounds.contains(point.x, point.y))
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.gestures.set_zoom(zoom);
    }

    pub fn zoom(&self) -> f64 {
        self.gestures.zoom()
    }

    /// Logical canvas size at zoom 1.
    pub fn canvas_size(&self) -> (f64, f64) {
        self.gestures.canvas_size()
    }

    /// Pointer pressed on a layer body (`handle = None`) or one of its handles.
    pub fn pointer_down(
        &mut self,
        id: &str,
        handle: Option<ResizeHandle>,
        pointer: Point2D,
    ) -> PosterResult<()> {
        let index = self.index_or_err(id)?;
        let layer = &self.layers[index];
        match handle {
            Some(handle) => self.gestures.begin_resize(layer, handle, pointer),
            None => self.gestures.begin_move(layer, pointer),
        }
        self.selected = Some(id.to_string());
        Ok(())
    }

    /// Pointer moved. Returns true when a layer changed.
    pub fn pointer_move(&mut self, pointer: Point2D) -> bool {
        let Some((id, bounds)) = self.gestures.update(pointer) else {
            return false;
        };
        let id = id.to_string();
        match self.layers.iter_mut().find(|l| l.id == id) {
            Some(layer) => {
                layer.bounds = bounds;
                true
            }
            None => false,
        }
    }

    /// Pointer released: the gesture ends where the last move left it.
    pub fn pointer_up(&mut self) {
        if let Some(id) = self.gestures.finish() {
            tracing::trace!(layer = %id, "Gesture finished");
        }
    }

    // --- Internals --------------------------------------------------------

    fn next_layer_id(&mut self) -> String {
        let id = format!("layer-{}", self.next_layer_number);
        self.next_layer_number += 1;
        id
    }

    fn push_layer(&mut self, layer: Layer) -> String {
        let id = layer.id.clone();
        tracing::debug!(layer = %id, kind = ?layer.kind(), "Added layer");
        self.layers.push(layer);
        self.selected = Some(id.clone());
        id
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    fn index_or_err(&self, id: &str) -> PosterResult<usize> {
        self.index_of(id)
            .ok_or_else(|| PosterError::invalid_config("layer_id", id, "no such layer"))
    }

    fn layer_mut(&mut self, id: &str) -> PosterResult<&mut Layer> {
        let index = self.index_or_err(id)?;
        Ok(&mut self.layers[index])
    }

    fn refresh_canvas(&mut self) {
        match resolve_layout(&self.config) {
            Ok(layout) => self.apply_canvas(&layout),
            Err(e) => tracing::debug!(error = %e, "Keeping previous canvas size"),
        }
    }

    fn apply_canvas(&mut self, layout: &PosterLayout) {
        let (width, height) = layout.canvas_size(DEFAULT_CANVAS_EXTENT);
        self.gestures.set_canvas_size(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posterkit_poster_model::layer::LayerKind;

    fn session() -> PosterSession {
        // 2x2 A4 portrait with zero margin: 420 x 594 mm.
        PosterSession::new(PosterConfig {
            margin: 0.0,
            ..PosterConfig::default()
        })
    }

    #[test]
    fn test_add_layers_assigns_ids_and_selects() {
        let mut s = session();
        let a = s.add_text_layer("Hello");
        let b = s.add_image_layer(ImageSource::from_bytes(b"x", "image/png"));
        assert_eq!(a, "layer-1");
        assert_eq!(b, "layer-2");
        assert_eq!(s.layers().len(), 2);
        assert_eq!(s.selected().map(|l| l.id.as_str()), Some("layer-2"));
        assert_eq!(s.layers()[1].kind(), LayerKind::Image);
    }

    #[test]
    fn test_ids_continue_after_loaded_layers() {
        let mut doc = PosterDocument::new("x", PosterConfig::default());
        doc.layers.push(Layer::text("layer-7", "a"));
        let mut s = PosterSession::from_document(&doc);
        assert_eq!(s.add_text_layer("b"), "layer-8");
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut s = session();
        let id = s.add_text_layer("gone");
        assert!(s.remove_layer(&id).is_some());
        assert!(s.selected().is_none());
        assert!(s.remove_layer(&id).is_none());
    }

    #[test]
    fn test_reordering() {
        let mut s = session();
        let a = s.add_text_layer("a");
        let b = s.add_text_layer("b");
        let c = s.add_text_layer("c");

        assert!(!s.bring_forward(&c).unwrap());
        assert!(s.bring_forward(&a).unwrap());
        let order: Vec<&str> = s.layers().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(order, [b.as_str(), a.as_str(), c.as_str()]);

        s.send_to_back(&c).unwrap();
        s.bring_to_front(&b).unwrap();
        let order: Vec<&str> = s.layers().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(order, [c.as_str(), a.as_str(), b.as_str()]);

        assert!(!s.send_backward(&c).unwrap());
        assert!(s.bring_forward("nope").is_err());
    }

    #[test]
    fn test_topmost_layer_wins_hit_test() {
        let mut s = session();
        let below = s.add_text_layer("below");
        let above = s.add_text_layer("above");
        s.set_bounds(&below, FracRect::new(0.0, 0.0, 0.5, 0.5)).unwrap();
        s.set_bounds(&above, FracRect::new(0.25, 0.25, 0.5, 0.5)).unwrap();

        assert_eq!(s.layer_at(Point2D::new(0.3, 0.3)).unwrap().id, above);
        assert_eq!(s.layer_at(Point2D::new(0.1, 0.1)).unwrap().id, below);
        assert!(s.layer_at(Point2D::new(0.9, 0.1)).is_none());
    }

    #[test]
    fn test_drag_moves_layer_under_zoom() {
        let mut s = session();
        let id = s.add_text_layer("drag me");
        s.set_bounds(&id, FracRect::new(0.1, 0.1, 0.2, 0.2)).unwrap();
        let (canvas_w, canvas_h) = s.canvas_size();
        s.set_zoom(2.0);

        s.pointer_down(&id, None, Point2D::new(0.0, 0.0)).unwrap();
        // Move by 10% of the canvas in logical pixels, doubled for the zoom.
        assert!(s.pointer_move(Point2D::new(canvas_w * 0.2, canvas_h * 0.2)));
        s.pointer_up();

        let layer = s.layer(&id).unwrap();
        assert!((layer.bounds.x - 0.2).abs() < 1e-9);
        assert!((layer.bounds.y - 0.2).abs() < 1e-9);
        assert!(!s.pointer_move(Point2D::new(1.0, 1.0)));
    }

    #[test]
    fn test_resize_through_session() {
        let mut s = session();
        let id = s.add_text_layer("resize me");
        s.set_bounds(&id, FracRect::new(0.2, 0.2, 0.3, 0.3)).unwrap();
        let (canvas_w, _) = s.canvas_size();

        s.pointer_down(&id, Some(ResizeHandle::NorthWest), Point2D::new(0.0, 0.0))
            .unwrap();
        s.pointer_move(Point2D::new(canvas_w, 0.0));
        s.pointer_up();

        let bounds = s.layer(&id).unwrap().bounds;
        assert_eq!(bounds.width, 0.01);
        assert!((bounds.right() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_canvas_follows_poster_aspect() {
        let s = session();
        let (w, h) = s.canvas_size();
        assert!((h - DEFAULT_CANVAS_EXTENT).abs() < 1e-9);
        assert!((w / h - 420.0 / 594.0).abs() < 1e-9);
    }

    #[test]
    fn test_set_config_rejects_invalid_margin_and_keeps_previous() {
        let mut s = session();
        let bad = PosterConfig {
            margin: 500.0,
            ..PosterConfig::default()
        };
        assert!(matches!(
            s.set_config(bad),
            Err(PosterError::InvalidMargin { .. })
        ));
        assert_eq!(s.config().margin, 0.0);
    }

    #[test]
    fn test_property_edits() {
        let mut s = session();
        let text = s.add_text_layer("a");
        let image = s.add_image_layer(ImageSource::from_bytes(b"x", "image/png"));

        s.set_opacity(&text, 2.0).unwrap();
        assert_eq!(s.layer(&text).unwrap().opacity, 1.0);

        s.set_rotation(&text, 45.0).unwrap();
        assert!(s.set_rotation(&text, f64::NAN).is_err());

        s.set_text(&text, "b\nc").unwrap();
        assert!(s.set_text(&image, "nope").is_err());

        let style = TextStyle {
            font_size: 2.0,
            ..TextStyle::default()
        };
        s.set_style(&text, style.clone()).unwrap();
        assert_eq!(s.layer(&text).unwrap().style, Some(style));
        assert!(s.set_style(&image, TextStyle::default()).is_err());
    }

    #[test]
    fn test_write_back_to_document() {
        let mut s = session();
        s.add_text_layer("saved");
        s.set_unit(Unit::Inch);

        let mut doc = PosterDocument::new("x", PosterConfig::default());
        s.write_to(&mut doc);
        assert_eq!(doc.layers.len(), 1);
        assert_eq!(doc.config.unit, Unit::Inch);
    }
}
