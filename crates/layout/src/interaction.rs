//! Layer move/resize interaction.
//!
//! A gesture snapshots the layer bounds and the pointer position when it
//! starts. Every pointer-move recomputes the layer bounds from that snapshot
//! plus the total pointer delta, so dropped or repeated move events never
//! accumulate error.
//!
//! Resize handles work in the layer's unrotated frame: rotation is ignored
//! by the resize math.

use posterkit_poster_model::geometry::{FracRect, Point2D, MIN_LAYER_FRACTION};
use posterkit_poster_model::layer::Layer;
use serde::{Deserialize, Serialize};

/// Corner handle used to resize a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizeHandle {
    #[serde(rename = "nw")]
    NorthWest,
    #[serde(rename = "ne")]
    NorthEast,
    #[serde(rename = "sw")]
    SouthWest,
    #[serde(rename = "se")]
    SouthEast,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 4] = [
        ResizeHandle::NorthWest,
        ResizeHandle::NorthEast,
        ResizeHandle::SouthWest,
        ResizeHandle::SouthEast,
    ];

    /// Whether the handle drags the left edge (otherwise the right edge).
    pub fn moves_left_edge(self) -> bool {
        matches!(self, ResizeHandle::NorthWest | ResizeHandle::SouthWest)
    }

    /// Whether the handle drags the top edge (otherwise the bottom edge).
    pub fn moves_top_edge(self) -> bool {
        matches!(self, ResizeHandle::NorthWest | ResizeHandle::NorthEast)
    }

    /// The corner that stays put while this handle is dragged.
    pub fn fixed_corner(self, bounds: &FracRect) -> Point2D {
        let x = if self.moves_left_edge() {
            bounds.right()
        } else {
            bounds.x
        };
        let y = if self.moves_top_edge() {
            bounds.bottom()
        } else {
            bounds.y
        };
        Point2D::new(x, y)
    }
}

/// Current interaction state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Moving {
        layer_id: String,
        start_bounds: FracRect,
        start_pointer: Point2D,
    },
    Resizing {
        layer_id: String,
        handle: ResizeHandle,
        start_bounds: FracRect,
        start_pointer: Point2D,
    },
}

impl Gesture {
    /// Id of the layer being manipulated.
    pub fn layer_id(&self) -> Option<&str> {
        match self {
            Gesture::Idle => None,
            Gesture::Moving { layer_id, .. } | Gesture::Resizing { layer_id, .. } => {
                Some(layer_id.as_str())
            }
        }
    }
}

/// Translate bounds by a fractional delta.
pub fn moved_bounds(start: &FracRect, dx: f64, dy: f64) -> FracRect {
    FracRect {
        x: start.x + dx,
        y: start.y + dy,
        ..*start
    }
}

/// Resize bounds by dragging `handle` by a fractional delta.
///
/// Each axis is floored at [`MIN_LAYER_FRACTION`]; when the floor kicks in
/// the position is recomputed from the fixed edge so the opposite corner
/// does not move.
pub fn resized_bounds(start: &FracRect, handle: ResizeHandle, dx: f64, dy: f64) -> FracRect {
    let (x, width) = resize_axis(start.x, start.width, dx, handle.moves_left_edge());
    let (y, height) = resize_axis(start.y, start.height, dy, handle.moves_top_edge());
    FracRect {
        x,
        y,
        width,
        height,
    }
}

fn resize_axis(origin: f64, extent: f64, delta: f64, moves_leading_edge: bool) -> (f64, f64) {
    if moves_leading_edge {
        let fixed_edge = origin + extent;
        let new_extent = extent - delta;
        if new_extent < MIN_LAYER_FRACTION {
            (fixed_edge - MIN_LAYER_FRACTION, MIN_LAYER_FRACTION)
        } else {
            (origin + delta, new_extent)
        }
    } else {
        (origin, (extent + delta).max(MIN_LAYER_FRACTION))
    }
}

/// Drives move/resize gestures for a canvas showing the poster.
#[derive(Debug, Clone)]
pub struct GestureController {
    gesture: Gesture,
    /// Poster canvas size in logical pixels at zoom 1.
    canvas_width: f64,
    canvas_height: f64,
    zoom: f64,
}

impl GestureController {
    /// Create a controller for a canvas of the given logical size.
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            gesture: Gesture::Idle,
            canvas_width: canvas_width.max(1.0),
            canvas_height: canvas_height.max(1.0),
            zoom: 1.0,
        }
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_active(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the display zoom factor; non-positive values are ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() && zoom > 0.0 {
            self.zoom = zoom;
        }
    }

    pub fn canvas_size(&self) -> (f64, f64) {
        (self.canvas_width, self.canvas_height)
    }

    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.canvas_width = width.max(1.0);
        self.canvas_height = height.max(1.0);
    }

    /// Start moving a layer. `pointer` is in screen pixels.
    pub fn begin_move(&mut self, layer: &Layer, pointer: Point2D) {
        tracing::trace!(layer = %layer.id, "Begin move");
        self.gesture = Gesture::Moving {
            layer_id: layer.id.clone(),
            start_bounds: layer.bounds,
            start_pointer: pointer,
        };
    }

    /// Start resizing a layer from one of its corner handles.
    pub fn begin_resize(&mut self, layer: &Layer, handle: ResizeHandle, pointer: Point2D) {
        tracing::trace!(layer = %layer.id, ?handle, "Begin resize");
        self.gesture = Gesture::Resizing {
            layer_id: layer.id.clone(),
            handle,
            start_bounds: layer.bounds,
            start_pointer: pointer,
        };
    }

    /// Bounds the active layer should have for the pointer at `pointer`.
    ///
    /// Returns `None` when no gesture is active.
    pub fn update(&self, pointer: Point2D) -> Option<(&str, FracRect)> {
        match &self.gesture {
            Gesture::Idle => None,
            Gesture::Moving {
                layer_id,
                start_bounds,
                start_pointer,
            } => {
                let (dx, dy) = self.fractional_delta(start_pointer, &pointer);
                Some((layer_id.as_str(), moved_bounds(start_bounds, dx, dy)))
            }
            Gesture::Resizing {
                layer_id,
                handle,
                start_bounds,
                start_pointer,
            } => {
                let (dx, dy) = self.fractional_delta(start_pointer, &pointer);
                Some((layer_id.as_str(), resized_bounds(start_bounds, *handle, dx, dy)))
            }
        }
    }

    /// End the active gesture, returning the layer id it was acting on.
    pub fn finish(&mut self) -> Option<String> {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => None,
            Gesture::Moving { layer_id, .. } | Gesture::Resizing { layer_id, .. } => {
                Some(layer_id)
            }
        }
    }

    /// Screen-pixel delta converted to poster fractions.
    fn fractional_delta(&self, start: &Point2D, current: &Point2D) -> (f64, f64) {
        let (dx, dy) = current.delta_from(start);
        (
            dx / self.zoom / self.canvas_width,
            dy / self.zoom / self.canvas_height,
        )
    }
}
