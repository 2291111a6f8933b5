//! Fractional poster geometry.
//!
//! Layer bounds are fractions of the poster width and height: `(0.0, 0.0)`
//! is the top-left corner of the poster, `(1.0, 1.0)` the bottom-right.
//! Values outside `[0.0, 1.0]` are legal and mean the layer hangs off the
//! poster edge.

use serde::{Deserialize, Serialize};

/// Smallest layer extent per axis, as a fraction of the poster dimension.
pub const MIN_LAYER_FRACTION: f64 = 0.01;

/// A rectangle in fractional poster coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FracRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl FracRect {
    /// The whole poster.
    pub const FULL: FracRect = FracRect {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// The center point of this rectangle.
    pub fn center(&self) -> Point2D {
        Point2D::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if a fractional point lies within this rectangle (edges included).
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    /// Map onto a surface of the given logical size.
    pub fn to_surface(&self, surface_width: f64, surface_height: f64) -> SurfaceRect {
        SurfaceRect {
            x: self.x * surface_width,
            y: self.y * surface_height,
            width: self.width * surface_width,
            height: self.height * surface_height,
        }
    }
}

impl Default for FracRect {
    fn default() -> Self {
        Self::FULL
    }
}

/// A rectangle in surface units (screen pixels, raster pixels, ...).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SurfaceRect {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    pub fn delta_from(&self, other: &Point2D) -> (f64, f64) {
        (self.x - other.x, self.y - other.y)
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}
