//! PosterKit Poster Model
//!
//! Defines the core data contracts for PosterKit posters:
//! - **Units & paper:** Physical units, conversion, and the static paper catalog
//! - **Config:** How the poster is sized (grid of pages or explicit size)
//! - **Layers:** Image and text elements placed on the poster
//! - **Document:** The on-disk poster file tying config and layers together
//!
//! Layer geometry is stored as fractions of the poster bounds so that the
//! same layer list renders identically at any zoom or export resolution.

pub mod config;
pub mod document;
pub mod geometry;
pub mod layer;
pub mod palette;
pub mod paper;
pub mod units;

pub use config::*;
pub use document::*;
pub use geometry::*;
pub use layer::*;
pub use paper::*;
pub use units::*;
