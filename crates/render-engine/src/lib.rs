//! PosterKit Render Engine
//!
//! Turns a poster (config + layers) into printable pages.
//!
//! # Pipeline Architecture
//!
//! ```text
//! config ──► resolve_layout ──┐
//!                             ├── Composite (layers in paint order)
//! layers ─────────────────────┘         │
//!                                       ▼
//!                              poster-sized raster
//!                                       │
//!                                       ├── Slice into page tiles
//!                                       │         │
//!                                       │         ├── Cut lines + scissor marks
//!                                       │         └── Page labels
//!                                       ▼
//!                                   PdfSink
//! ```

pub mod compositor;
pub mod export;
pub mod images;
pub mod marks;
pub mod sink;
pub mod text;
pub mod tiler;

pub use export::*;
pub use sink::{PdfSink, RecordingSink, SinkCommand};
