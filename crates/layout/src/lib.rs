//! PosterKit Layout
//!
//! Geometry for posters and their layers:
//! - **Resolver:** Poster size, page grid and printable area from a config
//! - **Interaction:** Gesture state machine for moving and resizing layers
//! - **Session:** The editing session owning the config and layer list
//!
//! This crate is pure computation: no I/O, no rendering.
//! All inputs are data; all outputs are data.

pub mod interaction;
pub mod resolver;
pub mod session;

pub use interaction::{Gesture, GestureController, ResizeHandle};
pub use resolver::{resolve_layout, PosterLayout};
pub use session::PosterSession;
