//! Tile layout inference for the gallery wall.
//!
//! The wall diagram is an SVG of irregular rectangles. This crate reads the
//! rectangles, infers the drawing scale from the smallest tiles, buckets each
//! rectangle into a size class and numbers the tiles in document order.

pub mod cache;
pub mod classify;
pub mod diagram;
pub mod layout;

pub use cache::{DiagramSource, LayoutCache};
pub use classify::classify;
pub use layout::TileLayout;
