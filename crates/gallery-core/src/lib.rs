//! Core types and errors for the gallery wall.
//!
//! This crate defines the data structures shared by the layout classifier,
//! the occupancy store and the placement operations. It contains no I/O.

pub mod asset;
pub mod color;
pub mod error;
pub mod occupancy;
pub mod snapshot;
pub mod tile;

pub use asset::{Asset, AssetId, AssetPatch};
pub use color::GridColor;
pub use error::{Error, Result};
pub use occupancy::Occupancy;
pub use snapshot::{unix_millis, Action, Snapshot};
pub use tile::{SizeClass, Tile, TileId};
