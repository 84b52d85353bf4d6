//! Persistence for the gallery wall.
//!
//! Placements go through the [`PlacementBackend`] trait so the occupancy
//! store can run against a JSON file in production and process memory in
//! tests. Asset metadata, uploaded files and settings live next to the
//! placements in the data directory.

pub mod assets;
pub mod backend;
pub mod fs;
pub mod json_file;
pub mod memory;
pub mod occupancy;
pub mod settings;

pub use assets::{AssetCatalog, FileStore, FsFileStore};
pub use backend::{PlacementBackend, StoredOccupancy};
pub use json_file::JsonFileBackend;
pub use memory::MemoryBackend;
pub use occupancy::OccupancyStore;
pub use settings::SettingsStore;
