//! Placement backend backed by a single JSON document.

use std::path::{Path, PathBuf};

use gallery_core::{unix_millis, Occupancy, Result};

use crate::backend::{PlacementBackend, StoredOccupancy};
use crate::fs::{read_json, write_json_atomic};

/// File name used inside a data directory.
pub const OCCUPANCY_FILE: &str = "occupancy.json";

/// Stores placements as
/// `{"layout": <fingerprint|null>, "placements": {tile: asset}, "updated_at": ms}`.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backend for `occupancy.json` inside `data_dir`.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(OCCUPANCY_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlacementBackend for JsonFileBackend {
    fn name(&self) -> &'static str {
        "json-file"
    }

    fn load(&self) -> Result<StoredOccupancy> {
        let stored: Option<StoredOccupancy> = read_json(&self.path)?;
        Ok(stored.unwrap_or_default())
    }

    fn replace_all(&mut self, placements: &Occupancy, layout: Option<&str>) -> Result<()> {
        let document = StoredOccupancy {
            layout: layout.map(str::to_string),
            placements: placements.clone(),
            updated_at: unix_millis(),
        };
        write_json_atomic(&self.path, &document)
    }
}
