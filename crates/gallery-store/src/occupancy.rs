//! The occupancy store: the single owner of the current tile → asset mapping.

use gallery_core::{AssetId, Occupancy, Result, TileId};

use crate::backend::PlacementBackend;

/// Reads and replaces the current mapping through a backend.
///
/// Every write is stamped with the layout fingerprint set through
/// [`OccupancyStore::stamp_layout`], so a later process can tell which
/// diagram version the tile ids belong to.
pub struct OccupancyStore {
    backend: Box<dyn PlacementBackend>,
    stamp: Option<String>,
}

impl OccupancyStore {
    pub fn new(backend: Box<dyn PlacementBackend>) -> Self {
        Self {
            backend,
            stamp: None,
        }
    }

    /// Every placement currently stored.
    pub fn get_all(&self) -> Result<Occupancy> {
        let stored = self.backend.load()?;
        tracing::debug!(
            backend = self.backend.name(),
            tiles = stored.placements.len(),
            "occupancy loaded"
        );
        Ok(stored.placements)
    }

    /// The asset on `tile`, if any.
    pub fn get(&self, tile: &TileId) -> Result<Option<AssetId>> {
        Ok(self.get_all()?.get(tile).cloned())
    }

    /// Atomically discard the stored mapping and install `placements`.
    pub fn replace_all(&mut self, placements: &Occupancy) -> Result<()> {
        self.backend.replace_all(placements, self.stamp.as_deref())?;
        tracing::debug!(
            backend = self.backend.name(),
            tiles = placements.len(),
            "occupancy saved"
        );
        Ok(())
    }

    /// Put `asset` on `tile`, overwriting whatever was there.
    pub fn assign(&mut self, tile: TileId, asset: AssetId) -> Result<()> {
        let mut placements = self.get_all()?;
        placements.insert(tile, asset);
        self.replace_all(&placements)
    }

    /// Fingerprint of the layout the stored placements were written against.
    pub fn layout_fingerprint(&self) -> Result<Option<String>> {
        Ok(self.backend.load()?.layout)
    }

    /// Set the fingerprint recorded by subsequent writes.
    pub fn stamp_layout(&mut self, fingerprint: impl Into<String>) {
        self.stamp = Some(fingerprint.into());
    }

    /// Replace the recorded fingerprint, `None` leaving writes unstamped.
    pub fn set_stamp(&mut self, stamp: Option<String>) {
        self.stamp = stamp;
    }
}
