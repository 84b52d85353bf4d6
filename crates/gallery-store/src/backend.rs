//! Placement persistence trait.

use gallery_core::{Occupancy, Result};
use serde::{Deserialize, Serialize};

/// Everything a backend holds: the placements and the fingerprint of the
/// layout their tile ids were issued by.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredOccupancy {
    /// Layout fingerprint, absent for stores written before stamping.
    #[serde(default)]
    pub layout: Option<String>,
    #[serde(default)]
    pub placements: Occupancy,
    /// Unix timestamp in milliseconds of the last write.
    #[serde(default)]
    pub updated_at: u64,
}

/// Storage for the tile → asset mapping.
///
/// Backends are responsible for:
/// - Enumerating every stored placement
/// - Replacing the whole mapping in one all-or-nothing step
///
/// An empty or never-written store loads as an empty `StoredOccupancy`;
/// errors are reserved for failures of the backend itself.
pub trait PlacementBackend: Send {
    /// Get the name of this backend.
    fn name(&self) -> &'static str;

    /// Enumerate the stored placements.
    fn load(&self) -> Result<StoredOccupancy>;

    /// Discard the stored mapping and install `placements`.
    ///
    /// Must be atomic: on failure the previous mapping is still what `load`
    /// returns.
    fn replace_all(&mut self, placements: &Occupancy, layout: Option<&str>) -> Result<()>;
}
