//! Undo snapshots.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::occupancy::Occupancy;
use crate::tile::TileId;

/// The mutation a snapshot was taken in front of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Assign { tile: TileId },
    AssignMany { count: usize },
    ClearTile { tile: TileId },
    ClearGrid,
    MoveTile { from: TileId, to: TileId },
    Shuffle,
    Reconcile { dropped: usize },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Assign { tile } => write!(f, "assign:{}", tile),
            Action::AssignMany { count } => write!(f, "assign_many:{}", count),
            Action::ClearTile { tile } => write!(f, "clear_tile:{}", tile),
            Action::ClearGrid => f.write_str("clear_grid"),
            Action::MoveTile { from, to } => write!(f, "move_tile:{}->{}", from, to),
            Action::Shuffle => f.write_str("shuffle"),
            Action::Reconcile { dropped } => write!(f, "reconcile:{}", dropped),
        }
    }
}

/// Full copy of the occupancy captured before a mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub action: Action,
    /// Unix timestamp in milliseconds.
    pub taken_at: u64,
    pub occupancy: Occupancy,
}

impl Snapshot {
    pub fn capture(action: Action, occupancy: &Occupancy) -> Self {
        Self {
            action,
            taken_at: unix_millis(),
            occupancy: occupancy.clone(),
        }
    }
}

/// Milliseconds since the Unix epoch, or 0 if the clock is before it.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetId;

    #[test]
    fn test_action_descriptors() {
        let x1 = TileId::new("X1").unwrap();
        let x2 = TileId::new("X2").unwrap();
        assert_eq!(Action::ClearTile { tile: x1.clone() }.to_string(), "clear_tile:X1");
        assert_eq!(Action::ClearGrid.to_string(), "clear_grid");
        assert_eq!(
            Action::MoveTile { from: x1, to: x2 }.to_string(),
            "move_tile:X1->X2"
        );
        assert_eq!(Action::Reconcile { dropped: 3 }.to_string(), "reconcile:3");
    }

    #[test]
    fn test_capture_is_independent_copy() {
        let mut live = Occupancy::new();
        live.insert(TileId::new("X1").unwrap(), AssetId::new("a").unwrap());
        let snapshot = Snapshot::capture(Action::ClearGrid, &live);
        live.clear();
        assert_eq!(snapshot.occupancy.len(), 1);
    }
}
