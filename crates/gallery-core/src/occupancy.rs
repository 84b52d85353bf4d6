//! The tile → asset mapping.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer, Serialize};

use crate::asset::AssetId;
use crate::error::Error;
use crate::tile::TileId;

/// Current (or captured) assignment of assets to tiles.
///
/// Only occupied tiles have an entry. Serializes as a plain JSON object
/// `{"X1": "<asset id>", ...}`; keys and values are validated on the way in,
/// and a mapping that puts one asset on two tiles is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Occupancy(BTreeMap<TileId, AssetId>);

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tile: &TileId) -> Option<&AssetId> {
        self.0.get(tile)
    }

    pub fn is_occupied(&self, tile: &TileId) -> bool {
        self.0.contains_key(tile)
    }

    /// Put `asset` on `tile`, returning the asset previously there.
    pub fn insert(&mut self, tile: TileId, asset: AssetId) -> Option<AssetId> {
        self.0.insert(tile, asset)
    }

    pub fn remove(&mut self, tile: &TileId) -> Option<AssetId> {
        self.0.remove(tile)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Tile currently holding `asset`, if any.
    pub fn tile_of(&self, asset: &AssetId) -> Option<&TileId> {
        self.0
            .iter()
            .find(|(_, placed)| *placed == asset)
            .map(|(tile, _)| tile)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TileId, &AssetId)> {
        self.0.iter()
    }

    pub fn tiles(&self) -> impl Iterator<Item = &TileId> {
        self.0.keys()
    }

    pub fn assets(&self) -> impl Iterator<Item = &AssetId> {
        self.0.values()
    }

    /// Keep only the entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&TileId, &AssetId) -> bool) {
        self.0.retain(|tile, asset| keep(tile, asset));
    }
}

impl TryFrom<BTreeMap<TileId, AssetId>> for Occupancy {
    type Error = Error;

    fn try_from(placements: BTreeMap<TileId, AssetId>) -> Result<Self, Error> {
        let mut seen: HashMap<&AssetId, &TileId> = HashMap::new();
        for (tile, asset) in &placements {
            if let Some(first) = seen.insert(asset, tile) {
                return Err(Error::AssetAlreadyPlaced {
                    asset: asset.to_string(),
                    tile: first.clone(),
                });
            }
        }
        Ok(Self(placements))
    }
}

impl<'de> Deserialize<'de> for Occupancy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let placements = BTreeMap::<TileId, AssetId>::deserialize(deserializer)?;
        Occupancy::try_from(placements).map_err(serde::de::Error::custom)
    }
}

impl FromIterator<(TileId, AssetId)> for Occupancy {
    fn from_iter<I: IntoIterator<Item = (TileId, AssetId)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Occupancy {
    type Item = (TileId, AssetId);
    type IntoIter = std::collections::btree_map::IntoIter<TileId, AssetId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
