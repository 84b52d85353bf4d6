//! The canonical tile universe derived from one diagram version.

use std::collections::{BTreeMap, HashMap};

use gallery_core::{SizeClass, Tile, TileId};
use sha2::{Digest, Sha256};

/// Ordered set of usable tiles plus a fingerprint of where each id sits.
///
/// The fingerprint covers every id with its size class and its design-unit
/// position rounded to 0.1, so reordering rectangles of one class changes it
/// even though the set of ids stays the same.
#[derive(Debug, Clone)]
pub struct TileLayout {
    tiles: Vec<Tile>,
    index: HashMap<TileId, usize>,
    fingerprint: String,
}

impl TileLayout {
    pub fn new(tiles: Vec<Tile>) -> Self {
        let index = tiles
            .iter()
            .enumerate()
            .map(|(i, tile)| (tile.id.clone(), i))
            .collect();
        let fingerprint = fingerprint(&tiles);
        Self {
            tiles,
            index,
            fingerprint,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Tiles in diagram order.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, id: &TileId) -> Option<&Tile> {
        self.index.get(id).map(|&i| &self.tiles[i])
    }

    pub fn contains(&self, id: &TileId) -> bool {
        self.index.contains_key(id)
    }

    /// Position of a tile in diagram order.
    pub fn position(&self, id: &TileId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = &TileId> {
        self.tiles.iter().map(|t| &t.id)
    }

    pub fn of_size(&self, size: SizeClass) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().filter(move |t| t.size == size)
    }

    /// Number of tiles per size class; every class is present, possibly 0.
    pub fn count_by_size(&self) -> BTreeMap<SizeClass, usize> {
        let mut counts: BTreeMap<SizeClass, usize> =
            SizeClass::ALL.into_iter().map(|size| (size, 0)).collect();
        for tile in &self.tiles {
            *counts.entry(tile.size).or_insert(0) += 1;
        }
        counts
    }

    /// Hex SHA-256 identifying this layout version.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Tenths of a design unit; also folds `-0.0` into `0`.
fn tenths(value: f64) -> i64 {
    (value * 10.0).round() as i64
}

fn fingerprint(tiles: &[Tile]) -> String {
    let mut hasher = Sha256::new();
    for tile in tiles {
        let line = format!(
            "{}:{}:{}:{}\n",
            tile.id,
            tile.size.name(),
            tenths(tile.left),
            tenths(tile.top)
        );
        hasher.update(line.as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(id: &str, left: f64) -> Tile {
        let id = TileId::new(id).unwrap();
        Tile {
            size: id.size_class(),
            id,
            left,
            top: 0.0,
            width: 85.0,
            height: 85.0,
        }
    }

    #[test]
    fn test_lookup_and_counts() {
        let layout = TileLayout::new(vec![tile("X1", 0.0), tile("S1", 85.0), tile("X2", 255.0)]);
        assert_eq!(layout.len(), 3);
        assert_eq!(layout.position(&TileId::new("X2").unwrap()), Some(2));
        assert!(!layout.contains(&TileId::new("X3").unwrap()));
        assert_eq!(layout.of_size(SizeClass::Xs).count(), 2);

        let counts = layout.count_by_size();
        assert_eq!(counts[&SizeClass::Xs], 2);
        assert_eq!(counts[&SizeClass::S], 1);
        assert_eq!(counts[&SizeClass::Xlg], 0);
    }

    #[test]
    fn test_fingerprint_tracks_where_ids_sit() {
        let a = TileLayout::new(vec![tile("X1", 0.0), tile("X2", 85.0)]);
        let jittered = TileLayout::new(vec![tile("X1", 0.01), tile("X2", 85.04)]);
        let moved = TileLayout::new(vec![tile("X1", 10.0), tile("X2", 95.0)]);
        let swapped = TileLayout::new(vec![tile("X1", 85.0), tile("X2", 0.0)]);
        let grown = TileLayout::new(vec![tile("X1", 0.0), tile("X2", 85.0), tile("X3", 170.0)]);

        assert_eq!(a.fingerprint(), jittered.fingerprint());
        assert_ne!(a.fingerprint(), moved.fingerprint());
        assert_ne!(a.fingerprint(), swapped.fingerprint());
        assert_ne!(a.fingerprint(), grown.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_reordered_diagram_changes_fingerprint() {
        let svg = |first: f64, second: f64| {
            format!(
                r#"<svg><rect x="{first}" width="85" height="85"/><rect x="{second}" width="85" height="85"/></svg>"#
            )
        };
        let original = TileLayout::new(crate::classify(&svg(0.0, 500.0)));
        let reordered = TileLayout::new(crate::classify(&svg(500.0, 0.0)));

        let x1 = TileId::new("X1").unwrap();
        assert_eq!(original.get(&x1).unwrap().left, 0.0);
        assert_eq!(reordered.get(&x1).unwrap().left, 500.0);
        assert_ne!(original.fingerprint(), reordered.fingerprint());
    }
}
