//! Placement operations over the occupancy store.

use std::sync::Arc;

use gallery_core::{Action, AssetId, Error, Occupancy, Result, SizeClass, Snapshot, TileId};
use gallery_layout::{LayoutCache, TileLayout};
use gallery_store::OccupancyStore;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::SeedableRng;

use crate::undo::{HistoryStatus, UndoHistory, UndoKind, DEFAULT_UNDO_DEPTH};

/// Result of dropping placements that point at tiles the layout no longer has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub dropped: Vec<(TileId, AssetId)>,
    pub fingerprint: String,
}

/// The gallery wall: layout, current placements and undo history.
///
/// Every mutation snapshots the full occupancy, writes the new mapping through
/// the store and only then records the snapshot, so a failed write leaves both
/// the placements and the history untouched.
///
/// Mutations are refused with [`Error::LayoutMismatch`] while the stored
/// placements are stamped with a different layout fingerprint than the
/// current diagram produces; [`Wall::reconcile`] clears that state.
///
/// A diagram that yields no tiles is not a layout version: it is never
/// stamped or compared, and operations that need tiles report
/// [`Error::NoTilesAvailable`].
pub struct Wall {
    store: OccupancyStore,
    layout: LayoutCache,
    history: UndoHistory,
    rng: StdRng,
    /// Fingerprint of the last non-empty layout seen by `reload_layout`.
    last_layout: Option<String>,
}

impl Wall {
    pub fn new(store: OccupancyStore, layout: LayoutCache) -> Self {
        Self {
            store,
            layout,
            history: UndoHistory::new(DEFAULT_UNDO_DEPTH),
            rng: StdRng::from_os_rng(),
            last_layout: None,
        }
    }

    /// Keep at most `depth` snapshots per undo stack. Resets the history.
    pub fn with_undo_depth(mut self, depth: usize) -> Self {
        self.history = UndoHistory::new(depth);
        self
    }

    /// Use a deterministic random source.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// The current layout, classifying the diagram on first use.
    pub fn layout(&mut self) -> Arc<TileLayout> {
        self.layout.get()
    }

    pub fn occupancy(&self) -> Result<Occupancy> {
        self.store.get_all()
    }

    pub fn history_status(&self) -> HistoryStatus {
        self.history.status()
    }

    /// Placements ordered by the layout, followed by stale tiles.
    pub fn ordered_placements(&mut self) -> Result<Vec<(TileId, AssetId)>> {
        let layout = self.layout.get();
        let occupancy = self.store.get_all()?;

        let mut ordered: Vec<(TileId, AssetId)> = layout
            .ids()
            .filter_map(|id| occupancy.get(id).map(|asset| (id.clone(), asset.clone())))
            .collect();
        ordered.extend(
            occupancy
                .iter()
                .filter(|(tile, _)| !layout.contains(tile))
                .map(|(tile, asset)| (tile.clone(), asset.clone())),
        );
        Ok(ordered)
    }

    /// A uniformly random unoccupied tile of `size`, or `None` if every tile
    /// of that class is taken.
    pub fn pick_free_tile(&mut self, size: SizeClass) -> Result<Option<TileId>> {
        let layout = self.layout.get();
        let occupancy = self.store.get_all()?;
        let free: Vec<&TileId> = layout
            .of_size(size)
            .map(|tile| &tile.id)
            .filter(|id| !occupancy.is_occupied(id))
            .collect();
        Ok(free.choose(&mut self.rng).map(|id| (*id).clone()))
    }

    /// Occupied tiles that the current layout does not contain. Nothing is
    /// stale while the diagram yields no tiles.
    pub fn stale_tiles(&mut self) -> Result<Vec<TileId>> {
        let layout = self.layout.get();
        if layout.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .store
            .get_all()?
            .tiles()
            .filter(|tile| !layout.contains(tile))
            .cloned()
            .collect())
    }

    /// Whether the stored placements may be mutated under the current layout.
    pub fn is_layout_current(&mut self) -> Result<bool> {
        let layout = self.layout.get();
        if layout.is_empty() {
            return Ok(true);
        }
        Ok(match self.store.layout_fingerprint()? {
            Some(stored) => stored == layout.fingerprint(),
            None => true,
        })
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Put `asset` on `tile`. Assigning an asset to the tile it already
    /// occupies is a no-op.
    pub fn assign(&mut self, tile: TileId, asset: AssetId) -> Result<()> {
        let layout = self.writable_layout()?;
        require_tile(&layout, &tile)?;

        let current = self.store.get_all()?;
        if current.get(&tile) == Some(&asset) {
            return Ok(());
        }
        if let Some(other) = current.tile_of(&asset) {
            return Err(Error::AssetAlreadyPlaced {
                asset: asset.to_string(),
                tile: other.clone(),
            });
        }

        let mut next = current.clone();
        let action = Action::Assign { tile: tile.clone() };
        next.insert(tile, asset);
        self.commit(UndoKind::Edit, action, &current, &next)?;
        Ok(())
    }

    /// Apply several assignments as one change with one undo step.
    ///
    /// Pairs are applied in order; the whole batch is rejected if any tile is
    /// unknown or any asset would end up on two tiles. Returns the number of
    /// pairs applied.
    pub fn assign_many(&mut self, pairs: Vec<(TileId, AssetId)>) -> Result<usize> {
        let layout = self.writable_layout()?;
        let current = self.store.get_all()?;
        let mut next = current.clone();

        for (tile, asset) in &pairs {
            require_tile(&layout, tile)?;
            if let Some(other) = next.tile_of(asset) {
                if other != tile {
                    return Err(Error::AssetAlreadyPlaced {
                        asset: asset.to_string(),
                        tile: other.clone(),
                    });
                }
            }
            next.insert(tile.clone(), asset.clone());
        }

        if next != current {
            let action = Action::AssignMany { count: pairs.len() };
            self.commit(UndoKind::Edit, action, &current, &next)?;
        }
        Ok(pairs.len())
    }

    /// Put `asset` on a random free tile of `size`.
    pub fn place(&mut self, asset: AssetId, size: SizeClass) -> Result<TileId> {
        if self.layout.get().is_empty() {
            return Err(Error::NoTilesAvailable);
        }
        let tile = self
            .pick_free_tile(size)?
            .ok_or(Error::NoFreeTile(size))?;
        self.assign(tile.clone(), asset)?;
        Ok(tile)
    }

    /// Move the asset on `from` to the empty tile `to`. Returns the edit
    /// history depth.
    pub fn move_tile(&mut self, from: TileId, to: TileId) -> Result<usize> {
        let layout = self.writable_layout()?;
        let current = self.store.get_all()?;

        let Some(asset) = current.get(&from).cloned() else {
            return Err(Error::SourceTileEmpty(from));
        };
        if current.is_occupied(&to) {
            return Err(Error::DestinationOccupied(to));
        }
        require_tile(&layout, &to)?;

        let mut next = current.clone();
        next.remove(&from);
        next.insert(to.clone(), asset);
        self.commit(UndoKind::Edit, Action::MoveTile { from, to }, &current, &next)
    }

    /// Empty `tile`. Returns false if it was already empty.
    pub fn clear(&mut self, tile: TileId) -> Result<bool> {
        self.writable_layout()?;
        let current = self.store.get_all()?;
        if !current.is_occupied(&tile) {
            return Ok(false);
        }

        let mut next = current.clone();
        next.remove(&tile);
        self.commit(UndoKind::Edit, Action::ClearTile { tile }, &current, &next)?;
        Ok(true)
    }

    /// Empty every tile. Returns false if the wall was already empty.
    pub fn clear_all(&mut self) -> Result<bool> {
        self.writable_layout()?;
        let current = self.store.get_all()?;
        if current.is_empty() {
            return Ok(false);
        }

        self.commit(UndoKind::Edit, Action::ClearGrid, &current, &Occupancy::new())?;
        Ok(true)
    }

    /// Redistribute the placed assets over random tiles of any size. Returns
    /// the shuffle history depth.
    pub fn shuffle(&mut self) -> Result<usize> {
        let layout = self.writable_layout()?;
        let current = self.store.get_all()?;
        if current.is_empty() {
            return Err(Error::NothingToShuffle);
        }
        if layout.is_empty() {
            return Err(Error::NoTilesAvailable);
        }
        if layout.len() < current.len() {
            return Err(Error::NotEnoughTiles {
                assets: current.len(),
                tiles: layout.len(),
            });
        }

        let mut assets: Vec<AssetId> = current.assets().cloned().collect();
        let mut tiles: Vec<TileId> = layout.ids().cloned().collect();
        assets.shuffle(&mut self.rng);
        tiles.shuffle(&mut self.rng);
        let next: Occupancy = tiles.into_iter().zip(assets).collect();

        self.commit(UndoKind::Shuffle, Action::Shuffle, &current, &next)
    }

    /// Restore the most recent snapshot of `kind`. Returns the action that was
    /// undone, or `None` if there was nothing to undo.
    pub fn undo(&mut self, kind: UndoKind) -> Result<Option<Action>> {
        self.writable_layout()?;
        let Some(snapshot) = self.history.stack_mut(kind).pop() else {
            return Ok(None);
        };

        if let Err(err) = self.store.replace_all(&snapshot.occupancy) {
            self.history.stack_mut(kind).push(snapshot);
            return Err(err);
        }

        tracing::info!(
            kind = ?kind,
            action = %snapshot.action,
            remaining = self.history.stack(kind).depth(),
            "undo applied"
        );
        Ok(Some(snapshot.action))
    }

    // ========================================================================
    // Layout maintenance
    // ========================================================================

    /// Re-read the diagram on next use. History recorded against a different
    /// non-empty layout is discarded.
    pub fn reload_layout(&mut self) -> Arc<TileLayout> {
        let before = self.layout.get();
        if !before.is_empty() {
            self.last_layout = Some(before.fingerprint().to_string());
        }
        self.layout.invalidate();
        let after = self.layout.get();
        if after.is_empty() {
            tracing::warn!("diagram has no tiles, undo history kept");
            return after;
        }

        if let Some(previous) = self.last_layout.as_deref() {
            if previous != after.fingerprint() {
                tracing::info!(
                    previous,
                    current = after.fingerprint(),
                    "layout changed, undo history cleared"
                );
                self.history.clear();
            }
        }
        self.last_layout = Some(after.fingerprint().to_string());
        after
    }

    /// Drop placements on tiles the current layout lacks and stamp the store
    /// with the current fingerprint. Dropping is one edit step and can be
    /// undone.
    pub fn reconcile(&mut self) -> Result<ReconcileReport> {
        let layout = self.layout.get();
        if layout.is_empty() {
            return Err(Error::NoTilesAvailable);
        }
        let stored = self.store.layout_fingerprint()?;
        let current = self.store.get_all()?;

        let dropped: Vec<(TileId, AssetId)> = current
            .iter()
            .filter(|(tile, _)| !layout.contains(tile))
            .map(|(tile, asset)| (tile.clone(), asset.clone()))
            .collect();
        let mut next = current.clone();
        next.retain(|tile, _| layout.contains(tile));

        self.store.stamp_layout(layout.fingerprint());
        if !dropped.is_empty() {
            let action = Action::Reconcile {
                dropped: dropped.len(),
            };
            self.commit(UndoKind::Edit, action, &current, &next)?;
        } else if stored.as_deref() != Some(layout.fingerprint()) {
            self.store.replace_all(&current)?;
        }
        tracing::info!(
            dropped = dropped.len(),
            kept = next.len(),
            fingerprint = layout.fingerprint(),
            "placements reconciled"
        );

        Ok(ReconcileReport {
            dropped,
            fingerprint: layout.fingerprint().to_string(),
        })
    }

    fn writable_layout(&mut self) -> Result<Arc<TileLayout>> {
        let layout = self.layout.get();
        let stored = self.store.layout_fingerprint()?;
        if layout.is_empty() {
            self.store.set_stamp(stored);
            return Ok(layout);
        }
        if let Some(stored) = stored {
            if stored != layout.fingerprint() {
                return Err(Error::LayoutMismatch {
                    stored,
                    current: layout.fingerprint().to_string(),
                });
            }
        }
        self.store.stamp_layout(layout.fingerprint());
        Ok(layout)
    }

    fn commit(
        &mut self,
        kind: UndoKind,
        action: Action,
        current: &Occupancy,
        next: &Occupancy,
    ) -> Result<usize> {
        let snapshot = Snapshot::capture(action, current);
        self.store.replace_all(next)?;
        let depth = self.history.stack_mut(kind).push(snapshot);
        tracing::debug!(kind = ?kind, depth, tiles = next.len(), "placement change committed");
        Ok(depth)
    }
}

fn require_tile(layout: &TileLayout, tile: &TileId) -> Result<()> {
    if layout.is_empty() {
        return Err(Error::NoTilesAvailable);
    }
    if !layout.contains(tile) {
        return Err(Error::UnknownTile(tile.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_core::Tile;
    use gallery_layout::DiagramSource;
    use gallery_store::{MemoryBackend, PlacementBackend};
    use proptest::prelude::*;

    const TWO_TILE_SVG: &str =
        r#"<svg><rect width="85" height="85"/><rect x="85" width="85" height="85"/></svg>"#;

    fn tile(id: &str) -> TileId {
        TileId::new(id).unwrap()
    }

    fn asset(id: &str) -> AssetId {
        AssetId::new(id).unwrap()
    }

    fn layout_of(ids: &[&str]) -> TileLayout {
        TileLayout::new(
            ids.iter()
                .enumerate()
                .map(|(i, id)| {
                    let id = tile(id);
                    Tile {
                        size: id.size_class(),
                        id,
                        left: i as f64 * 85.0,
                        top: 0.0,
                        width: 85.0,
                        height: 85.0,
                    }
                })
                .collect(),
        )
    }

    fn occupancy(pairs: &[(&str, &str)]) -> Occupancy {
        pairs.iter().map(|(t, a)| (tile(t), asset(a))).collect()
    }

    fn wall_with(ids: &[&str], pairs: &[(&str, &str)]) -> (Wall, MemoryBackend) {
        let backend = MemoryBackend::with_placements(occupancy(pairs), None);
        let store = OccupancyStore::new(Box::new(backend.clone()));
        let wall = Wall::new(store, LayoutCache::preloaded(layout_of(ids))).with_seed(7);
        (wall, backend)
    }

    #[test]
    fn test_clear_then_undo_restores() {
        let (mut wall, _) = wall_with(&["X1", "X2", "X3"], &[("X1", "a")]);

        assert!(wall.clear(tile("X1")).unwrap());
        assert!(wall.occupancy().unwrap().is_empty());
        assert_eq!(wall.history_status().history_count, 1);

        let undone = wall.undo(UndoKind::Edit).unwrap();
        assert_eq!(undone, Some(Action::ClearTile { tile: tile("X1") }));
        assert_eq!(wall.occupancy().unwrap(), occupancy(&[("X1", "a")]));
        assert_eq!(wall.history_status().history_count, 0);
    }

    #[test]
    fn test_undo_on_empty_history() {
        let (mut wall, _) = wall_with(&["X1"], &[]);
        assert_eq!(wall.undo(UndoKind::Edit).unwrap(), None);
        assert_eq!(wall.undo(UndoKind::Shuffle).unwrap(), None);
    }

    #[test]
    fn test_noops_do_not_touch_history() {
        let (mut wall, _) = wall_with(&["X1", "X2"], &[("X1", "a")]);
        assert!(!wall.clear(tile("X2")).unwrap());
        wall.assign(tile("X1"), asset("a")).unwrap();
        assert_eq!(wall.history_status().history_count, 0);

        let (mut empty, _) = wall_with(&["X1"], &[]);
        assert!(!empty.clear_all().unwrap());
        assert_eq!(empty.history_status().history_count, 0);
    }

    #[test]
    fn test_assign_rules() {
        let (mut wall, _) = wall_with(&["X1", "X2", "S1"], &[("X1", "a")]);

        let err = wall.assign(tile("X9"), asset("b")).unwrap_err();
        assert!(matches!(err, Error::UnknownTile(_)));

        let err = wall.assign(tile("X2"), asset("a")).unwrap_err();
        assert!(matches!(err, Error::AssetAlreadyPlaced { .. }));

        wall.assign(tile("S1"), asset("b")).unwrap();
        assert_eq!(wall.occupancy().unwrap().get(&tile("S1")), Some(&asset("b")));
        assert_eq!(wall.history_status().history_count, 1);

        wall.undo(UndoKind::Edit).unwrap();
        assert!(!wall.occupancy().unwrap().is_occupied(&tile("S1")));
    }

    #[test]
    fn test_assign_many_is_one_step() {
        let (mut wall, _) = wall_with(&["X1", "X2", "X3"], &[]);
        let applied = wall
            .assign_many(vec![(tile("X1"), asset("a")), (tile("X2"), asset("b"))])
            .unwrap();
        assert_eq!(applied, 2);
        assert_eq!(wall.occupancy().unwrap().len(), 2);
        assert_eq!(wall.history_status().history_count, 1);

        let err = wall
            .assign_many(vec![(tile("X3"), asset("c")), (tile("X9"), asset("d"))])
            .unwrap_err();
        assert!(matches!(err, Error::UnknownTile(_)));
        assert_eq!(wall.occupancy().unwrap().len(), 2);

        let err = wall
            .assign_many(vec![(tile("X3"), asset("a"))])
            .unwrap_err();
        assert!(matches!(err, Error::AssetAlreadyPlaced { .. }));
    }

    #[test]
    fn test_move_failures() {
        let (mut wall, _) = wall_with(&["X1", "X2", "X3"], &[("X1", "a"), ("X2", "b")]);

        let err = wall.move_tile(tile("X3"), tile("X1")).unwrap_err();
        assert!(matches!(err, Error::SourceTileEmpty(_)));

        let err = wall.move_tile(tile("X1"), tile("X2")).unwrap_err();
        assert!(matches!(err, Error::DestinationOccupied(_)));

        let err = wall.move_tile(tile("X1"), tile("M7")).unwrap_err();
        assert!(matches!(err, Error::UnknownTile(_)));

        assert_eq!(wall.history_status().history_count, 0);
        assert_eq!(wall.occupancy().unwrap(), occupancy(&[("X1", "a"), ("X2", "b")]));
    }

    #[test]
    fn test_move_then_undo() {
        let (mut wall, _) = wall_with(&["X1", "X2", "X3"], &[("X1", "a")]);
        assert_eq!(wall.move_tile(tile("X1"), tile("X3")).unwrap(), 1);
        assert_eq!(wall.occupancy().unwrap(), occupancy(&[("X3", "a")]));

        wall.undo(UndoKind::Edit).unwrap();
        assert_eq!(wall.occupancy().unwrap(), occupancy(&[("X1", "a")]));
    }

    #[test]
    fn test_clear_all_then_undo() {
        let pairs = [("X1", "a"), ("X2", "b"), ("X3", "c")];
        let (mut wall, _) = wall_with(&["X1", "X2", "X3"], &pairs);
        assert!(wall.clear_all().unwrap());
        assert!(wall.occupancy().unwrap().is_empty());
        wall.undo(UndoKind::Edit).unwrap();
        assert_eq!(wall.occupancy().unwrap(), occupancy(&pairs));
    }

    #[test]
    fn test_shuffle_preserves_assets() {
        let pairs = [("X1", "a"), ("X2", "b"), ("S1", "c")];
        let ids = ["X1", "X2", "X3", "S1", "S2", "M1"];
        let (mut wall, _) = wall_with(&ids, &pairs);

        assert_eq!(wall.shuffle().unwrap(), 1);
        let after = wall.occupancy().unwrap();
        assert_eq!(after.len(), 3);

        let mut assets: Vec<_> = after.assets().map(|a| a.as_str().to_string()).collect();
        assets.sort();
        assert_eq!(assets, vec!["a", "b", "c"]);
        assert!(after.tiles().all(|t| ids.contains(&t.as_str())));

        assert_eq!(wall.history_status().shuffle_count, 1);
        assert_eq!(wall.history_status().history_count, 0);
        assert_eq!(wall.undo(UndoKind::Shuffle).unwrap(), Some(Action::Shuffle));
        assert_eq!(wall.occupancy().unwrap(), occupancy(&pairs));
    }

    #[test]
    fn test_shuffle_preconditions() {
        let (mut wall, _) = wall_with(&["X1"], &[]);
        assert!(matches!(wall.shuffle().unwrap_err(), Error::NothingToShuffle));

        let (mut wall, _) = wall_with(&[], &[("X1", "a")]);
        assert!(matches!(wall.shuffle().unwrap_err(), Error::NoTilesAvailable));

        let (mut wall, _) = wall_with(&["X1"], &[("X1", "a"), ("X2", "b")]);
        assert!(matches!(
            wall.shuffle().unwrap_err(),
            Error::NotEnoughTiles { assets: 2, tiles: 1 }
        ));
        assert_eq!(wall.history_status().shuffle_count, 0);
    }

    #[test]
    fn test_pick_free_tile() {
        let (mut wall, _) = wall_with(&["X1", "X2", "S1"], &[("X1", "a")]);
        assert_eq!(wall.pick_free_tile(SizeClass::Xs).unwrap(), Some(tile("X2")));
        assert_eq!(wall.pick_free_tile(SizeClass::S).unwrap(), Some(tile("S1")));
        assert_eq!(wall.pick_free_tile(SizeClass::Xlg).unwrap(), None);

        assert_eq!(wall.place(asset("b"), SizeClass::Xs).unwrap(), tile("X2"));
        assert!(matches!(
            wall.place(asset("c"), SizeClass::Xs).unwrap_err(),
            Error::NoFreeTile(SizeClass::Xs)
        ));
    }

    #[test]
    fn test_failed_commit_leaves_state_and_history() {
        let (mut wall, backend) = wall_with(&["X1", "X2"], &[("X1", "a")]);
        backend.fail_writes(true);

        assert!(wall.clear(tile("X1")).is_err());
        assert!(wall.move_tile(tile("X1"), tile("X2")).is_err());
        assert!(wall.shuffle().is_err());
        assert_eq!(wall.occupancy().unwrap(), occupancy(&[("X1", "a")]));
        assert_eq!(wall.history_status().history_count, 0);
        assert_eq!(wall.history_status().shuffle_count, 0);
    }

    #[test]
    fn test_failed_undo_keeps_snapshot() {
        let (mut wall, backend) = wall_with(&["X1"], &[("X1", "a")]);
        wall.clear(tile("X1")).unwrap();

        backend.fail_writes(true);
        assert!(wall.undo(UndoKind::Edit).is_err());
        assert_eq!(wall.history_status().history_count, 1);

        backend.fail_writes(false);
        assert!(wall.undo(UndoKind::Edit).unwrap().is_some());
        assert_eq!(wall.occupancy().unwrap(), occupancy(&[("X1", "a")]));
    }

    #[test]
    fn test_depth_is_bounded() {
        let (wall, _) = wall_with(&["X1"], &[]);
        let mut wall = wall.with_undo_depth(3);
        for _ in 0..5 {
            wall.assign(tile("X1"), asset("a")).unwrap();
            wall.clear(tile("X1")).unwrap();
        }
        assert_eq!(wall.history_status().history_count, 3);
    }

    #[test]
    fn test_layout_mismatch_blocks_mutations_until_reconciled() {
        let backend = MemoryBackend::with_placements(
            occupancy(&[("X1", "a"), ("X4", "b")]),
            Some("old-layout"),
        );
        let store = OccupancyStore::new(Box::new(backend.clone()));
        let mut wall = Wall::new(store, LayoutCache::preloaded(layout_of(&["X1", "X2"])));

        assert!(!wall.is_layout_current().unwrap());
        assert!(matches!(
            wall.clear(tile("X1")).unwrap_err(),
            Error::LayoutMismatch { .. }
        ));
        assert_eq!(wall.occupancy().unwrap().len(), 2);
        assert_eq!(wall.stale_tiles().unwrap(), vec![tile("X4")]);

        let report = wall.reconcile().unwrap();
        assert_eq!(report.dropped, vec![(tile("X4"), asset("b"))]);
        assert_eq!(backend.load().unwrap().layout.as_deref(), Some(report.fingerprint.as_str()));

        assert!(wall.is_layout_current().unwrap());
        assert!(wall.clear(tile("X1")).unwrap());
    }

    #[test]
    fn test_unstamped_store_adopts_layout() {
        let (mut wall, backend) = wall_with(&["X1", "X2"], &[("X1", "a")]);
        let fingerprint = wall.layout().fingerprint().to_string();
        wall.move_tile(tile("X1"), tile("X2")).unwrap();
        assert_eq!(backend.load().unwrap().layout, Some(fingerprint));
    }

    #[test]
    fn test_ordered_placements_put_stale_last() {
        let (mut wall, _) = wall_with(&["X1", "X2", "X3"], &[("X9", "z"), ("X3", "c"), ("X1", "a")]);
        let ordered: Vec<_> = wall
            .ordered_placements()
            .unwrap()
            .into_iter()
            .map(|(t, _)| t.as_str().to_string())
            .collect();
        assert_eq!(ordered, vec!["X1", "X3", "X9"]);
    }

    #[test]
    fn test_reload_layout_clears_history_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.svg");
        std::fs::write(&path, r#"<svg><rect width="85" height="85"/></svg>"#).unwrap();

        let store = OccupancyStore::new(Box::new(MemoryBackend::new()));
        let mut wall = Wall::new(store, LayoutCache::new(DiagramSource::File(path.clone())));
        wall.assign(tile("X1"), asset("a")).unwrap();
        assert_eq!(wall.history_status().history_count, 1);

        wall.reload_layout();
        assert_eq!(wall.history_status().history_count, 1);

        std::fs::write(&path, TWO_TILE_SVG).unwrap();
        assert_eq!(wall.reload_layout().len(), 2);
        assert_eq!(wall.history_status().history_count, 0);
    }

    #[test]
    fn test_shuffle_usually_moves_something() {
        let pairs = [("X1", "a"), ("X2", "b")];
        let ids = ["X1", "X2", "X3", "S1", "S2", "M1"];
        let before = occupancy(&pairs);

        let changed = (0..20u64)
            .filter(|&seed| {
                let (wall, _) = wall_with(&ids, &pairs);
                let mut wall = wall.with_seed(seed);
                wall.shuffle().unwrap();
                wall.occupancy().unwrap() != before
            })
            .count();
        assert!(changed >= 15, "only {changed} of 20 shuffles changed the wall");
    }

    #[test]
    fn test_reconcile_is_undoable() {
        let backend = MemoryBackend::with_placements(
            occupancy(&[("X1", "a"), ("X4", "b")]),
            Some("old-layout"),
        );
        let store = OccupancyStore::new(Box::new(backend.clone()));
        let mut wall = Wall::new(store, LayoutCache::preloaded(layout_of(&["X1", "X2"])));

        let report = wall.reconcile().unwrap();
        assert_eq!(report.dropped.len(), 1);
        assert_eq!(wall.history_status().history_count, 1);

        assert_eq!(
            wall.undo(UndoKind::Edit).unwrap(),
            Some(Action::Reconcile { dropped: 1 })
        );
        assert_eq!(wall.occupancy().unwrap(), occupancy(&[("X1", "a"), ("X4", "b")]));
        assert_eq!(backend.load().unwrap().layout, Some(report.fingerprint));
    }

    #[test]
    fn test_reconcile_refuses_empty_layout() {
        let backend = MemoryBackend::with_placements(occupancy(&[("X1", "a"), ("X2", "b")]), None);
        let store = OccupancyStore::new(Box::new(backend.clone()));
        let mut wall = Wall::new(store, LayoutCache::preloaded(TileLayout::empty()));

        assert!(matches!(wall.reconcile().unwrap_err(), Error::NoTilesAvailable));
        assert_eq!(wall.occupancy().unwrap().len(), 2);
        assert_eq!(backend.load().unwrap().layout, None);
        assert_eq!(wall.history_status().history_count, 0);
    }

    #[test]
    fn test_reconcile_without_stale_tiles_only_stamps() {
        let backend = MemoryBackend::with_placements(occupancy(&[("X1", "a")]), None);
        let store = OccupancyStore::new(Box::new(backend.clone()));
        let mut wall = Wall::new(store, LayoutCache::preloaded(layout_of(&["X1"])));

        let report = wall.reconcile().unwrap();
        assert!(report.dropped.is_empty());
        assert_eq!(wall.history_status().history_count, 0);
        assert_eq!(backend.load().unwrap().layout, Some(report.fingerprint));
    }

    #[test]
    fn test_missing_diagram_never_stamps_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.svg");
        let backend = MemoryBackend::with_placements(occupancy(&[("X1", "a"), ("X2", "b")]), None);
        let store = OccupancyStore::new(Box::new(backend.clone()));
        let mut wall = Wall::new(store, LayoutCache::new(DiagramSource::File(path.clone())));

        assert!(wall.clear(tile("X1")).unwrap());
        assert_eq!(backend.load().unwrap().layout, None);
        assert!(matches!(
            wall.assign(tile("X1"), asset("a")).unwrap_err(),
            Error::NoTilesAvailable
        ));
        assert!(matches!(
            wall.place(asset("c"), SizeClass::Xs).unwrap_err(),
            Error::NoTilesAvailable
        ));
        assert!(matches!(wall.shuffle().unwrap_err(), Error::NoTilesAvailable));

        std::fs::write(&path, TWO_TILE_SVG).unwrap();
        assert_eq!(wall.reload_layout().len(), 2);
        assert!(wall.clear(tile("X2")).unwrap());
        assert!(wall.undo(UndoKind::Edit).unwrap().is_some());
        assert!(wall.undo(UndoKind::Edit).unwrap().is_some());
        assert_eq!(wall.occupancy().unwrap(), occupancy(&[("X1", "a"), ("X2", "b")]));
    }

    #[test]
    fn test_empty_layout_keeps_stored_stamp() {
        let backend = MemoryBackend::with_placements(
            occupancy(&[("X1", "a"), ("X2", "b")]),
            Some("v1"),
        );
        let store = OccupancyStore::new(Box::new(backend.clone()));
        let mut wall = Wall::new(store, LayoutCache::preloaded(TileLayout::empty()));

        assert!(matches!(wall.shuffle().unwrap_err(), Error::NoTilesAvailable));
        assert!(wall.clear(tile("X1")).unwrap());
        assert_eq!(backend.load().unwrap().layout.as_deref(), Some("v1"));
        assert!(wall.undo(UndoKind::Edit).unwrap().is_some());
        assert_eq!(wall.occupancy().unwrap().len(), 2);
    }

    #[derive(Debug, Clone)]
    enum Edit {
        Assign(usize, usize),
        Move(usize, usize),
        Clear(usize),
        ClearAll,
    }

    fn edit_strategy() -> impl Strategy<Value = Edit> {
        prop_oneof![
            (0usize..4, 0usize..4).prop_map(|(t, a)| Edit::Assign(t, a)),
            (0usize..4, 0usize..4).prop_map(|(f, t)| Edit::Move(f, t)),
            (0usize..4).prop_map(Edit::Clear),
            Just(Edit::ClearAll),
        ]
    }

    proptest! {
        #[test]
        fn prop_undoing_every_edit_restores_start(edits in prop::collection::vec(edit_strategy(), 0..16)) {
            const TILES: [&str; 4] = ["X1", "X2", "X3", "S1"];
            const ASSETS: [&str; 4] = ["a", "b", "c", "d"];
            let (wall, _) = wall_with(&TILES, &[("X1", "a"), ("S1", "b")]);
            let mut wall = wall.with_undo_depth(32);
            let start = wall.occupancy().unwrap();

            for edit in edits {
                // Rejected edits leave state and history alone.
                let _ = match edit {
                    Edit::Assign(t, a) => wall.assign(tile(TILES[t]), asset(ASSETS[a])).map(|_| ()),
                    Edit::Move(f, t) => wall.move_tile(tile(TILES[f]), tile(TILES[t])).map(|_| ()),
                    Edit::Clear(t) => wall.clear(tile(TILES[t])).map(|_| ()),
                    Edit::ClearAll => wall.clear_all().map(|_| ()),
                };
            }

            let steps = wall.history_status().history_count;
            for _ in 0..steps {
                prop_assert!(wall.undo(UndoKind::Edit).unwrap().is_some());
            }
            prop_assert_eq!(wall.undo(UndoKind::Edit).unwrap(), None);
            prop_assert_eq!(wall.occupancy().unwrap(), start);
        }
    }
}
