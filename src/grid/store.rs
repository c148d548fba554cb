//! Sparse tile storage with a capacity bound.
//!
//! Tiles materialize on first write and stay resident until the store
//! exceeds its capacity, at which point the least-recently-written tiles
//! are dropped. Reads never allocate; a query into absent space sees
//! unknown, not a fresh tile.

use std::collections::HashMap;

use crate::core::TileCoord;
use crate::grid::tile::Tile;

/// Resident tile map with LRU eviction
#[derive(Clone, Debug)]
pub struct TileStore {
    tiles: HashMap<TileCoord, Tile>,
    tile_side: u16,
    capacity: usize,
    evictions: u64,
}

impl TileStore {
    /// Empty store for tiles of the given side, bounded to `capacity`
    /// resident tiles.
    pub fn new(tile_side: u16, capacity: usize) -> Self {
        Self {
            tiles: HashMap::new(),
            tile_side,
            capacity,
            evictions: 0,
        }
    }

    /// Resident tile count.
    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// True when no tiles are resident.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Maximum resident tiles before eviction.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Cells per tile edge for every tile in this store.
    #[inline]
    pub fn tile_side(&self) -> u16 {
        self.tile_side
    }

    /// Total tiles evicted over the store's lifetime.
    #[inline]
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    /// Look up a resident tile without materializing it.
    #[inline]
    pub fn try_get(&self, coord: TileCoord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    /// Fetch a tile for writing, materializing it if absent.
    ///
    /// Either way the tile's recency is bumped to `touch`. May push the
    /// store over capacity; the caller runs [`evict_over_capacity`] after
    /// the write completes.
    ///
    /// [`evict_over_capacity`]: TileStore::evict_over_capacity
    pub fn get_or_create(&mut self, coord: TileCoord, touch: u64) -> &mut Tile {
        let tile = self
            .tiles
            .entry(coord)
            .or_insert_with(|| Tile::new(self.tile_side, touch));
        tile.touch(touch);
        tile
    }

    /// Drop least-recently-written tiles until the store fits its
    /// capacity again. Returns how many were dropped.
    ///
    /// Recency ties break toward the lowest coordinate, so eviction order
    /// does not depend on hash iteration order.
    pub fn evict_over_capacity(&mut self) -> usize {
        let mut dropped = 0;
        while self.tiles.len() > self.capacity {
            let Some(victim) = self.lru_coord() else {
                break;
            };
            self.tiles.remove(&victim);
            self.evictions += 1;
            dropped += 1;
            log::debug!(
                "evicted tile ({}, {}), {} resident",
                victim.tx,
                victim.ty,
                self.tiles.len()
            );
        }
        dropped
    }

    fn lru_coord(&self) -> Option<TileCoord> {
        let mut oldest: Option<(u64, TileCoord)> = None;
        for (&coord, tile) in &self.tiles {
            let key = (tile.last_touch(), coord);
            if oldest.is_none_or(|best| key < best) {
                oldest = Some(key);
            }
        }
        oldest.map(|(_, coord)| coord)
    }

    /// Drop every resident tile. Eviction and recency counters persist.
    pub fn clear(&mut self) {
        self.tiles.clear();
    }

    /// Iterate resident tiles in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, &Tile)> {
        self.tiles.iter().map(|(&coord, tile)| (coord, tile))
    }

    /// Resident tile coordinates in ascending order.
    pub fn sorted_coords(&self) -> Vec<TileCoord> {
        let mut coords: Vec<TileCoord> = self.tiles.keys().copied().collect();
        coords.sort_unstable();
        coords
    }

    /// Highest write stamp over all resident tiles.
    pub fn newest_touch(&self) -> u64 {
        self.tiles
            .values()
            .map(Tile::last_touch)
            .max()
            .unwrap_or(0)
    }

    /// Insert a tile rebuilt from a snapshot, keeping its recorded
    /// recency. Does not trigger eviction.
    pub(crate) fn insert_restored(&mut self, coord: TileCoord, tile: Tile) {
        self.tiles.insert(coord, tile);
    }

    pub(crate) fn set_evictions(&mut self, evictions: u64) {
        self.evictions = evictions;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(tx: i32, ty: i32) -> TileCoord {
        TileCoord::new(tx, ty)
    }

    #[test]
    fn test_get_or_create_materializes_once() {
        let mut store = TileStore::new(8, 4);
        assert!(store.is_empty());

        store.get_or_create(coord(0, 0), 1).apply(0, 0, 45, 1).unwrap();
        assert_eq!(store.len(), 1);

        // Same coordinate reuses the tile
        store.get_or_create(coord(0, 0), 2).apply(1, 0, 45, 2).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.try_get(coord(0, 0)).unwrap().known_cells(), 2);
    }

    #[test]
    fn test_try_get_never_allocates() {
        let store = TileStore::new(8, 4);
        assert!(store.try_get(coord(3, -2)).is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_evicts_least_recent() {
        let mut store = TileStore::new(8, 2);
        store.get_or_create(coord(0, 0), 1);
        store.get_or_create(coord(1, 0), 2);
        store.get_or_create(coord(2, 0), 3);

        assert_eq!(store.evict_over_capacity(), 1);
        assert_eq!(store.len(), 2);
        assert!(store.try_get(coord(0, 0)).is_none());
        assert!(store.try_get(coord(1, 0)).is_some());
        assert!(store.try_get(coord(2, 0)).is_some());
        assert_eq!(store.evictions(), 1);
    }

    #[test]
    fn test_rewrite_refreshes_recency() {
        let mut store = TileStore::new(8, 2);
        store.get_or_create(coord(0, 0), 1);
        store.get_or_create(coord(1, 0), 2);
        // Touch the older tile again, making (1, 0) the victim
        store.get_or_create(coord(0, 0), 3);
        store.get_or_create(coord(2, 0), 4);

        store.evict_over_capacity();
        assert!(store.try_get(coord(0, 0)).is_some());
        assert!(store.try_get(coord(1, 0)).is_none());
    }

    #[test]
    fn test_eviction_tie_breaks_by_coord() {
        let mut store = TileStore::new(8, 2);
        // Three tiles written under the same stamp (one ray crossing a
        // tile boundary does this)
        store.get_or_create(coord(5, 1), 7);
        store.get_or_create(coord(-3, 9), 7);
        store.get_or_create(coord(5, 0), 7);

        store.evict_over_capacity();
        // Lowest (tx, ty) goes first
        assert!(store.try_get(coord(-3, 9)).is_none());
        assert!(store.try_get(coord(5, 0)).is_some());
        assert!(store.try_get(coord(5, 1)).is_some());
    }

    #[test]
    fn test_evicts_down_to_capacity() {
        let mut store = TileStore::new(8, 2);
        for i in 0..5 {
            store.get_or_create(coord(i, 0), i as u64 + 1);
        }
        assert_eq!(store.evict_over_capacity(), 3);
        assert_eq!(store.len(), 2);
        assert_eq!(store.evictions(), 3);
    }

    #[test]
    fn test_clear_keeps_counters() {
        let mut store = TileStore::new(8, 1);
        store.get_or_create(coord(0, 0), 1);
        store.get_or_create(coord(1, 0), 2);
        store.evict_over_capacity();
        assert_eq!(store.evictions(), 1);

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.evictions(), 1);
    }

    #[test]
    fn test_sorted_coords() {
        let mut store = TileStore::new(8, 8);
        store.get_or_create(coord(2, 0), 1);
        store.get_or_create(coord(-1, 5), 2);
        store.get_or_create(coord(2, -3), 3);

        let coords = store.sorted_coords();
        assert_eq!(coords, vec![coord(-1, 5), coord(2, -3), coord(2, 0)]);
    }
}
