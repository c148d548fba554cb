//! Bounded region queries over resident tiles.
//!
//! A region query walks only the tiles that exist in the store and
//! overlap the requested cell rectangle; absent space is skipped rather
//! than synthesized, so a query over a huge box costs no more than the
//! map that has actually been observed. Each call builds a fresh
//! iterator, so callers can re-run the same query after further updates.

use crate::core::{GridCoord, TileCoord};
use crate::grid::cell;
use crate::grid::store::TileStore;
use crate::grid::tile::Tile;

/// Lazy iterator over known-region cells.
///
/// Yields `(GridCoord, Option<u8>)` in a fixed order: tiles ascending by
/// coordinate, cells within a tile row-major. `None` is the unknown
/// sentinel for in-tile cells that were never written.
pub struct RegionIter<'a> {
    tiles: Vec<(TileCoord, &'a Tile)>,
    tile_idx: usize,
    min: GridCoord,
    max: GridCoord,
    tile_side: u16,
    cursor: Option<Cursor>,
}

#[derive(Clone, Copy)]
struct Cursor {
    base: GridCoord,
    x0: i32,
    x1: i32,
    y1: i32,
    x: i32,
    y: i32,
}

impl<'a> RegionIter<'a> {
    /// Iterator over the cell rectangle spanned by two corners,
    /// inclusive. Corner order does not matter.
    pub(crate) fn new(store: &'a TileStore, a: GridCoord, b: GridCoord) -> Self {
        let min = GridCoord::new(a.x.min(b.x), a.y.min(b.y));
        let max = GridCoord::new(a.x.max(b.x), a.y.max(b.y));

        let tile_side = store.tile_side();
        let (tile_min, _) = min.tile_split(tile_side);
        let (tile_max, _) = max.tile_split(tile_side);

        // Resident tiles overlapping the rectangle, lowest coordinate
        // first. Bounded by store capacity regardless of rectangle size.
        let mut tiles: Vec<(TileCoord, &Tile)> = store
            .iter()
            .filter(|(coord, _)| {
                coord.tx >= tile_min.tx
                    && coord.tx <= tile_max.tx
                    && coord.ty >= tile_min.ty
                    && coord.ty <= tile_max.ty
            })
            .collect();
        tiles.sort_unstable_by_key(|&(coord, _)| coord);

        Self {
            tiles,
            tile_idx: 0,
            min,
            max,
            tile_side,
            cursor: None,
        }
    }

    /// Number of resident tiles the query overlaps.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    fn enter_tile(&self, coord: TileCoord) -> Cursor {
        let base = coord.base_cell(self.tile_side);
        let side = self.tile_side as i32;

        // Clip the query rectangle to this tile, in tile-local coords
        let x0 = (self.min.x - base.x).max(0);
        let x1 = (self.max.x - base.x).min(side - 1);
        let y0 = (self.min.y - base.y).max(0);
        let y1 = (self.max.y - base.y).min(side - 1);

        Cursor {
            base,
            x0,
            x1,
            y1,
            x: x0,
            y: y0,
        }
    }
}

impl<'a> Iterator for RegionIter<'a> {
    type Item = (GridCoord, Option<u8>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(cursor) = &mut self.cursor else {
                let &(coord, _) = self.tiles.get(self.tile_idx)?;
                self.cursor = Some(self.enter_tile(coord));
                continue;
            };

            if cursor.y > cursor.y1 {
                self.cursor = None;
                self.tile_idx += 1;
                continue;
            }

            let local = (cursor.x, cursor.y);
            let coord = cursor.base + GridCoord::new(cursor.x, cursor.y);

            cursor.x += 1;
            if cursor.x > cursor.x1 {
                cursor.x = cursor.x0;
                cursor.y += 1;
            }

            let tile = self.tiles[self.tile_idx].1;
            let value = tile
                .value(local.0, local.1)
                .ok()
                .filter(|&v| v != cell::UNKNOWN);
            return Some((coord, value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_marks(marks: &[(i32, i32)]) -> TileStore {
        let mut store = TileStore::new(4, 16);
        for (i, &(x, y)) in marks.iter().enumerate() {
            let cell = GridCoord::new(x, y);
            let (tile, local) = cell.tile_split(4);
            store
                .get_or_create(tile, i as u64 + 1)
                .set(local.x, local.y, 200, i as u64 + 1)
                .unwrap();
        }
        store
    }

    #[test]
    fn test_empty_store_yields_nothing() {
        let store = TileStore::new(4, 16);
        let mut iter = RegionIter::new(&store, GridCoord::new(-100, -100), GridCoord::new(100, 100));
        assert_eq!(iter.tile_count(), 0);
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_skips_absent_tiles() {
        // Marks in tiles (0,0) and (5,5); everything between is absent
        let store = store_with_marks(&[(1, 1), (21, 21)]);
        let iter = RegionIter::new(&store, GridCoord::new(0, 0), GridCoord::new(23, 23));
        assert_eq!(iter.tile_count(), 2);

        let cells: Vec<_> = iter.collect();
        // Two full 4x4 tiles, nothing synthesized in between
        assert_eq!(cells.len(), 32);
        let known: Vec<_> = cells.iter().filter(|(_, v)| v.is_some()).collect();
        assert_eq!(known.len(), 2);
    }

    #[test]
    fn test_clips_to_rectangle() {
        let store = store_with_marks(&[(0, 0)]);
        let cells: Vec<_> =
            RegionIter::new(&store, GridCoord::new(1, 1), GridCoord::new(2, 3)).collect();
        assert_eq!(cells.len(), 2 * 3);
        for (coord, _) in &cells {
            assert!(coord.x >= 1 && coord.x <= 2);
            assert!(coord.y >= 1 && coord.y <= 3);
        }
    }

    #[test]
    fn test_order_is_row_major_within_tile() {
        let store = store_with_marks(&[(0, 0)]);
        let cells: Vec<_> =
            RegionIter::new(&store, GridCoord::new(0, 0), GridCoord::new(2, 1)).collect();
        let coords: Vec<_> = cells.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            coords,
            vec![
                GridCoord::new(0, 0),
                GridCoord::new(1, 0),
                GridCoord::new(2, 0),
                GridCoord::new(0, 1),
                GridCoord::new(1, 1),
                GridCoord::new(2, 1),
            ]
        );
    }

    #[test]
    fn test_tiles_visited_in_ascending_order() {
        let store = store_with_marks(&[(9, 0), (1, 0), (1, 9), (9, 9)]);
        let cells: Vec<_> =
            RegionIter::new(&store, GridCoord::new(0, 0), GridCoord::new(11, 11)).collect();

        let mut seen_tiles = Vec::new();
        for (coord, _) in &cells {
            let (tile, _) = coord.tile_split(4);
            if seen_tiles.last() != Some(&tile) {
                seen_tiles.push(tile);
            }
        }
        let mut sorted = seen_tiles.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(seen_tiles, sorted);
    }

    #[test]
    fn test_restartable() {
        let store = store_with_marks(&[(2, 2)]);
        let first: Vec<_> =
            RegionIter::new(&store, GridCoord::new(0, 0), GridCoord::new(3, 3)).collect();
        let second: Vec<_> =
            RegionIter::new(&store, GridCoord::new(0, 0), GridCoord::new(3, 3)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_swapped_corners() {
        let store = store_with_marks(&[(2, 2)]);
        let forward: Vec<_> =
            RegionIter::new(&store, GridCoord::new(0, 0), GridCoord::new(3, 3)).collect();
        let swapped: Vec<_> =
            RegionIter::new(&store, GridCoord::new(3, 3), GridCoord::new(0, 0)).collect();
        assert_eq!(forward, swapped);
    }

    #[test]
    fn test_unknown_cells_yield_none() {
        let store = store_with_marks(&[(0, 0)]);
        let cells: Vec<_> =
            RegionIter::new(&store, GridCoord::new(0, 0), GridCoord::new(1, 0)).collect();
        assert_eq!(cells[0], (GridCoord::new(0, 0), Some(200)));
        assert_eq!(cells[1], (GridCoord::new(1, 0), None));
    }

    #[test]
    fn test_negative_coordinates() {
        let store = store_with_marks(&[(-1, -1)]);
        let cells: Vec<_> =
            RegionIter::new(&store, GridCoord::new(-2, -2), GridCoord::new(-1, -1)).collect();
        assert_eq!(cells.len(), 4);
        assert!(
            cells
                .iter()
                .any(|&(c, v)| c == GridCoord::new(-1, -1) && v == Some(200))
        );
    }
}
