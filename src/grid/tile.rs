//! Fixed-size block of cells.
//!
//! A tile owns two parallel planes over the same `side * side` cell
//! layout: occupancy bytes and per-cell write stamps. Cells are addressed
//! by tile-local coordinates in `0..side`; row-major, y major.

use crate::error::{GridError, Result};
use crate::grid::cell;

/// One resident block of the sparse grid
#[derive(Clone, Debug)]
pub struct Tile {
    side: u16,
    occupancy: Box<[u8]>,
    stamps: Box<[u64]>,
    last_touch: u64,
}

impl Tile {
    /// Fresh tile with every cell unknown and unstamped.
    pub fn new(side: u16, touch: u64) -> Self {
        let cells = side as usize * side as usize;
        Self {
            side,
            occupancy: vec![cell::UNKNOWN; cells].into_boxed_slice(),
            stamps: vec![0; cells].into_boxed_slice(),
            last_touch: touch,
        }
    }

    /// Rebuild a tile from serialized planes.
    ///
    /// Plane lengths must match `side * side`.
    pub(crate) fn from_planes(
        side: u16,
        occupancy: Box<[u8]>,
        stamps: Box<[u64]>,
        last_touch: u64,
    ) -> Result<Self> {
        let cells = side as usize * side as usize;
        if occupancy.len() != cells || stamps.len() != cells {
            return Err(GridError::InvalidConfig(format!(
                "tile planes hold {} and {} cells, expected {}",
                occupancy.len(),
                stamps.len(),
                cells
            )));
        }
        Ok(Self {
            side,
            occupancy,
            stamps,
            last_touch,
        })
    }

    /// Cells per tile edge.
    #[inline]
    pub fn side(&self) -> u16 {
        self.side
    }

    /// Logical time of the last write into this tile.
    #[inline]
    pub fn last_touch(&self) -> u64 {
        self.last_touch
    }

    /// Bump recency without writing a cell.
    #[inline]
    pub(crate) fn touch(&mut self, stamp: u64) {
        self.last_touch = stamp;
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Result<usize> {
        let side = self.side as i32;
        if x < 0 || y < 0 || x >= side || y >= side {
            return Err(GridError::OutOfBounds {
                x,
                y,
                side: self.side,
            });
        }
        Ok(y as usize * self.side as usize + x as usize)
    }

    /// Raw occupancy value at a tile-local cell.
    ///
    /// Returns the unknown sentinel for never-written cells.
    #[inline]
    pub fn value(&self, x: i32, y: i32) -> Result<u8> {
        Ok(self.occupancy[self.index(x, y)?])
    }

    /// Write stamp at a tile-local cell; 0 means never written.
    #[inline]
    pub fn stamp(&self, x: i32, y: i32) -> Result<u64> {
        Ok(self.stamps[self.index(x, y)?])
    }

    /// Overwrite a cell value directly.
    pub fn set(&mut self, x: i32, y: i32, value: u8, stamp: u64) -> Result<()> {
        let idx = self.index(x, y)?;
        self.occupancy[idx] = value;
        self.stamps[idx] = stamp;
        self.last_touch = stamp;
        Ok(())
    }

    /// Accumulate a signed delta into a cell and return the new value.
    ///
    /// First writes start from the midpoint prior; the result saturates at
    /// the value range bounds and never becomes the unknown sentinel.
    pub fn apply(&mut self, x: i32, y: i32, delta: i16, stamp: u64) -> Result<u8> {
        let idx = self.index(x, y)?;
        let next = cell::apply_delta(self.occupancy[idx], delta);
        self.occupancy[idx] = next;
        self.stamps[idx] = stamp;
        self.last_touch = stamp;
        Ok(next)
    }

    /// Occupancy plane in row-major order.
    #[inline]
    pub fn occupancy_plane(&self) -> &[u8] {
        &self.occupancy
    }

    /// Stamp plane in row-major order.
    #[inline]
    pub fn stamp_plane(&self) -> &[u64] {
        &self.stamps
    }

    /// Count of cells holding a known value.
    pub fn known_cells(&self) -> usize {
        self.occupancy
            .iter()
            .filter(|&&v| v != cell::UNKNOWN)
            .count()
    }
}
