//! The grid engine: transforms, cell updates, ray casting, queries.
//!
//! [`TileGrid`] owns the tile store and the logical write clock. Every
//! public write operation advances the clock by one, stamps the cells it
//! touches, and runs eviction before returning, so the resident tile
//! count never exceeds capacity between calls.
//!
//! The engine itself is single-threaded; [`crate::shared::SharedTileGrid`]
//! wraps it for concurrent use.

use crate::core::{GridCoord, SensorFrame, TimedPose, WorldPoint};
use crate::error::Result;
use crate::grid::cell::{self, CellClass};
use crate::grid::config::MapConfig;
use crate::grid::raycaster::BresenhamLine;
use crate::grid::region::RegionIter;
use crate::grid::scan_update::{self, UpdateOutcome};
use crate::grid::store::TileStore;

// Cells live in a quarter of the i32 range so coordinate differences
// and tile base cells never overflow 32-bit arithmetic.
const COORD_LIMIT: i32 = i32::MAX / 4;

/// Effect of a single ray update
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RayUpdate {
    /// Intermediate cells that received a free mark
    pub cells_freed: usize,
    /// Whether the terminal cell received an obstacle mark
    pub endpoint_marked: bool,
}

/// Engine counters for logging and tests
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridStats {
    /// Tiles currently resident
    pub resident_tiles: usize,
    /// Resident tile bound
    pub capacity: usize,
    /// Tiles evicted over the engine's lifetime
    pub evictions: u64,
    /// Logical write clock; one tick per write operation
    pub clock: u64,
}

/// Sparse tiled occupancy grid
#[derive(Clone, Debug)]
pub struct TileGrid {
    store: TileStore,
    config: MapConfig,
    clock: u64,
    last_pose: Option<TimedPose>,
}

impl TileGrid {
    /// Build an engine from a validated configuration.
    ///
    /// Fails with [`GridError::InvalidConfig`] on non-positive
    /// resolution, tile side, or capacity; this is the only fallible
    /// point of the engine.
    ///
    /// [`GridError::InvalidConfig`]: crate::error::GridError::InvalidConfig
    pub fn new(config: MapConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store: TileStore::new(config.grid.tile_side, config.grid.capacity),
            config,
            clock: 0,
            last_pose: None,
        })
    }

    /// The configuration this engine was built with.
    #[inline]
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Cell containing a world point.
    ///
    /// Any finite coordinate maps to a cell, arbitrarily far from the
    /// explored area; querying there just reads unknown. Coordinates
    /// beyond the representable band clamp to its edge cell.
    #[inline]
    pub fn world_to_grid(&self, point: WorldPoint) -> GridCoord {
        let g = &self.config.grid;
        GridCoord::new(
            (((point.x - g.origin.x) / g.resolution).floor() as i32)
                .clamp(-COORD_LIMIT, COORD_LIMIT),
            (((point.y - g.origin.y) / g.resolution).floor() as i32)
                .clamp(-COORD_LIMIT, COORD_LIMIT),
        )
    }

    /// Center of a cell in world coordinates.
    ///
    /// The round trip through [`world_to_grid`] snaps to cell centers,
    /// so it moves a point by at most half a cell diagonal.
    ///
    /// [`world_to_grid`]: TileGrid::world_to_grid
    #[inline]
    pub fn grid_to_world(&self, coord: GridCoord) -> WorldPoint {
        let g = &self.config.grid;
        WorldPoint::new(
            g.origin.x + (coord.x as f32 + 0.5) * g.resolution,
            g.origin.y + (coord.y as f32 + 0.5) * g.resolution,
        )
    }

    /// Accumulate a signed occupancy delta into the cell containing a
    /// world point. Returns the cell's new value.
    ///
    /// Materializes the tile if absent and may evict another to stay
    /// within capacity.
    pub fn mark_cell(&mut self, point: WorldPoint, delta: i16) -> u8 {
        let stamp = self.tick();
        let coord = self.world_to_grid(point);
        let value = self.apply_at(coord, delta, stamp);
        self.store.evict_over_capacity();
        value
    }

    /// Occupancy value of the cell containing a world point.
    ///
    /// `None` means unknown: the tile was never written (or has been
    /// evicted), or the cell inside a resident tile was never touched.
    /// Never allocates.
    #[inline]
    pub fn query_cell(&self, point: WorldPoint) -> Option<u8> {
        self.query_cell_grid(self.world_to_grid(point))
    }

    /// Occupancy value of a cell by grid coordinate.
    pub fn query_cell_grid(&self, coord: GridCoord) -> Option<u8> {
        let (tile_coord, local) = coord.tile_split(self.config.grid.tile_side);
        let tile = self.store.try_get(tile_coord)?;
        tile.value(local.x, local.y)
            .ok()
            .filter(|&v| v != cell::UNKNOWN)
    }

    /// Classify the cell containing a world point against the
    /// configured thresholds.
    #[inline]
    pub fn cell_class(&self, point: WorldPoint) -> CellClass {
        self.config.occupancy.classify(self.query_cell(point))
    }

    /// Trace a beam from `origin` to `endpoint`, carving free space.
    ///
    /// Intermediate cells receive the miss delta. The terminal cell
    /// receives the hit delta when `mark_endpoint` is true; a capped
    /// beam (no confirmed obstacle) passes false and leaves the terminal
    /// cell untouched. A degenerate beam whose endpoints share a cell
    /// updates that single cell under the terminal rule.
    ///
    /// Beams longer than the sensor's trusted range are traced only that
    /// far: the walk stops at the max-range cell budget and no terminal
    /// mark is placed.
    ///
    /// The whole ray shares one clock stamp; the cell sequence is
    /// deterministic for a given pair of endpoints.
    pub fn cast_ray(
        &mut self,
        origin: WorldPoint,
        endpoint: WorldPoint,
        mark_endpoint: bool,
    ) -> RayUpdate {
        let stamp = self.tick();
        let start = self.world_to_grid(origin);
        let end = self.world_to_grid(endpoint);
        let hit = self.config.occupancy.hit_delta;
        let miss = self.config.occupancy.miss_delta;
        // The longest cell footprint a trusted beam can have
        let range_cells = (self.config.sensor.max_range / self.config.grid.resolution).ceil();
        let budget = (range_cells as usize).saturating_add(2);

        let mut cells_freed = 0;
        let mut walked = 0;
        let mut truncated = false;
        let mut line = BresenhamLine::new(start, end).peekable();
        while let Some(coord) = line.next() {
            if walked == budget {
                truncated = true;
                break;
            }
            walked += 1;
            let is_terminal = line.peek().is_none();
            if is_terminal {
                if mark_endpoint {
                    self.apply_at(coord, hit, stamp);
                }
            } else {
                self.apply_at(coord, miss, stamp);
                cells_freed += 1;
            }
        }

        self.store.evict_over_capacity();
        RayUpdate {
            cells_freed,
            endpoint_marked: mark_endpoint && !truncated,
        }
    }

    /// Lazy iterator over the cells of a world-space rectangle.
    ///
    /// Only resident tiles are visited; see [`RegionIter`] for the
    /// iteration order.
    pub fn region_cells(&self, min: WorldPoint, max: WorldPoint) -> RegionIter<'_> {
        RegionIter::new(&self.store, self.world_to_grid(min), self.world_to_grid(max))
    }

    /// World position of the occupied cell nearest to `center`, within
    /// `max_radius` meters. Returns the cell's center.
    ///
    /// `None` when nothing occupied lies in range, or when the radius is
    /// not a positive finite number. Distance ties resolve to the first
    /// cell in region iteration order.
    pub fn nearest_obstacle(&self, center: WorldPoint, max_radius: f32) -> Option<WorldPoint> {
        if !(max_radius.is_finite() && max_radius > 0.0) {
            return None;
        }

        let min = WorldPoint::new(center.x - max_radius, center.y - max_radius);
        let max = WorldPoint::new(center.x + max_radius, center.y + max_radius);
        let occupied_min = self.config.occupancy.occupied_min;
        let radius_sq = max_radius * max_radius;

        let mut best: Option<(f32, WorldPoint)> = None;
        for (coord, value) in self.region_cells(min, max) {
            let Some(value) = value else {
                continue;
            };
            if value < occupied_min {
                continue;
            }
            let point = self.grid_to_world(coord);
            let dist_sq = center.distance_squared(&point);
            if dist_sq > radius_sq {
                continue;
            }
            if best.is_none_or(|(best_sq, _)| dist_sq < best_sq) {
                best = Some((dist_sq, point));
            }
        }
        best.map(|(_, point)| point)
    }

    /// Apply a full sensor frame: record its pose, then trace one ray
    /// per usable reading. See [`scan_update::update_from_frame`].
    pub fn observe(&mut self, frame: &SensorFrame) -> UpdateOutcome {
        scan_update::update_from_frame(self, frame)
    }

    /// Replace the stored robot pose. Last write wins; stale poses are
    /// never queued.
    #[inline]
    pub fn record_pose(&mut self, pose: TimedPose) {
        self.last_pose = Some(pose);
    }

    /// The most recently recorded robot pose.
    #[inline]
    pub fn last_pose(&self) -> Option<TimedPose> {
        self.last_pose
    }

    /// Drop all tiles and the stored pose.
    ///
    /// The write clock and eviction counter keep counting, so recency
    /// comparisons stay monotonic across the reset.
    pub fn reset(&mut self) {
        self.store.clear();
        self.last_pose = None;
        log::info!("grid reset, clock at {}", self.clock);
    }

    /// Current engine counters.
    pub fn stats(&self) -> GridStats {
        GridStats {
            resident_tiles: self.store.len(),
            capacity: self.store.capacity(),
            evictions: self.store.evictions(),
            clock: self.clock,
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn apply_at(&mut self, coord: GridCoord, delta: i16, stamp: u64) -> u8 {
        let (tile_coord, local) = coord.tile_split(self.config.grid.tile_side);
        let tile = self.store.get_or_create(tile_coord, stamp);
        match tile.apply(local.x, local.y, delta, stamp) {
            Ok(value) => value,
            Err(err) => {
                // tile_split keeps locals inside the tile; reaching this
                // arm is an engine bug
                debug_assert!(false, "tile-local access failed: {err}");
                cell::UNKNOWN
            }
        }
    }

    pub(crate) fn store(&self) -> &TileStore {
        &self.store
    }

    pub(crate) fn from_restored(config: MapConfig, store: TileStore, clock: u64) -> Self {
        Self {
            store,
            config,
            clock,
            last_pose: None,
        }
    }
}
