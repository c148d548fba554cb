//! Shared engine handle for multi-threaded use.
//!
//! One sensing thread feeds frames in while docking and planner threads
//! query concurrently:
//! - Sensing thread: calls [`observe`] (or `mark_cell`/`cast_ray` through
//!   [`write`]) at sensor frame rate
//! - Docking thread: polls [`nearest_obstacle`], [`cell_class`],
//!   [`last_pose`] in its control loop
//! - Planner thread: pulls [`query_region`] snapshots
//!
//! The engine sits behind one reader-writer lock. Readers share the lock
//! and never block each other; a writer takes it exclusively for the
//! duration of one frame or ray. Every operation here acquires and
//! releases the lock internally, so no call can observe a half-written
//! cell. Hold [`read`]/[`write`] guards only for short, bounded work.
//!
//! [`observe`]: SharedTileGrid::observe
//! [`write`]: SharedTileGrid::write
//! [`read`]: SharedTileGrid::read
//! [`nearest_obstacle`]: SharedTileGrid::nearest_obstacle
//! [`cell_class`]: SharedTileGrid::cell_class
//! [`last_pose`]: SharedTileGrid::last_pose
//! [`query_region`]: SharedTileGrid::query_region

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::core::{GridCoord, SensorFrame, TimedPose, WorldPoint};
use crate::error::Result;
use crate::grid::{CellClass, GridStats, MapConfig, TileGrid, UpdateOutcome};

/// Cloneable handle to a lock-protected [`TileGrid`].
///
/// Clones share the same engine; hand one to each thread.
#[derive(Clone, Debug)]
pub struct SharedTileGrid {
    inner: Arc<RwLock<TileGrid>>,
}

impl SharedTileGrid {
    /// Build a shared engine from a configuration.
    pub fn new(config: MapConfig) -> Result<Self> {
        Ok(Self::from_grid(TileGrid::new(config)?))
    }

    /// Wrap an existing engine, e.g. one restored from a snapshot.
    pub fn from_grid(grid: TileGrid) -> Self {
        Self {
            inner: Arc::new(RwLock::new(grid)),
        }
    }

    /// Take the shared read lock for a multi-query consistent view.
    pub fn read(&self) -> RwLockReadGuard<'_, TileGrid> {
        self.inner.read()
    }

    /// Take the exclusive write lock.
    pub fn write(&self) -> RwLockWriteGuard<'_, TileGrid> {
        self.inner.write()
    }

    /// Apply a sensor frame under the write lock.
    pub fn observe(&self, frame: &SensorFrame) -> UpdateOutcome {
        self.inner.write().observe(frame)
    }

    /// Accumulate a delta into one cell under the write lock.
    pub fn mark_cell(&self, point: WorldPoint, delta: i16) -> u8 {
        self.inner.write().mark_cell(point, delta)
    }

    /// Read one cell under the shared lock.
    pub fn query_cell(&self, point: WorldPoint) -> Option<u8> {
        self.inner.read().query_cell(point)
    }

    /// Classify one cell under the shared lock.
    pub fn cell_class(&self, point: WorldPoint) -> CellClass {
        self.inner.read().cell_class(point)
    }

    /// Snapshot a rectangle of cells under the shared lock.
    ///
    /// Collects while holding the lock so the result is a consistent
    /// view; updates landing after the call are not reflected.
    pub fn query_region(&self, min: WorldPoint, max: WorldPoint) -> Vec<(GridCoord, Option<u8>)> {
        self.inner.read().region_cells(min, max).collect()
    }

    /// Nearest occupied cell under the shared lock.
    pub fn nearest_obstacle(&self, center: WorldPoint, max_radius: f32) -> Option<WorldPoint> {
        self.inner.read().nearest_obstacle(center, max_radius)
    }

    /// Most recently recorded robot pose.
    pub fn last_pose(&self) -> Option<TimedPose> {
        self.inner.read().last_pose()
    }

    /// Engine counters.
    pub fn stats(&self) -> GridStats {
        self.inner.read().stats()
    }

    /// Drop all tiles and the stored pose.
    pub fn reset(&self) {
        self.inner.write().reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Pose2D, RangeReading};
    use crate::grid::GridConfig;

    fn shared() -> SharedTileGrid {
        let config = MapConfig {
            grid: GridConfig {
                resolution: 0.25,
                tile_side: 8,
                capacity: 32,
                origin: WorldPoint::ZERO,
            },
            ..Default::default()
        };
        SharedTileGrid::new(config).unwrap()
    }

    #[test]
    fn test_clones_share_one_engine() {
        let grid = shared();
        let other = grid.clone();

        grid.mark_cell(WorldPoint::new(0.125, 0.125), 45);
        assert_eq!(other.query_cell(WorldPoint::new(0.125, 0.125)), Some(172));
        assert_eq!(other.stats().resident_tiles, 1);
    }

    #[test]
    fn test_observe_through_handle() {
        let grid = shared();
        let frame = SensorFrame::new(
            TimedPose::new(Pose2D::new(0.125, 0.125, 0.0), 7),
            vec![RangeReading::new(0.0, 1.0)],
        );

        let outcome = grid.observe(&frame);
        assert_eq!(outcome.rays_cast, 1);
        assert_eq!(grid.last_pose().unwrap().stamp, 7);
        assert_eq!(grid.cell_class(WorldPoint::new(1.125, 0.125)), CellClass::Occupied);
    }

    #[test]
    fn test_read_guard_gives_consistent_view() {
        let grid = shared();
        grid.mark_cell(WorldPoint::new(0.125, 0.125), 45);

        let view = grid.read();
        let a = view.query_cell(WorldPoint::new(0.125, 0.125));
        let b = view.query_cell(WorldPoint::new(0.125, 0.125));
        assert_eq!(a, b);
        drop(view);

        grid.reset();
        assert_eq!(grid.query_cell(WorldPoint::new(0.125, 0.125)), None);
    }

    #[test]
    fn test_concurrent_writer_and_readers() {
        let grid = shared();

        std::thread::scope(|scope| {
            let writer = grid.clone();
            scope.spawn(move || {
                for i in 0..50 {
                    let frame = SensorFrame::new(
                        TimedPose::new(Pose2D::new(0.125, 0.125, 0.0), i),
                        vec![RangeReading::new(0.0, 1.0)],
                    );
                    writer.observe(&frame);
                }
            });

            for _ in 0..2 {
                let reader = grid.clone();
                scope.spawn(move || {
                    for _ in 0..100 {
                        // Unknown or a valid accumulated value, never torn
                        if let Some(v) = reader.query_cell(WorldPoint::new(1.125, 0.125)) {
                            assert!(v <= 254);
                        }
                        reader.nearest_obstacle(WorldPoint::new(0.125, 0.125), 3.0);
                    }
                });
            }
        });

        assert!(grid.stats().clock >= 50);
    }
}
