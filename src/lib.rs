//! # KshetraGrid
//!
//! Tiled occupancy grid for mobile-robot spatial awareness.
//!
//! ## Overview
//!
//! KshetraGrid stores a sparse 2D occupancy map as fixed-size tiles that
//! materialize on first write and are evicted least-recently-touched when a
//! configured tile budget is exceeded. The map grows in any direction as the
//! robot explores; memory stays bounded no matter how far it wanders.
//!
//! - **Sparse tiles** - Only observed regions consume memory
//! - **Occupancy accumulation** - Saturating per-cell evidence with hit/miss
//!   deltas, classified into free / uncertain / occupied bands
//! - **Ray casting** - Bresenham traversal carves free space from range
//!   readings and marks obstacle endpoints
//! - **LRU eviction** - Stale tiles are dropped first, active workspace is kept
//! - **Shared access** - One sensing writer, many planner/docking readers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kshetra_grid::{MapConfig, TileGrid, WorldPoint};
//!
//! // Create a grid with default configuration
//! let config = MapConfig::default();
//! let mut grid = TileGrid::new(config)?;
//!
//! // Integrate one sensor frame (free-space carving + endpoint marking)
//! let outcome = grid.observe(&frame);
//! println!("cast {} rays, freed {} cells", outcome.rays_cast, outcome.cells_freed);
//!
//! // Query for the docking controller
//! if let Some(hit) = grid.nearest_obstacle(WorldPoint::new(0.0, 0.0), 1.5) {
//!     println!("closest obstacle at ({:.2}, {:.2})", hit.x, hit.y);
//! }
//! ```
//!
//! ## Coordinate System
//!
//! Uses ROS REP-103 convention:
//! - X: Forward (positive ahead of robot)
//! - Y: Left (positive to robot's left)
//! - Theta: Rotation in radians, CCW positive from +X axis
//!
//! World coordinates are meters (`f32`); grid coordinates are signed cell
//! indices obtained by flooring against the map origin and resolution.

#![warn(missing_docs)]

// Core geometry and sensor types
pub mod core;

// Error types
pub mod error;

// Tile storage, occupancy updates, queries
pub mod grid;

// Persistence (save/load)
pub mod io;

// Thread-safe grid handle
pub mod shared;

// Re-export commonly used types
pub use core::{GridCoord, Pose2D, RangeReading, SensorFrame, TileCoord, TimedPose, WorldPoint};

pub use error::{GridError, Result};

pub use grid::{
    CellClass, ConfigLoadError, GridConfig, GridStats, MapConfig, OccupancyConfig, RayUpdate,
    RegionIter, SensorConfig, TileGrid, UpdateOutcome,
};

pub use io::{SnapshotError, load_snapshot, read_snapshot, save_snapshot, write_snapshot};

pub use shared::SharedTileGrid;
