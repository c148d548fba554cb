//! Sparse tiled occupancy grid.
//!
//! The grid is an unbounded plane of cells realized as a bounded set of
//! fixed-size tiles. Tiles materialize where sensor rays land and are
//! evicted least-recently-written-first once the configured capacity is
//! reached, so memory stays flat no matter how far the robot roams.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                 SensorFrame (pose + readings)    │
//! └──────────────────────┬───────────────────────────┘
//!                        ▼
//!              ┌──────────────────┐
//!              │   scan_update    │  one ray per usable reading
//!              └────────┬─────────┘
//!                       ▼
//!   ┌───────────────────────────────────────┐
//!   │               TileGrid                │
//!   │  transforms · clock · ray casting     │
//!   │  ┌─────────────────────────────────┐  │
//!   │  │    TileStore (LRU, capacity)    │  │
//!   │  │   TileCoord → occupancy/stamps  │  │
//!   │  └─────────────────────────────────┘  │
//!   └───────────┬───────────────────────────┘
//!               ▼
//!     query_cell · region_cells · nearest_obstacle
//! ```
//!
//! ## Key Components
//!
//! - [`TileGrid`]: the engine; owns the store, clock, and transforms
//! - [`MapConfig`]: grid geometry, sensor window, occupancy model
//! - [`scan_update`]: applies sensor frames as batches of rays
//! - [`raycaster`]: integer Bresenham traversal between cells
//! - [`RegionIter`]: lazy rectangle queries over resident tiles
//!
//! ## Occupancy Model
//!
//! Each cell holds one byte. 255 is the unknown sentinel; values 0..=254
//! accumulate evidence with a clamped saturating counter:
//!
//! ```text
//! first write:  start from the midpoint prior (127)
//! beam passes:  value + miss_delta   (default -18)
//! beam ends:    value + hit_delta    (default +45)
//!
//! Classification:
//!   value >= 160 → Occupied
//!   value <=  95 → Free
//!   otherwise    → Uncertain
//! ```
//!
//! One hit marks an obstacle under the default deltas, while several
//! misses are needed to call a cell free. Unknown is never an error; it
//! is the designed answer for space no beam has reached (or whose tile
//! was evicted).

pub mod cell;
mod config;
pub mod engine;
pub mod raycaster;
pub mod region;
pub mod scan_update;
pub(crate) mod store;
pub(crate) mod tile;

pub use cell::CellClass;
pub use config::{ConfigLoadError, GridConfig, MapConfig, OccupancyConfig, SensorConfig};
pub use engine::{GridStats, RayUpdate, TileGrid};
pub use region::RegionIter;
pub use scan_update::UpdateOutcome;
