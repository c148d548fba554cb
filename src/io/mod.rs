//! Map persistence.
//!
//! Snapshots let the docking node survive a restart without rescanning
//! the room: resident tiles, per-cell write stamps, and the write clock
//! all round-trip, so queries and eviction order pick up where the
//! previous run stopped.

pub mod snapshot;

pub use snapshot::{SnapshotError, load_snapshot, read_snapshot, save_snapshot, write_snapshot};
