//! Core geometry and sensor types.

pub mod math;
pub mod point;
pub mod pose;
pub mod sensors;

pub use point::{GridCoord, TileCoord, WorldPoint};
pub use pose::Pose2D;
pub use sensors::{RangeReading, SensorFrame, TimedPose};
