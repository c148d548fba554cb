//! Sensor frame updates for the tile grid.
//!
//! Turns one frame of range readings into ray updates: each usable beam
//! carves free space from the sensor position out to its endpoint, and
//! confirmed obstacles mark the terminal cell. The pipeline holds no
//! state of its own; the robot pose it receives replaces the engine's
//! stored pose, last write wins.

use crate::core::SensorFrame;
use crate::grid::engine::TileGrid;

/// Counters from applying one sensor frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Beams traced into the grid
    pub rays_cast: usize,
    /// Beams truncated at max range, traced without an obstacle mark
    pub rays_capped: usize,
    /// Readings discarded before tracing (invalid, NaN, below min range)
    pub readings_skipped: usize,
    /// Cells that received a free mark
    pub cells_freed: usize,
    /// Terminal cells that received an obstacle mark
    pub cells_occupied: usize,
}

impl UpdateOutcome {
    /// Fold another outcome into this one.
    pub fn merge(&mut self, other: UpdateOutcome) {
        self.rays_cast += other.rays_cast;
        self.rays_capped += other.rays_capped;
        self.readings_skipped += other.readings_skipped;
        self.cells_freed += other.cells_freed;
        self.cells_occupied += other.cells_occupied;
    }
}

/// Apply a sensor frame to the grid.
///
/// Records the frame's pose, then traces one ray per usable reading.
/// Beams at or beyond the configured max range (including no-return
/// beams) are capped: traced to the max-range point with the terminal
/// cell left untouched.
pub fn update_from_frame(grid: &mut TileGrid, frame: &SensorFrame) -> UpdateOutcome {
    let mut outcome = UpdateOutcome::default();

    grid.record_pose(frame.pose);

    let sensor = grid.config().sensor;
    let robot = frame.pose.pose;
    let sensor_pos = robot.transform_point(sensor.sensor_offset);

    for reading in &frame.readings {
        if !sensor.reading_usable(reading) {
            outcome.readings_skipped += 1;
            continue;
        }

        let capped = sensor.reading_capped(reading);
        let distance = if capped {
            sensor.max_range
        } else {
            reading.distance
        };
        let world_angle = robot.theta + reading.angle;
        let endpoint = sensor_pos.point_at(world_angle, distance);

        let ray = grid.cast_ray(sensor_pos, endpoint, !capped);
        outcome.rays_cast += 1;
        if capped {
            outcome.rays_capped += 1;
        }
        outcome.cells_freed += ray.cells_freed;
        if ray.endpoint_marked {
            outcome.cells_occupied += 1;
        }
    }

    log::trace!(
        "frame at stamp {}: {} rays ({} capped, {} skipped), {} freed, {} occupied",
        frame.pose.stamp,
        outcome.rays_cast,
        outcome.rays_capped,
        outcome.readings_skipped,
        outcome.cells_freed,
        outcome.cells_occupied
    );
    outcome
}
