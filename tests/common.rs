//! Shared helpers for integration tests.

#![allow(dead_code)]

use kshetra_grid::{MapConfig, Pose2D, RangeReading, SensorFrame, TimedPose};

/// Map configuration used across the integration tests.
///
/// Quarter-meter cells keep world-to-cell flooring exact for the
/// coordinates the tests use; tiles are 2 m across.
pub fn room_config(capacity: usize) -> MapConfig {
    let mut config = MapConfig::default();
    config.grid.resolution = 0.25;
    config.grid.tile_side = 8;
    config.grid.capacity = capacity;
    config.sensor.max_range = 2.0;
    config
}

/// Pose at (x, y) facing `theta`, stamped with a frame counter.
pub fn pose_at(x: f32, y: f32, theta: f32, stamp: u64) -> TimedPose {
    TimedPose::new(Pose2D::new(x, y, theta), stamp)
}

/// Frame with `beams` readings spread evenly over a full turn, all
/// reporting an obstacle at `distance` meters.
pub fn ring_frame(pose: TimedPose, beams: usize, distance: f32) -> SensorFrame {
    let readings = (0..beams)
        .map(|i| {
            let angle = 2.0 * std::f32::consts::PI * i as f32 / beams as f32;
            RangeReading::new(angle, distance)
        })
        .collect();
    SensorFrame::new(pose, readings)
}

/// Frame whose beams all went out to full range without a return.
pub fn open_ring_frame(pose: TimedPose, beams: usize) -> SensorFrame {
    let readings = (0..beams)
        .map(|i| {
            let angle = 2.0 * std::f32::consts::PI * i as f32 / beams as f32;
            RangeReading::no_return(angle)
        })
        .collect();
    SensorFrame::new(pose, readings)
}

/// Deterministic pseudo-random walk of `n` poses inside a square arena
/// with its corner at the origin.
pub fn wander_poses(n: usize, arena: f32, seed: u64) -> Vec<TimedPose> {
    use std::num::Wrapping;

    // Simple LCG PRNG for reproducibility
    let mut state = Wrapping(seed);
    let a = Wrapping(1664525u64);
    let c = Wrapping(1013904223u64);

    let mut random = move || -> f32 {
        state = a * state + c;
        ((state.0 >> 16) & 0xFFFF) as f32 / 65536.0
    };

    (0..n)
        .map(|i| {
            let x = random() * arena;
            let y = random() * arena;
            let theta = (random() - 0.5) * 2.0 * std::f32::consts::PI;
            TimedPose::new(Pose2D::new(x, y, theta), i as u64)
        })
        .collect()
}
