//! Benchmark grid operations performance.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use kshetra_grid::{MapConfig, Pose2D, RangeReading, SensorFrame, TileGrid, TimedPose, WorldPoint};
use std::f32::consts::PI;

/// Configuration with the range long enough to reach every wall of the
/// benchmark room.
fn bench_config() -> MapConfig {
    let mut config = MapConfig::default();
    config.sensor.max_range = 8.0;
    config
}

/// Synthesize the frame a range sensor would capture in an empty
/// rectangular room with its corner at the origin.
fn room_frame(
    room_width: f32,
    room_height: f32,
    robot_x: f32,
    robot_y: f32,
    beams: usize,
) -> SensorFrame {
    let angle_increment = 2.0 * PI / beams as f32;
    let max_range = (room_width * room_width + room_height * room_height).sqrt();

    let mut readings = Vec::with_capacity(beams);
    for i in 0..beams {
        let angle = i as f32 * angle_increment - PI;
        let cos_a = angle.cos();
        let sin_a = angle.sin();
        let mut range = max_range;

        // Nearest intersection with the four walls
        if cos_a > 0.0 {
            let t = (room_width - robot_x) / cos_a;
            if t > 0.0 && t < range && (0.0..=room_height).contains(&(robot_y + t * sin_a)) {
                range = t;
            }
        }
        if cos_a < 0.0 {
            let t = -robot_x / cos_a;
            if t > 0.0 && t < range && (0.0..=room_height).contains(&(robot_y + t * sin_a)) {
                range = t;
            }
        }
        if sin_a > 0.0 {
            let t = (room_height - robot_y) / sin_a;
            if t > 0.0 && t < range && (0.0..=room_width).contains(&(robot_x + t * cos_a)) {
                range = t;
            }
        }
        if sin_a < 0.0 {
            let t = -robot_y / sin_a;
            if t > 0.0 && t < range && (0.0..=room_width).contains(&(robot_x + t * cos_a)) {
                range = t;
            }
        }

        readings.push(RangeReading::new(angle, range));
    }

    let pose = TimedPose::new(Pose2D::new(robot_x, robot_y, 0.0), 0);
    SensorFrame::new(pose, readings)
}

fn bench_frame_observe(c: &mut Criterion) {
    let mut grid = TileGrid::new(bench_config()).unwrap();
    let frame = room_frame(6.0, 6.0, 3.0, 3.0, 360);

    // Warm up
    for _ in 0..5 {
        grid.observe(&frame);
    }

    c.bench_function("observe_360_beams", |b| {
        b.iter(|| {
            let outcome = grid.observe(black_box(&frame));
            black_box(outcome)
        })
    });
}

fn bench_frame_observe_beam_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("observe_beams");

    for beams in [90, 180, 360].iter() {
        let mut grid = TileGrid::new(bench_config()).unwrap();
        let frame = room_frame(6.0, 6.0, 3.0, 3.0, *beams);

        // Warm up
        for _ in 0..5 {
            grid.observe(&frame);
        }

        group.bench_with_input(BenchmarkId::from_parameter(beams), beams, |b, _| {
            b.iter(|| {
                let outcome = grid.observe(black_box(&frame));
                black_box(outcome)
            })
        });
    }

    group.finish();
}

fn bench_ray_lengths(c: &mut Criterion) {
    let mut group = c.benchmark_group("cast_ray_meters");

    for meters in [1.0f32, 2.0, 4.0].iter() {
        let mut grid = TileGrid::new(bench_config()).unwrap();
        let origin = WorldPoint::new(0.0, 0.0);
        let endpoint = WorldPoint::new(*meters, 0.3);

        group.bench_with_input(BenchmarkId::from_parameter(meters), meters, |b, _| {
            b.iter(|| {
                let update = grid.cast_ray(black_box(origin), black_box(endpoint), true);
                black_box(update)
            })
        });
    }

    group.finish();
}

fn bench_mark_cell(c: &mut Criterion) {
    let mut grid = TileGrid::new(bench_config()).unwrap();
    let point = WorldPoint::new(1.0, 1.0);

    c.bench_function("mark_cell", |b| {
        b.iter(|| black_box(grid.mark_cell(black_box(point), 45)))
    });
}

fn bench_queries(c: &mut Criterion) {
    let mut grid = TileGrid::new(bench_config()).unwrap();
    for i in 0..20 {
        let angle = i as f32 * 0.2;
        let frame = room_frame(6.0, 6.0, 3.0, 3.0, 360);
        let pose = TimedPose::new(Pose2D::new(3.0, 3.0, angle), i as u64);
        grid.observe(&SensorFrame::new(pose, frame.readings));
    }
    let center = WorldPoint::new(3.0, 3.0);

    c.bench_function("nearest_obstacle_2m", |b| {
        b.iter(|| black_box(grid.nearest_obstacle(black_box(center), 2.0)))
    });

    c.bench_function("region_sweep_room", |b| {
        b.iter(|| {
            let known = grid
                .region_cells(WorldPoint::new(0.0, 0.0), WorldPoint::new(6.0, 6.0))
                .filter(|(_, v)| v.is_some())
                .count();
            black_box(known)
        })
    });
}

criterion_group!(
    benches,
    bench_frame_observe,
    bench_frame_observe_beam_counts,
    bench_ray_lengths,
    bench_mark_cell,
    bench_queries
);
criterion_main!(benches);
