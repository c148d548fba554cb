//! Sensor input types consumed by the update path.
//!
//! A [`SensorFrame`] carries everything one bus message delivers: the robot
//! pose at capture time and the set of range readings taken from that pose.
//! Any extra fields a transport layer attaches are dropped before the frame
//! reaches this crate.

use super::point::WorldPoint;
use super::pose::Pose2D;

/// A single range reading relative to the robot heading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeReading {
    /// Beam angle in radians (0 = forward, CCW positive)
    pub angle: f32,
    /// Measured distance in meters; infinity means no return
    pub distance: f32,
    /// Validity flag from the sensor driver
    pub valid: bool,
}

impl RangeReading {
    /// Create a valid reading.
    #[inline]
    pub fn new(angle: f32, distance: f32) -> Self {
        Self {
            angle,
            distance,
            valid: true,
        }
    }

    /// Create a no-return reading (beam went out to full range unobstructed).
    #[inline]
    pub fn no_return(angle: f32) -> Self {
        Self {
            angle,
            distance: f32::INFINITY,
            valid: true,
        }
    }

    /// Create a reading flagged invalid by the driver.
    #[inline]
    pub fn invalid(angle: f32) -> Self {
        Self {
            angle,
            distance: 0.0,
            valid: false,
        }
    }
}

/// Robot pose with the frame's logical timestamp.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TimedPose {
    /// Robot pose in the world frame
    pub pose: Pose2D,
    /// Capture timestamp (monotonic counter from the pose source)
    pub stamp: u64,
}

impl TimedPose {
    /// Create a timed pose.
    #[inline]
    pub fn new(pose: Pose2D, stamp: u64) -> Self {
        Self { pose, stamp }
    }

    /// Position component of the pose.
    #[inline]
    pub fn position(&self) -> WorldPoint {
        self.pose.position()
    }
}

/// One sensor frame: pose plus the range readings taken from it.
#[derive(Clone, Debug, Default)]
pub struct SensorFrame {
    /// Robot pose when the readings were captured
    pub pose: TimedPose,
    /// Range readings, one per beam
    pub readings: Vec<RangeReading>,
}

impl SensorFrame {
    /// Create a new sensor frame.
    pub fn new(pose: TimedPose, readings: Vec<RangeReading>) -> Self {
        Self { pose, readings }
    }

    /// Build a frame from parallel angle and distance slices.
    ///
    /// All readings are marked valid; use [`RangeReading::no_return`]
    /// distances (infinity) for beams without an obstacle.
    pub fn from_polar(pose: TimedPose, angles: &[f32], distances: &[f32]) -> Self {
        assert_eq!(
            angles.len(),
            distances.len(),
            "angles and distances must have same length"
        );
        let readings = angles
            .iter()
            .zip(distances.iter())
            .map(|(&a, &d)| RangeReading::new(a, d))
            .collect();
        Self { pose, readings }
    }

    /// Number of readings in the frame
    #[inline]
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Is the frame empty?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}
