//! 2D pose type for robot position and orientation.
//!
//! Coordinate frame follows ROS REP-103:
//! - X-forward, Y-left, Z-up (right-handed)
//! - Counter-clockwise positive rotation

use super::math::normalize_angle;
use super::point::WorldPoint;

/// A 2D pose representing position and orientation.
///
/// Uses the ROS REP-103 coordinate convention:
/// - Position: (x, y) in meters
/// - Theta: heading angle in radians, counter-clockwise from X-axis
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose2D {
    /// X position in meters.
    pub x: f32,
    /// Y position in meters.
    pub y: f32,
    /// Heading angle in radians [-π, π), CCW positive from X-axis.
    pub theta: f32,
}

impl Pose2D {
    /// Create a new pose.
    ///
    /// The heading is normalized to [-π, π).
    #[inline]
    pub fn new(x: f32, y: f32, theta: f32) -> Self {
        Self {
            x,
            y,
            theta: normalize_angle(theta),
        }
    }

    /// Create an identity pose (origin, facing forward).
    #[inline]
    pub const fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            theta: 0.0,
        }
    }

    /// Get the position as a WorldPoint.
    #[inline]
    pub fn position(self) -> WorldPoint {
        WorldPoint::new(self.x, self.y)
    }

    /// Transform a point from this pose's local frame to world frame.
    #[inline]
    pub fn transform_point(self, point: WorldPoint) -> WorldPoint {
        let (sin, cos) = self.theta.sin_cos();
        WorldPoint {
            x: self.x + point.x * cos - point.y * sin,
            y: self.y + point.x * sin + point.y * cos,
        }
    }

    /// Transform a point from world frame to this pose's local frame.
    #[inline]
    pub fn inverse_transform_point(self, point: WorldPoint) -> WorldPoint {
        let (sin, cos) = self.theta.sin_cos();
        let dx = point.x - self.x;
        let dy = point.y - self.y;
        WorldPoint {
            x: dx * cos + dy * sin,
            y: -dx * sin + dy * cos,
        }
    }

    /// Compose this pose with another (apply `other` in `self`'s frame).
    #[inline]
    pub fn compose(self, other: Pose2D) -> Self {
        let pos = self.transform_point(other.position());
        Self::new(pos.x, pos.y, self.theta + other.theta)
    }

    /// Compute the inverse of this pose.
    ///
    /// `pose.compose(pose.inverse())` is approximately the identity.
    #[inline]
    pub fn inverse(self) -> Self {
        let (sin, cos) = self.theta.sin_cos();
        Self::new(
            -self.x * cos - self.y * sin,
            self.x * sin - self.y * cos,
            -self.theta,
        )
    }
}

impl std::ops::Mul for Pose2D {
    type Output = Self;

    /// Compose two poses (same as `compose`).
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.compose(rhs)
    }
}
