//! Cell occupancy model.
//!
//! Each cell stores a single occupancy byte. Values 0 to 254 form the valid
//! range: low values mean free space, high values mean an obstacle. The
//! byte 255 is a reserved sentinel meaning "never observed" and is never
//! produced by an update, only by tile initialization.
//!
//! Updates are clamped saturating accumulation: a positive delta for a
//! beam hit, a negative delta for a beam passing through, starting from
//! the midpoint prior the first time an unknown cell is written.

use serde::{Deserialize, Serialize};

/// Sentinel byte for a cell that has never been written.
pub const UNKNOWN: u8 = 255;

/// Largest valid occupancy value (fully occupied).
pub const VALUE_MAX: u8 = 254;

/// Smallest valid occupancy value (fully free).
pub const VALUE_MIN: u8 = 0;

/// Prior used when an unknown cell receives its first delta.
pub const PRIOR: u8 = 127;

/// Apply a signed delta to a cell value, clamped to the valid range.
///
/// An unknown cell starts from [`PRIOR`]. The result never wraps and
/// never lands on the [`UNKNOWN`] sentinel.
#[inline]
pub fn apply_delta(value: u8, delta: i16) -> u8 {
    let prior = if value == UNKNOWN { PRIOR } else { value };
    (prior as i32 + delta as i32).clamp(VALUE_MIN as i32, VALUE_MAX as i32) as u8
}

/// Coarse classification of a cell's occupancy value.
///
/// Thresholds come from [`OccupancyConfig`](crate::grid::OccupancyConfig);
/// values between the free and occupied thresholds are `Uncertain`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellClass {
    /// Never observed
    Unknown,
    /// Observed as free space
    Free,
    /// Observed, but not confidently free or occupied
    Uncertain,
    /// Observed as an obstacle
    Occupied,
}

impl CellClass {
    /// Has this cell been observed at all?
    #[inline]
    pub fn is_known(&self) -> bool {
        !matches!(self, CellClass::Unknown)
    }

    /// Is this cell a confirmed obstacle?
    #[inline]
    pub fn is_obstacle(&self) -> bool {
        matches!(self, CellClass::Occupied)
    }

    /// Is this cell confirmed free space?
    #[inline]
    pub fn is_free(&self) -> bool {
        matches!(self, CellClass::Free)
    }
}
