//! Configuration types for the tiled grid.
//!
//! All sections deserialize with per-field defaults, so a YAML file only
//! needs the values it wants to override. Configuration is validated once
//! at engine construction; there is no runtime reconfiguration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::WorldPoint;
use crate::error::GridError;
use crate::grid::cell;

fn default_resolution() -> f32 {
    0.05
}
fn default_tile_side() -> u16 {
    32
}
fn default_capacity() -> usize {
    256
}
fn default_max_range() -> f32 {
    4.0
}
fn default_min_range() -> f32 {
    0.05
}
fn default_hit_delta() -> i16 {
    45
}
fn default_miss_delta() -> i16 {
    -18
}
fn default_occupied_min() -> u8 {
    160
}
fn default_free_max() -> u8 {
    95
}

/// Grid geometry and memory bound
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GridConfig {
    /// Meters per cell (e.g., 0.05 = 5cm cells)
    #[serde(default = "default_resolution")]
    pub resolution: f32,

    /// Cells per tile edge; a tile holds `tile_side * tile_side` cells
    #[serde(default = "default_tile_side")]
    pub tile_side: u16,

    /// Maximum resident tiles; older tiles are evicted past this bound
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// World coordinates of cell (0, 0)'s lowest corner
    #[serde(default)]
    pub origin: WorldPoint,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            tile_side: default_tile_side(),
            capacity: default_capacity(),
            origin: WorldPoint::ZERO,
        }
    }
}

impl GridConfig {
    /// Configuration sized to keep a given area resident.
    ///
    /// The capacity covers `width_m` by `height_m` meters centered on the
    /// world origin; the robot can roam that far before tiles start to
    /// drop out.
    pub fn for_area(width_m: f32, height_m: f32, resolution: f32) -> Self {
        let tile_side = default_tile_side();
        let tile_m = tile_side as f32 * resolution;
        let tiles_x = (width_m / tile_m).ceil().max(1.0) as usize;
        let tiles_y = (height_m / tile_m).ceil().max(1.0) as usize;

        Self {
            resolution,
            tile_side,
            capacity: tiles_x * tiles_y,
            origin: WorldPoint::new(-width_m / 2.0, -height_m / 2.0),
        }
    }

    /// Memory held by one resident tile, in bytes.
    ///
    /// Each cell stores an occupancy byte and an 8-byte write stamp.
    pub fn tile_memory_bytes(&self) -> usize {
        let cells = self.tile_side as usize * self.tile_side as usize;
        cells * 9
    }

    /// Upper bound on cell-plane memory at full capacity, in bytes.
    pub fn max_memory_bytes(&self) -> usize {
        self.capacity * self.tile_memory_bytes()
    }

    /// Check the construction invariants.
    pub fn validate(&self) -> Result<(), GridError> {
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(GridError::InvalidConfig(format!(
                "resolution must be positive and finite, got {}",
                self.resolution
            )));
        }
        if self.tile_side == 0 {
            return Err(GridError::InvalidConfig(
                "tile_side must be at least 1".to_string(),
            ));
        }
        if self.capacity == 0 {
            return Err(GridError::InvalidConfig(
                "capacity must be at least 1".to_string(),
            ));
        }
        if !self.origin.is_finite() {
            return Err(GridError::InvalidConfig(format!(
                "origin must be finite, got ({}, {})",
                self.origin.x, self.origin.y
            )));
        }
        Ok(())
    }
}

/// Range sensor geometry and trust window
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Sensor mounting offset from robot center (x, y) in the robot frame
    #[serde(default)]
    pub sensor_offset: WorldPoint,

    /// Maximum range to trust (meters); longer readings become capped rays
    #[serde(default = "default_max_range")]
    pub max_range: f32,

    /// Minimum range to trust (meters); shorter readings are discarded
    #[serde(default = "default_min_range")]
    pub min_range: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            sensor_offset: WorldPoint::ZERO,
            max_range: default_max_range(),
            min_range: default_min_range(),
        }
    }
}

impl SensorConfig {
    /// Should this reading contribute to the map at all?
    ///
    /// No-return beams (infinite distance) are usable; they still carve
    /// free space out to `max_range`. Readings below `min_range`, NaN
    /// distances, and driver-flagged invalid readings are discarded.
    #[inline]
    pub fn reading_usable(&self, reading: &crate::core::RangeReading) -> bool {
        reading.valid && reading.distance >= self.min_range
    }

    /// Does this reading exceed the trusted range (no confirmed obstacle)?
    #[inline]
    pub fn reading_capped(&self, reading: &crate::core::RangeReading) -> bool {
        !reading.distance.is_finite() || reading.distance >= self.max_range
    }

    /// Check the construction invariants.
    pub fn validate(&self) -> Result<(), GridError> {
        if !(self.max_range.is_finite() && self.max_range > 0.0) {
            return Err(GridError::InvalidConfig(format!(
                "max_range must be positive and finite, got {}",
                self.max_range
            )));
        }
        if !(self.min_range.is_finite() && self.min_range >= 0.0) {
            return Err(GridError::InvalidConfig(format!(
                "min_range must be non-negative and finite, got {}",
                self.min_range
            )));
        }
        if self.min_range >= self.max_range {
            return Err(GridError::InvalidConfig(format!(
                "min_range {} must be below max_range {}",
                self.min_range, self.max_range
            )));
        }
        if !self.sensor_offset.is_finite() {
            return Err(GridError::InvalidConfig(
                "sensor_offset must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Occupancy accumulation deltas and classification thresholds.
///
/// A hit pushes the cell value up by `hit_delta`, a miss pulls it down by
/// `miss_delta`, clamped to the valid byte range. The asymmetry makes
/// obstacles stickier than free space: one stray reflection should not
/// erase a wall the docking approach depends on.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct OccupancyConfig {
    /// Value added when a beam endpoint lands in the cell
    #[serde(default = "default_hit_delta")]
    pub hit_delta: i16,

    /// Value added when a beam passes through the cell (negative)
    #[serde(default = "default_miss_delta")]
    pub miss_delta: i16,

    /// Values at or above this classify as occupied
    #[serde(default = "default_occupied_min")]
    pub occupied_min: u8,

    /// Values at or below this classify as free
    #[serde(default = "default_free_max")]
    pub free_max: u8,
}

impl Default for OccupancyConfig {
    fn default() -> Self {
        Self {
            hit_delta: default_hit_delta(),
            miss_delta: default_miss_delta(),
            occupied_min: default_occupied_min(),
            free_max: default_free_max(),
        }
    }
}

impl OccupancyConfig {
    /// Single-observation updates (default): one hit marks an obstacle.
    pub fn aggressive() -> Self {
        Self::default()
    }

    /// Multi-observation updates: two to three hits to establish an
    /// obstacle, for noisy sensors or cluttered rooms.
    pub fn conservative() -> Self {
        Self {
            hit_delta: 20,
            miss_delta: -8,
            ..Default::default()
        }
    }

    /// Classify a raw cell value against the thresholds.
    #[inline]
    pub fn classify(&self, value: Option<u8>) -> cell::CellClass {
        match value {
            None => cell::CellClass::Unknown,
            Some(v) if v >= self.occupied_min => cell::CellClass::Occupied,
            Some(v) if v <= self.free_max => cell::CellClass::Free,
            Some(_) => cell::CellClass::Uncertain,
        }
    }

    /// Check the construction invariants.
    pub fn validate(&self) -> Result<(), GridError> {
        if self.hit_delta <= 0 {
            return Err(GridError::InvalidConfig(format!(
                "hit_delta must be positive, got {}",
                self.hit_delta
            )));
        }
        if self.miss_delta >= 0 {
            return Err(GridError::InvalidConfig(format!(
                "miss_delta must be negative, got {}",
                self.miss_delta
            )));
        }
        if self.occupied_min > cell::VALUE_MAX {
            return Err(GridError::InvalidConfig(format!(
                "occupied_min {} exceeds the valid value range",
                self.occupied_min
            )));
        }
        if self.free_max >= self.occupied_min {
            return Err(GridError::InvalidConfig(format!(
                "free_max {} must be below occupied_min {}",
                self.free_max, self.occupied_min
            )));
        }
        Ok(())
    }
}

/// Full map configuration
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct MapConfig {
    /// Grid geometry and capacity
    #[serde(default)]
    pub grid: GridConfig,
    /// Sensor geometry and trust window
    #[serde(default)]
    pub sensor: SensorConfig,
    /// Occupancy deltas and thresholds
    #[serde(default)]
    pub occupancy: OccupancyConfig,
}

impl MapConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), GridError> {
        self.grid.validate()?;
        self.sensor.validate()?;
        self.occupancy.validate()
    }

    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&contents)?;
        log::info!(
            "loaded map config from {}: resolution {} m, tile side {}, capacity {}",
            path.display(),
            config.grid.resolution,
            config.grid.tile_side,
            config.grid.capacity
        );
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: MapConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }
}

/// Errors from loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    /// Could not read the file
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// File was not valid YAML for this schema
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Parsed values violate a construction invariant
    #[error(transparent)]
    Invalid(#[from] GridError),
}
