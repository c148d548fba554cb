//! Error types for the grid engine.

/// Result type alias
pub type Result<T> = std::result::Result<T, GridError>;

/// Grid engine error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// Configuration rejected at construction time
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Tile-local coordinate outside the tile footprint.
    ///
    /// This is a programming-contract violation, not a runtime condition:
    /// the tile store derives local coordinates by Euclidean remainder and
    /// always stays in range. It can only appear when a tile is indexed
    /// directly with a bad coordinate.
    #[error("local cell ({x}, {y}) outside tile of side {side}")]
    OutOfBounds {
        /// Local column that was requested
        x: i32,
        /// Local row that was requested
        y: i32,
        /// Tile side length in cells
        side: u16,
    },
}
