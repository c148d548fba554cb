//! Integer line traversal for ray updates.
//!
//! Sensor beams become lines of grid cells: intermediate cells carve free
//! space, the terminal cell takes the obstacle mark. Bresenham's
//! algorithm walks that line in pure integer arithmetic:
//!
//! ```text
//! From (0,0) to (7,3):
//!
//!     3 │        ●
//!     2 │     ●●
//!     1 │  ●●
//!     0 ●●
//!       └──────────
//!        0 1 2 3 4 5 6 7
//! ```
//!
//! The cell sequence is fully determined by the two endpoints: no
//! floating point, no gaps, same cells in the same order on every run.
//! That determinism is what makes repeated scans of a static wall
//! converge instead of flickering.

use crate::core::GridCoord;

/// Bresenham line iterator over grid cells.
///
/// Yields every cell from `start` to `end` inclusive. A degenerate line
/// (`start == end`) yields that single cell.
pub struct BresenhamLine {
    x: i32,
    y: i32,
    dx: i64,
    dy: i64,
    x_inc: i32,
    y_inc: i32,
    error: i64,
    steep: bool,
    end_x: i32,
    end_y: i32,
    done: bool,
}

impl BresenhamLine {
    /// Line iterator from `start` to `end` in grid coordinates.
    ///
    /// Differences widen to i64, so any pair of i32 endpoints is valid.
    pub fn new(start: GridCoord, end: GridCoord) -> Self {
        let dx = (end.x as i64 - start.x as i64).abs();
        let dy = (end.y as i64 - start.y as i64).abs();
        let steep = dy > dx;

        // Drive the iteration along the major axis
        let (x, y, end_x, end_y, dx, dy) = if steep {
            (start.y, start.x, end.y, end.x, dy, dx)
        } else {
            (start.x, start.y, end.x, end.y, dx, dy)
        };

        let x_inc = if end_x > x { 1 } else { -1 };
        let y_inc = if end_y > y { 1 } else { -1 };

        Self {
            x,
            y,
            dx,
            dy,
            x_inc,
            y_inc,
            error: dx / 2,
            steep,
            end_x,
            end_y,
            done: false,
        }
    }
}

impl Iterator for BresenhamLine {
    type Item = GridCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = if self.steep {
            GridCoord::new(self.y, self.x)
        } else {
            GridCoord::new(self.x, self.y)
        };

        if self.x == self.end_x && self.y == self.end_y {
            self.done = true;
            return Some(result);
        }

        self.error -= self.dy;
        if self.error < 0 {
            self.y += self.y_inc;
            self.error += self.dx;
        }
        self.x += self.x_inc;

        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            // x runs along the major axis, one cell per step
            let remaining = (self.end_x as i64 - self.x as i64).abs() as usize + 1;
            (remaining, Some(remaining))
        }
    }
}

impl ExactSizeIterator for BresenhamLine {}

/// Collect the full cell sequence of a line.
pub fn cells_along_ray(start: GridCoord, end: GridCoord) -> Vec<GridCoord> {
    BresenhamLine::new(start, end).collect()
}
