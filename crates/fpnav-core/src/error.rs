use thiserror::Error;

use crate::fixed::Fp;
use crate::geom::Point;

/// Errors raised when a [`Grid`](crate::Grid) is built or accessed with
/// invalid arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid dimensions {dim_x}x{dim_y} must be positive and hold at most i32::MAX cells")]
    InvalidDimensions { dim_x: i32, dim_y: i32 },

    #[error("world shape {0} must be positive on both axes")]
    InvalidShape(Point),

    #[error("cell cost {0} is invalid, the cost of traversing a cell cannot be less than one")]
    InvalidCost(Fp),

    #[error("cell {point} is outside the grid [0, {dim_x}) x [0, {dim_y})")]
    OutOfBounds { point: Point, dim_x: i32, dim_y: i32 },

    #[error("snapshot row {row} has {len} cells, expected {expected}")]
    SnapshotMismatch {
        row: usize,
        len: usize,
        expected: usize,
    },
}
