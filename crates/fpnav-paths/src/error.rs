use fpnav_core::GridError;
use thiserror::Error;

use crate::offset::Offset;
use crate::stepwise::SearchState;

/// Errors raised when building an [`Offset`] or a
/// [`MovementPattern`](crate::MovementPattern).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OffsetError {
    #[error("offset ({x}, {y}) has a component with a magnitude larger than one")]
    TooLarge { x: i32, y: i32 },

    #[error("offset components cannot both be zero")]
    Zero,

    #[error("movement pattern must contain at least one offset")]
    EmptyPattern,

    #[error("{0} appears more than once in the movement pattern")]
    Duplicate(Offset),
}

/// Errors raised by the search engines.
///
/// "No path" and "iteration limit reached" are not errors: they are reported
/// as an empty path or [`SearchState::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("{operation} is not allowed while the search is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: SearchState,
    },

    #[error("search started on a {}x{} grid but was given a {}x{} grid", expected.0, expected.1, actual.0, actual.1)]
    GridMismatch {
        expected: (i32, i32),
        actual: (i32, i32),
    },
}
