use fpnav_core::{Grid, Point};

use crate::error::SearchError;

/// A search engine answering single-shot path queries.
///
/// Both engines implement it, so callers can pick one at runtime through
/// [`PathfinderConfig`](crate::PathfinderConfig).
pub trait PathFinder {
    /// Cheapest path from `start` to `end`, both included.
    ///
    /// An empty vector means no path was found within the engine's limits.
    /// `start == end` yields `[start]`.
    fn find_path(&mut self, grid: &Grid, start: Point, end: Point)
    -> Result<Vec<Point>, SearchError>;
}
