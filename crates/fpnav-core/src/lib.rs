//! **fpnav-core**: deterministic numeric and grid types for lockstep
//! pathfinding.
//!
//! This crate provides the data model shared by every search engine in the
//! *fpnav* workspace: the [`Fp`] fixed-point scalar, cell and world geometry,
//! and the traversal-cost [`Grid`]. Nothing here touches floating point, so
//! every participant of a lockstep simulation computes bit-identical results.

pub mod error;
pub mod fixed;
pub mod geom;
pub mod grid;

pub use error::GridError;
pub use fixed::Fp;
pub use geom::{Point, Range, RangeIter, Vec3};
pub use grid::{BLOCKED, Grid, GridSnapshot};
