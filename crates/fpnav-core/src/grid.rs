//! The traversal-cost [`Grid`] and its cache form, [`GridSnapshot`].
//!
//! A grid is a dense row-major array of per-cell costs plus the world-space
//! rectangle it covers. Costs are always `>= 1`; [`BLOCKED`] marks a cell as
//! intraversable. Searches only ever borrow a grid immutably, so one grid can
//! serve any number of concurrent queries.

use crate::error::GridError;
use crate::fixed::Fp;
use crate::geom::{Point, Range, Vec3};

/// Cost sentinel of an intraversable cell.
pub const BLOCKED: Fp = Fp::POSITIVE_INFINITY;

/// A rectangular cost map anchored in world space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    dim_x: i32,
    dim_y: i32,
    default_cost: Fp,
    weights: Vec<Fp>,
    origin: Vec3,
    shape: Point,
}

impl Grid {
    /// Create an all-traversable grid with cost one per cell.
    ///
    /// `origin` is the world position of cell `(0, 0)`'s corner and `shape`
    /// the world extent covered by the whole grid on the `x`/`z` plane.
    pub fn new(dim_x: i32, dim_y: i32, origin: Vec3, shape: Point) -> Result<Self, GridError> {
        Self::with_default_cost(dim_x, dim_y, Fp::ONE, origin, shape)
    }

    /// Create an all-traversable grid whose cells cost `default_cost`.
    ///
    /// [`unblock_cell`](Self::unblock_cell) restores this cost.
    pub fn with_default_cost(
        dim_x: i32,
        dim_y: i32,
        default_cost: Fp,
        origin: Vec3,
        shape: Point,
    ) -> Result<Self, GridError> {
        // Row-major indices are computed in `i32`.
        if dim_x <= 0
            || dim_y <= 0
            || i64::from(dim_x) * i64::from(dim_y) > i64::from(i32::MAX)
        {
            return Err(GridError::InvalidDimensions { dim_x, dim_y });
        }
        if shape.x <= 0 || shape.y <= 0 {
            return Err(GridError::InvalidShape(shape));
        }
        if !default_cost.is_finite() || default_cost < Fp::ONE {
            return Err(GridError::InvalidCost(default_cost));
        }
        Ok(Self {
            dim_x,
            dim_y,
            default_cost,
            weights: vec![default_cost; dim_x as usize * dim_y as usize],
            origin,
            shape,
        })
    }

    /// A grid at the world origin where every cell is one world unit wide.
    pub fn unit(dim_x: i32, dim_y: i32) -> Result<Self, GridError> {
        Self::new(dim_x, dim_y, Vec3::ZERO, Point::new(dim_x, dim_y))
    }

    #[inline]
    pub fn dim_x(&self) -> i32 {
        self.dim_x
    }

    #[inline]
    pub fn dim_y(&self) -> i32 {
        self.dim_y
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Always `false`: construction rejects empty grids.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    #[inline]
    pub fn bounds(&self) -> Range {
        Range::new(0, 0, self.dim_x, self.dim_y)
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    #[inline]
    pub fn shape(&self) -> Point {
        self.shape
    }

    #[inline]
    pub fn default_cost(&self) -> Fp {
        self.default_cost
    }

    /// World-space width of one cell.
    pub fn cell_width(&self) -> Fp {
        Fp::from_int(self.shape.x) / Fp::from_int(self.dim_x)
    }

    /// World-space depth of one cell.
    pub fn cell_height(&self) -> Fp {
        Fp::from_int(self.shape.y) / Fp::from_int(self.dim_y)
    }

    // -----------------------------------------------------------------------
    // Indexing
    // -----------------------------------------------------------------------

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.x < self.dim_x && p.y >= 0 && p.y < self.dim_y
    }

    /// Linear offset `y * dim_x + x`, or `None` outside the grid.
    #[inline]
    pub fn index(&self, p: Point) -> Option<usize> {
        self.contains(p).then(|| self.index_unchecked(p))
    }

    /// Linear offset without bounds checking. `p` must lie inside the grid.
    #[inline]
    pub fn index_unchecked(&self, p: Point) -> usize {
        debug_assert!(self.contains(p), "{p} outside grid");
        (p.y * self.dim_x + p.x) as usize
    }

    /// Inverse of [`index`](Self::index).
    #[inline]
    pub fn point(&self, idx: usize) -> Point {
        let w = self.dim_x as usize;
        Point::new((idx % w) as i32, (idx / w) as i32)
    }

    fn checked_index(&self, p: Point) -> Result<usize, GridError> {
        self.index(p).ok_or(GridError::OutOfBounds {
            point: p,
            dim_x: self.dim_x,
            dim_y: self.dim_y,
        })
    }

    // -----------------------------------------------------------------------
    // Costs
    // -----------------------------------------------------------------------

    /// Set the cost of entering `p`. Fails if `cost < 1` or `p` is outside.
    pub fn set_cell_cost(&mut self, p: Point, cost: Fp) -> Result<(), GridError> {
        if cost < Fp::ONE {
            return Err(GridError::InvalidCost(cost));
        }
        let idx = self.checked_index(p)?;
        self.weights[idx] = cost;
        Ok(())
    }

    /// Make `p` intraversable.
    pub fn block_cell(&mut self, p: Point) -> Result<(), GridError> {
        self.set_cell_cost(p, BLOCKED)
    }

    /// Restore `p` to the grid's default cost.
    pub fn unblock_cell(&mut self, p: Point) -> Result<(), GridError> {
        self.set_cell_cost(p, self.default_cost)
    }

    /// Cost of entering `p`; [`BLOCKED`] for intraversable cells.
    pub fn cell_cost(&self, p: Point) -> Result<Fp, GridError> {
        Ok(self.weights[self.checked_index(p)?])
    }

    /// Cost of entering `p` without bounds checking, for hot loops over
    /// pre-validated cells.
    #[inline]
    pub fn cell_cost_unchecked(&self, p: Point) -> Fp {
        self.weights[self.index_unchecked(p)]
    }

    pub fn is_blocked(&self, p: Point) -> Result<bool, GridError> {
        Ok(self.cell_cost(p)? == BLOCKED)
    }

    /// Row-major iterator over every cell and its cost.
    pub fn iter(&self) -> impl Iterator<Item = (Point, Fp)> + '_ {
        self.bounds().iter().zip(self.weights.iter().copied())
    }

    // -----------------------------------------------------------------------
    // World mapping
    // -----------------------------------------------------------------------

    /// Whether the world point lies within the grid's extent (edges included).
    pub fn is_in_area(&self, world: Vec3) -> bool {
        let diff = world - self.origin;
        diff.x >= Fp::ZERO
            && diff.x <= Fp::from_int(self.shape.x)
            && diff.z >= Fp::ZERO
            && diff.z <= Fp::from_int(self.shape.y)
    }

    /// The cell owning a world point.
    ///
    /// Points outside the extent map to `(0, 0)`. Points on the far edges
    /// belong to the last row/column.
    pub fn cell_at(&self, world: Vec3) -> Point {
        if !self.is_in_area(world) {
            return Point::ZERO;
        }
        let rel = world - self.origin;
        let x = (rel.x / self.cell_width()).floor().to_int();
        let y = (rel.z / self.cell_height()).floor().to_int();
        Point::new(x.min(self.dim_x - 1), y.min(self.dim_y - 1))
    }

    /// World-space center of the cell at `p`.
    ///
    /// Accepts `0..=dim` on each axis so the far edge of the grid can be
    /// addressed as a virtual cell.
    pub fn center_point(&self, p: Point) -> Result<Vec3, GridError> {
        if !(0..=self.dim_x).contains(&p.x) || !(0..=self.dim_y).contains(&p.y) {
            return Err(GridError::OutOfBounds {
                point: p,
                dim_x: self.dim_x,
                dim_y: self.dim_y,
            });
        }
        let x = (Fp::from_int(p.x) + Fp::HALF) * self.cell_width();
        let z = (Fp::from_int(p.y) + Fp::HALF) * self.cell_height();
        Ok(Vec3::new(x, Fp::ZERO, z) + self.origin)
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Capture the grid in its cache layout.
    pub fn to_snapshot(&self) -> GridSnapshot {
        let weights = self
            .weights
            .chunks(self.dim_x as usize)
            .map(|row| row.iter().map(|c| c.raw()).collect())
            .collect();
        GridSnapshot {
            weights,
            origin: self.origin.to_raw(),
            shape: self.shape,
        }
    }

    /// Rebuild a grid from its cache layout, validating every cost.
    pub fn from_snapshot(snapshot: &GridSnapshot) -> Result<Self, GridError> {
        let dim_y = snapshot.weights.len();
        let dim_x = snapshot.weights.first().map_or(0, Vec::len);
        let mut grid = Self::new(
            i32::try_from(dim_x).unwrap_or(i32::MAX),
            i32::try_from(dim_y).unwrap_or(i32::MAX),
            Vec3::from_raw(snapshot.origin),
            snapshot.shape,
        )?;
        for (y, row) in snapshot.weights.iter().enumerate() {
            if row.len() != dim_x {
                return Err(GridError::SnapshotMismatch {
                    row: y,
                    len: row.len(),
                    expected: dim_x,
                });
            }
            for (x, &raw) in row.iter().enumerate() {
                grid.set_cell_cost(Point::new(x as i32, y as i32), Fp::from_raw(raw))?;
            }
        }
        log::debug!(
            "loaded {}x{} grid from snapshot, {} blocked cells",
            grid.dim_x,
            grid.dim_y,
            grid.weights.iter().filter(|&&c| c == BLOCKED).count()
        );
        Ok(grid)
    }
}

/// Cache representation of a [`Grid`]: a row-major matrix of raw costs, the
/// raw world origin and the integer world shape.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridSnapshot {
    /// `weights[y][x]` is the raw cost of cell `(x, y)`.
    pub weights: Vec<Vec<i64>>,
    pub origin: [i64; 3],
    pub shape: Point,
}

#[cfg(feature = "serde")]
impl serde::Serialize for Grid {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_snapshot().serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Grid {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let snapshot = GridSnapshot::deserialize(deserializer)?;
        Grid::from_snapshot(&snapshot).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn new_is_all_traversable() {
        let g = Grid::unit(4, 3).unwrap();
        assert_eq!(g.len(), 12);
        assert!(g.iter().all(|(_, c)| c == Fp::ONE));
        assert_eq!(g.index(p(1, 2)), Some(9));
        assert_eq!(g.point(9), p(1, 2));
        assert_eq!(g.index(p(4, 0)), None);
    }

    #[test]
    fn rejects_invalid_construction() {
        assert_eq!(
            Grid::unit(0, 3),
            Err(GridError::InvalidDimensions { dim_x: 0, dim_y: 3 })
        );
        assert_eq!(
            Grid::unit(65536, 65536),
            Err(GridError::InvalidDimensions {
                dim_x: 65536,
                dim_y: 65536
            })
        );
        // 46341^2 is just past i32::MAX.
        assert!(matches!(
            Grid::unit(46341, 46341),
            Err(GridError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            Grid::new(2, 2, Vec3::ZERO, p(0, 4)),
            Err(GridError::InvalidShape(_))
        ));
        assert!(matches!(
            Grid::with_default_cost(2, 2, Fp::HALF, Vec3::ZERO, p(2, 2)),
            Err(GridError::InvalidCost(_))
        ));
    }

    #[test]
    fn set_cell_cost_validates() {
        let mut g = Grid::unit(3, 3).unwrap();
        g.set_cell_cost(p(1, 1), Fp::from_int(5)).unwrap();
        assert_eq!(g.cell_cost(p(1, 1)), Ok(Fp::from_int(5)));
        assert_eq!(
            g.set_cell_cost(p(1, 1), Fp::ZERO),
            Err(GridError::InvalidCost(Fp::ZERO))
        );
        assert_eq!(g.set_cell_cost(p(1, 1), Fp::UNSET), Err(GridError::InvalidCost(Fp::UNSET)));
        assert!(matches!(
            g.set_cell_cost(p(3, 0), Fp::ONE),
            Err(GridError::OutOfBounds { .. })
        ));
        assert!(g.cell_cost(p(-1, 0)).is_err());
    }

    #[test]
    fn block_and_unblock() {
        let mut g = Grid::with_default_cost(3, 3, Fp::TWO, Vec3::ZERO, p(3, 3)).unwrap();
        g.block_cell(p(2, 1)).unwrap();
        assert_eq!(g.is_blocked(p(2, 1)), Ok(true));
        assert_eq!(g.cell_cost_unchecked(p(2, 1)), BLOCKED);
        g.unblock_cell(p(2, 1)).unwrap();
        assert_eq!(g.is_blocked(p(2, 1)), Ok(false));
        assert_eq!(g.cell_cost(p(2, 1)), Ok(Fp::TWO));
    }

    #[test]
    fn world_mapping() {
        // 4x2 cells covering 8x4 world units starting at (10, 0, -4).
        let origin = Vec3::new(Fp::from_int(10), Fp::ZERO, Fp::from_int(-4));
        let g = Grid::new(4, 2, origin, p(8, 4)).unwrap();
        assert_eq!(g.cell_width(), Fp::TWO);
        assert_eq!(g.cell_height(), Fp::TWO);

        let inside = Vec3::new(Fp::from_int(13), Fp::from_int(7), Fp::from_int(-1));
        assert!(g.is_in_area(inside));
        assert_eq!(g.cell_at(inside), p(1, 1));

        let outside = Vec3::new(Fp::from_int(9), Fp::ZERO, Fp::ZERO);
        assert!(!g.is_in_area(outside));
        assert_eq!(g.cell_at(outside), Point::ZERO);

        let far_corner = Vec3::new(Fp::from_int(18), Fp::ZERO, Fp::ZERO);
        assert_eq!(g.cell_at(far_corner), p(3, 1));

        let c = g.center_point(p(1, 1)).unwrap();
        assert_eq!(c, Vec3::new(Fp::from_int(13), Fp::ZERO, Fp::from_int(-1)));
        assert_eq!(g.cell_at(c), p(1, 1));
        assert!(g.center_point(p(4, 2)).is_ok());
        assert!(g.center_point(p(5, 0)).is_err());
    }

    #[test]
    fn snapshot_round_trip() {
        let mut g = Grid::new(3, 2, Vec3::new(Fp::HALF, Fp::ZERO, Fp::ONE), p(6, 4)).unwrap();
        g.block_cell(p(2, 0)).unwrap();
        g.set_cell_cost(p(0, 1), Fp::from_int(3)).unwrap();
        let snap = g.to_snapshot();
        assert_eq!(snap.weights.len(), 2);
        assert_eq!(snap.weights[0][2], BLOCKED.raw());
        assert_eq!(snap.weights[1][0], Fp::from_int(3).raw());
        assert_eq!(Grid::from_snapshot(&snap), Ok(g));
    }

    #[test]
    fn snapshot_rejects_bad_data() {
        let mut snap = Grid::unit(2, 2).unwrap().to_snapshot();
        snap.weights[1].push(Fp::ONE.raw());
        assert_eq!(
            Grid::from_snapshot(&snap),
            Err(GridError::SnapshotMismatch {
                row: 1,
                len: 3,
                expected: 2
            })
        );
        let mut snap = Grid::unit(2, 2).unwrap().to_snapshot();
        snap.weights[0][0] = 0;
        assert!(matches!(
            Grid::from_snapshot(&snap),
            Err(GridError::InvalidCost(_))
        ));
    }
}
