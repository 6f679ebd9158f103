use fpnav_core::{Fp, Grid, Point};

use crate::offset::Offset;

/// Manhattan (L1) distance between two cells. Heuristic of the array engine.
#[inline]
pub fn manhattan(a: Point, b: Point) -> Fp {
    Fp::from_int((a.x - b.x).abs()) + Fp::from_int((a.y - b.y).abs())
}

/// Euclidean distance between two cells. Heuristic of the node-pooled engine.
pub fn euclidean(a: Point, b: Point) -> Fp {
    let dx = Fp::from_int(a.x - b.x);
    let dy = Fp::from_int(a.y - b.y);
    (dx * dx + dy * dy).sqrt()
}

/// Total cost of walking `path`: the sum of `cell_cost(target) *
/// offset.cost()` over every step.
///
/// Returns `None` if two consecutive cells are not adjacent or a cell lies
/// outside the grid. An empty or single-cell path costs zero.
pub fn path_cost(grid: &Grid, path: &[Point]) -> Option<Fp> {
    if let Some(&first) = path.first() {
        grid.index(first)?;
    }
    path.windows(2).try_fold(Fp::ZERO, |acc, w| {
        let offset = Offset::between(w[0], w[1])?;
        let cost = grid.cell_cost(w[1]).ok()?;
        Some(acc + cost * offset.cost())
    })
}
