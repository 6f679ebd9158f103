use fpnav_core::{BLOCKED, Fp, Grid, Point};

use crate::distance::manhattan;
use crate::error::SearchError;
use crate::heap::{HeapEntry, MinHeap};
use crate::offset::MovementPattern;
use crate::traits::PathFinder;

const NO_PARENT: usize = usize::MAX;

/// Compute the cheapest path from `start` to `end` using A* over the moves in
/// `pattern`.
///
/// Returns the full path (both endpoints included), or an empty vector if
/// `end` is unreachable or `iteration_limit` entries were taken off the
/// frontier without reaching it. Fails only if `start` or `end` lies outside
/// the grid.
pub fn find_path(
    grid: &Grid,
    start: Point,
    end: Point,
    pattern: &MovementPattern,
    iteration_limit: Option<u32>,
) -> Result<Vec<Point>, SearchError> {
    grid.cell_cost(start)?;
    grid.cell_cost(end)?;

    if start == end {
        return Ok(vec![start]);
    }

    let start_idx = grid.index_unchecked(start);
    let end_idx = grid.index_unchecked(end);

    let mut cost_so_far = vec![Fp::UNSET; grid.len()];
    let mut came_from = vec![NO_PARENT; grid.len()];
    cost_so_far[start_idx] = Fp::ZERO;

    let mut open = MinHeap::new();
    open.push(manhattan(start, end), start_idx);

    let mut budget = iteration_limit;
    let mut iterations = 0u32;

    loop {
        if budget == Some(0) {
            log::debug!("A* {start} -> {end}: iteration limit reached after {iterations} iterations");
            return Ok(Vec::new());
        }
        let Some(HeapEntry {
            item: ci,
            expected_cost,
        }) = open.pop()
        else {
            log::debug!("A* {start} -> {end}: no path after {iterations} iterations");
            return Ok(Vec::new());
        };

        let current = grid.point(ci);
        let g = cost_so_far[ci];

        if ci == end_idx {
            let path = reconstruct(grid, &came_from, end_idx);
            log::debug!(
                "A* {start} -> {end}: {} cells, cost {g}, {iterations} iterations",
                path.len()
            );
            return Ok(path);
        }

        // Every pop short of the goal is charged, stale or not.
        if let Some(b) = budget.as_mut() {
            *b -= 1;
        }
        iterations += 1;

        // The cell was pushed again at a lower cost since this entry.
        if expected_cost > g + manhattan(current, end) {
            continue;
        }

        log::trace!("expand {current} g={g}");

        for &offset in pattern {
            let next = current + offset;
            let Some(ni) = grid.index(next) else {
                continue;
            };
            let weight = grid.cell_cost_unchecked(next);
            if weight == BLOCKED {
                continue;
            }
            let new_cost = g + weight * offset.cost();
            let old = cost_so_far[ni];
            if old.is_unset() || new_cost < old {
                cost_so_far[ni] = new_cost;
                came_from[ni] = ci;
                open.push(new_cost + manhattan(next, end), ni);
            }
        }
    }
}

fn reconstruct(grid: &Grid, came_from: &[usize], end_idx: usize) -> Vec<Point> {
    let mut path = Vec::new();
    let mut ci = end_idx;
    while ci != NO_PARENT {
        path.push(grid.point(ci));
        ci = came_from[ci];
    }
    path.reverse();
    path
}

/// Single-shot array-based engine: a movement pattern and an optional
/// iteration budget applied to every query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArrayAstar {
    pub pattern: MovementPattern,
    pub iteration_limit: Option<u32>,
}

impl ArrayAstar {
    pub fn new(pattern: MovementPattern) -> Self {
        Self {
            pattern,
            iteration_limit: None,
        }
    }

    pub fn with_iteration_limit(mut self, limit: Option<u32>) -> Self {
        self.iteration_limit = limit;
        self
    }
}

impl PathFinder for ArrayAstar {
    fn find_path(
        &mut self,
        grid: &Grid,
        start: Point,
        end: Point,
    ) -> Result<Vec<Point>, SearchError> {
        find_path(grid, start, end, &self.pattern, self.iteration_limit)
    }
}
