//! Deterministic shortest-path search on [`fpnav_core::Grid`].
//!
//! Two engines share one result contract (a start-to-goal cell sequence, or
//! an empty one when there is no path):
//!
//! - **Array A\*** ([`find_path`], [`ArrayAstar`]) runs a query in one call
//!   over a caller-chosen [`MovementPattern`], with an optional expansion
//!   budget.
//! - **Node-pooled A\*** ([`AstarSearch`]) is a resumable state machine that
//!   expands one node per [`search_step`](AstarSearch::search_step), reuses
//!   its nodes across searches and supports multi-cell agent footprints.
//!
//! All costs are [`Fp`](fpnav_core::Fp) and the frontier breaks ties in
//! insertion order, so identical inputs produce identical paths on every
//! machine.
//!
//! | Engine | Heuristic | Moves |
//! |---|---|---|
//! | [`ArrayAstar`] | [`manhattan`] | any [`MovementPattern`] |
//! | [`AstarSearch`] | [`euclidean`] | eight neighbors, volume-checked |

mod astar;
mod config;
mod distance;
mod error;
mod heap;
mod offset;
mod pool;
mod stepwise;
mod successors;
mod traits;

pub use astar::{ArrayAstar, find_path};
pub use config::{EngineKind, PathfinderConfig, PatternKind};
pub use distance::{euclidean, manhattan, path_cost};
pub use error::{OffsetError, SearchError};
pub use heap::{HeapEntry, MinHeap};
pub use offset::{DIAGONAL_ONLY, FULL, LATERAL_ONLY, MovementPattern, Offset};
pub use stepwise::{AstarSearch, SearchState, Solution};
pub use traits::PathFinder;

#[cfg(test)]
mod tests {
    use super::*;
    use fpnav_core::{Fp, Grid, Point, Vec3};

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    fn pts(v: &[(i32, i32)]) -> Vec<Point> {
        v.iter().map(|&(x, y)| p(x, y)).collect()
    }

    /// 5x5 grid with a wall at x = 2 covering rows 0..=3.
    fn walled() -> Grid {
        let mut g = Grid::unit(5, 5).unwrap();
        for y in 0..4 {
            g.block_cell(p(2, y)).unwrap();
        }
        g
    }

    /// A 16x12 grid with a few walls and expensive patches.
    fn terrain() -> Grid {
        let origin = Vec3::new(Fp::from_int(-8), Fp::ZERO, Fp::from_int(-6));
        let mut g = Grid::new(16, 12, origin, p(32, 24)).unwrap();
        for y in 0..9 {
            g.block_cell(p(5, y)).unwrap();
        }
        for y in 3..12 {
            g.block_cell(p(10, y)).unwrap();
        }
        for x in 11..15 {
            g.set_cell_cost(p(x, 2), Fp::from_int(3)).unwrap();
            g.set_cell_cost(p(x, 3), Fp::from_ratio(5, 2)).unwrap();
        }
        g
    }

    #[test]
    fn equal_cost_ties_resolve_the_same_way() {
        let g = Grid::unit(4, 4).unwrap();
        let lateral = find_path(&g, p(0, 0), p(2, 2), &MovementPattern::lateral_only(), None).unwrap();
        assert_eq!(lateral, pts(&[(0, 0), (1, 0), (2, 0), (2, 1), (2, 2)]));

        let full = find_path(&g, p(0, 0), p(3, 1), &MovementPattern::full(), None).unwrap();
        assert_eq!(full, pts(&[(0, 0), (1, 1), (2, 1), (3, 1)]));

        let mut search = AstarSearch::new(0);
        let pooled = search.pathfind(&g, p(0, 0), p(3, 1)).unwrap();
        assert_eq!(pooled, pts(&[(0, 0), (1, 0), (2, 0), (3, 1)]));
    }

    #[test]
    fn repeated_queries_are_identical() {
        let g = terrain();
        let start = p(0, 11);
        let goal = p(15, 11);
        let full = MovementPattern::full();

        let first = find_path(&g, start, goal, &full, None).unwrap();
        assert!(!first.is_empty());
        for _ in 0..5 {
            assert_eq!(find_path(&g, start, goal, &full, None).unwrap(), first);
        }

        let mut reused = AstarSearch::new(0);
        let pooled = reused.pathfind(&g, start, goal).unwrap();
        assert!(!pooled.is_empty());
        for _ in 0..5 {
            assert_eq!(reused.pathfind(&g, start, goal).unwrap(), pooled);
            assert_eq!(AstarSearch::new(0).pathfind(&g, start, goal).unwrap(), pooled);
        }
    }

    #[test]
    fn snapshot_reload_gives_the_same_paths() {
        let g = terrain();
        let reloaded = Grid::from_snapshot(&g.to_snapshot()).unwrap();
        let full = MovementPattern::full();
        assert_eq!(
            find_path(&g, p(0, 0), p(15, 0), &full, None).unwrap(),
            find_path(&reloaded, p(0, 0), p(15, 0), &full, None).unwrap()
        );
        assert_eq!(
            AstarSearch::new(0).pathfind(&g, p(0, 0), p(15, 0)).unwrap(),
            AstarSearch::new(0).pathfind(&reloaded, p(0, 0), p(15, 0)).unwrap()
        );
    }

    #[test]
    fn engines_agree_on_cost_around_a_wall() {
        let g = walled();
        let expected = Fp::from_raw(4 * Fp::ONE.raw() + 4 * Fp::SQRT_2.raw());

        let array = find_path(&g, p(0, 0), p(4, 0), &MovementPattern::full(), None).unwrap();
        assert_eq!(
            array,
            pts(&[(0, 0), (1, 1), (1, 2), (1, 3), (2, 4), (3, 3), (4, 2), (4, 1), (4, 0)])
        );
        assert_eq!(path_cost(&g, &array), Some(expected));

        let mut search = AstarSearch::new(0);
        search.set_start_and_goal_states(&g, p(0, 0), p(4, 0)).unwrap();
        let mut state = SearchState::Searching;
        while state == SearchState::Searching {
            state = search.search_step(&g).unwrap();
        }
        assert_eq!(state, SearchState::Succeeded);
        assert_eq!(search.step_count(), 17);
        assert_eq!(search.solution_cost(), Ok(expected));
        let pooled: Vec<Point> = search.solution().unwrap().collect();
        assert_eq!(path_cost(&g, &pooled), Some(expected));
        search.free_solution_nodes();
        assert_eq!(search.live_nodes(), 0);
    }

    #[test]
    fn step_budget_spreads_a_search_over_ticks() {
        let g = walled();
        let mut search = AstarSearch::new(0);
        search.initiate_pathfind();
        search.set_start_and_goal_states(&g, p(0, 0), p(4, 0)).unwrap();

        let mut ticks = 0;
        let state = loop {
            ticks += 1;
            let state = search.run_steps(&g, 4).unwrap();
            if state != SearchState::Searching {
                break state;
            }
        };
        assert_eq!(state, SearchState::Succeeded);
        assert_eq!(search.step_count(), 17);
        assert_eq!(ticks, 5);
    }

    #[test]
    fn trait_objects_from_config() {
        let g = walled();
        let mut finders: Vec<Box<dyn PathFinder + Send>> = [EngineKind::Array, EngineKind::Pooled]
            .into_iter()
            .map(|engine| {
                PathfinderConfig {
                    engine,
                    ..Default::default()
                }
                .build()
            })
            .collect();

        let costs: Vec<Option<Fp>> = finders
            .iter_mut()
            .map(|f| {
                let path = f.find_path(&g, p(0, 0), p(4, 0)).unwrap();
                path_cost(&g, &path)
            })
            .collect();
        assert_eq!(costs[0], costs[1]);

        for f in &mut finders {
            assert_eq!(f.find_path(&g, p(3, 3), p(3, 3)).unwrap(), vec![p(3, 3)]);
            assert!(f.find_path(&g, p(0, 0), p(5, 0)).is_err());
        }
    }

    #[test]
    fn world_points_to_path() {
        let g = terrain();
        // Cells are 2x2 world units; the grid starts at (-8, _, -6).
        let from = Vec3::new(Fp::from_int(-7), Fp::from_int(40), Fp::from_int(-5));
        let to = Vec3::new(Fp::from_int(23), Fp::ZERO, Fp::from_int(17));
        let start = g.cell_at(from);
        let goal = g.cell_at(to);
        assert_eq!(start, p(0, 0));
        assert_eq!(goal, p(15, 11));

        let path = find_path(&g, start, goal, &MovementPattern::full(), None).unwrap();
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        let waypoints: Vec<Vec3> = path.iter().map(|&c| g.center_point(c).unwrap()).collect();
        assert_eq!(
            waypoints[0],
            Vec3::new(Fp::from_int(-7), Fp::ZERO, Fp::from_int(-5))
        );
        assert!(waypoints.iter().all(|&w| g.is_in_area(w)));
    }
}

#[cfg(test)]
mod properties {
    use std::cmp::Reverse;
    use std::collections::BinaryHeap;

    use super::*;
    use fpnav_core::{BLOCKED, Fp, Grid, Point};
    use proptest::prelude::*;

    /// Random grid with roughly one blocked cell in five, plus a start and goal.
    fn scenario() -> impl Strategy<Value = (Grid, Point, Point)> {
        (2i32..9, 2i32..9).prop_flat_map(|(w, h)| {
            let cells = prop::collection::vec(
                prop_oneof![1 => Just(None), 4 => (1i32..5).prop_map(Some)],
                (w * h) as usize,
            );
            (cells, 0..w, 0..h, 0..w, 0..h).prop_map(move |(cells, sx, sy, ex, ey)| {
                let mut g = Grid::unit(w, h).unwrap();
                for (i, cost) in cells.into_iter().enumerate() {
                    let pt = g.point(i);
                    match cost {
                        None => g.block_cell(pt).unwrap(),
                        Some(c) => g.set_cell_cost(pt, Fp::from_int(c)).unwrap(),
                    }
                }
                (g, Point::new(sx, sy), Point::new(ex, ey))
            })
        })
    }

    /// Plain Dijkstra over the same step costs the engines use.
    fn reference_cost(grid: &Grid, start: Point, goal: Point, moves: &[Offset]) -> Option<Fp> {
        let mut dist = vec![None; grid.len()];
        let mut heap = BinaryHeap::new();
        let si = grid.index(start)?;
        dist[si] = Some(Fp::ZERO);
        heap.push(Reverse((Fp::ZERO, si)));
        while let Some(Reverse((d, i))) = heap.pop() {
            if dist[i].is_some_and(|best| d > best) {
                continue;
            }
            let cur = grid.point(i);
            if cur == goal {
                return Some(d);
            }
            for &o in moves {
                let next = cur + o;
                let Some(ni) = grid.index(next) else {
                    continue;
                };
                let w = grid.cell_cost(next).unwrap();
                if w == BLOCKED {
                    continue;
                }
                let nd = d + w * o.cost();
                if dist[ni].is_none_or(|best| nd < best) {
                    dist[ni] = Some(nd);
                    heap.push(Reverse((nd, ni)));
                }
            }
        }
        None
    }

    fn assert_valid(grid: &Grid, path: &[Point], start: Point, goal: Point, pattern: &MovementPattern) {
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        for w in path.windows(2) {
            let step = Offset::between(w[0], w[1]).expect("consecutive cells are adjacent");
            assert!(pattern.contains(step), "{step} not allowed");
            assert_ne!(grid.cell_cost(w[1]), Ok(BLOCKED), "entered blocked {}", w[1]);
        }
        // Cost accumulates monotonically along the path.
        let mut acc = Fp::ZERO;
        for i in 1..path.len() {
            let prefix = path_cost(grid, &path[..=i]).unwrap();
            assert!(prefix > acc);
            acc = prefix;
        }
    }

    proptest! {
        #[test]
        fn array_paths_are_valid((grid, start, goal) in scenario()) {
            for pattern in [
                MovementPattern::full(),
                MovementPattern::lateral_only(),
                MovementPattern::diagonal_only(),
            ] {
                let path = find_path(&grid, start, goal, &pattern, None).unwrap();
                let reachable = reference_cost(&grid, start, goal, pattern.offsets()).is_some();
                prop_assert_eq!(!path.is_empty(), reachable);
                if !path.is_empty() {
                    assert_valid(&grid, &path, start, goal, &pattern);
                }
            }
        }

        #[test]
        fn lateral_array_paths_are_optimal((grid, start, goal) in scenario()) {
            let pattern = MovementPattern::lateral_only();
            let path = find_path(&grid, start, goal, &pattern, None).unwrap();
            let expected = reference_cost(&grid, start, goal, pattern.offsets());
            if path.is_empty() {
                prop_assert_eq!(expected, None);
            } else {
                prop_assert_eq!(path_cost(&grid, &path), expected);
            }
        }

        #[test]
        fn pooled_paths_are_optimal((grid, start, goal) in scenario()) {
            let full = MovementPattern::full();
            let mut search = AstarSearch::new(0);
            let path = search.pathfind(&grid, start, goal).unwrap();
            let expected = reference_cost(&grid, start, goal, full.offsets());
            if path.is_empty() {
                prop_assert_eq!(expected, None);
            } else {
                assert_valid(&grid, &path, start, goal, &full);
                prop_assert_eq!(path_cost(&grid, &path), expected);
            }
            prop_assert_eq!(search.live_nodes(), 0);
        }

        #[test]
        fn results_are_reproducible((grid, start, goal) in scenario()) {
            let full = MovementPattern::full();
            let copy = grid.clone();
            prop_assert_eq!(
                find_path(&grid, start, goal, &full, None).unwrap(),
                find_path(&copy, start, goal, &full, None).unwrap()
            );
            let mut a = AstarSearch::new(0);
            let first = a.pathfind(&grid, start, goal).unwrap();
            prop_assert_eq!(a.pathfind(&copy, start, goal).unwrap(), first);
        }

        #[test]
        fn zero_limit_only_answers_trivial_queries((grid, start, goal) in scenario()) {
            let path = find_path(&grid, start, goal, &MovementPattern::full(), Some(0)).unwrap();
            if start == goal {
                prop_assert_eq!(path, vec![start]);
            } else {
                prop_assert!(path.is_empty());
            }
        }
    }
}
