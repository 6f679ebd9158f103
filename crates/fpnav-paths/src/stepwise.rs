//! Resumable A* driven one expansion at a time.
//!
//! [`AstarSearch`] is a small state machine:
//!
//! ```text
//! NotInitialized --set_start_and_goal_states--> Searching --search_step--> Succeeded | Failed
//! ```
//!
//! Nodes come from a pool owned by the engine and are handed back with
//! [`AstarSearch::free_solution_nodes`], so running many searches on one
//! engine allocates only while the pool grows.

use fpnav_core::{Fp, Grid, Point};

use crate::distance::euclidean;
use crate::error::SearchError;
use crate::heap::MinHeap;
use crate::pool::{NodeId, NodePool};
use crate::successors::{self, Successor};
use crate::traits::PathFinder;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SearchState {
    NotInitialized,
    Searching,
    Succeeded,
    Failed,
}

/// Per-cell bookkeeping: which list the cell's node is on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Slot {
    Unseen,
    Open(NodeId),
    Closed(NodeId),
}

/// Node-pooled, step-wise A* with optional agent footprint ("volume").
///
/// Moves are the eight neighbor offsets; entering a cell costs its weight
/// times the offset cost, and blocked cells are never entered. The heuristic
/// is the Euclidean distance to the goal.
#[derive(Clone, Debug)]
pub struct AstarSearch {
    volume: u16,
    step_limit: Option<u32>,
    state: SearchState,
    pool: NodePool,
    open: MinHeap<NodeId>,
    slots: Vec<Slot>,
    dims: (i32, i32),
    goal: Point,
    start_node: Option<NodeId>,
    goal_node: Option<NodeId>,
    cursor: Option<NodeId>,
    steps: u32,
    cancel_requested: bool,
    successors: Vec<Successor>,
}

impl Default for AstarSearch {
    fn default() -> Self {
        Self::new(0)
    }
}

impl AstarSearch {
    pub fn new(volume: u16) -> Self {
        Self {
            volume,
            step_limit: None,
            state: SearchState::NotInitialized,
            pool: NodePool::new(),
            open: MinHeap::new(),
            slots: Vec::new(),
            dims: (0, 0),
            goal: Point::ZERO,
            start_node: None,
            goal_node: None,
            cursor: None,
            steps: 0,
            cancel_requested: false,
            successors: Vec::with_capacity(8),
        }
    }

    /// Cap the number of steps [`pathfind`](Self::pathfind) may take before
    /// giving up.
    pub fn with_step_limit(mut self, limit: Option<u32>) -> Self {
        self.step_limit = limit;
        self
    }

    #[inline]
    pub fn state(&self) -> SearchState {
        self.state
    }

    #[inline]
    pub fn volume(&self) -> u16 {
        self.volume
    }

    /// Steps taken by the current search.
    #[inline]
    pub fn step_count(&self) -> u32 {
        self.steps
    }

    /// Nodes the pool has ever allocated.
    pub fn pool_capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Nodes currently in use.
    pub fn live_nodes(&self) -> usize {
        self.pool.live()
    }

    // -----------------------------------------------------------------------
    // State machine
    // -----------------------------------------------------------------------

    /// Drop any previous search and return to `NotInitialized`.
    pub fn initiate_pathfind(&mut self) {
        self.free_solution_nodes();
        self.steps = 0;
        self.cancel_requested = false;
    }

    /// Seed the open list with `start`. Only valid while `NotInitialized`.
    pub fn set_start_and_goal_states(
        &mut self,
        grid: &Grid,
        start: Point,
        goal: Point,
    ) -> Result<(), SearchError> {
        if self.state != SearchState::NotInitialized {
            return Err(self.misuse("set_start_and_goal_states"));
        }
        grid.cell_cost(start)?;
        grid.cell_cost(goal)?;

        self.dims = (grid.dim_x(), grid.dim_y());
        self.slots.clear();
        self.slots.resize(grid.len(), Slot::Unseen);
        self.open.clear();
        self.goal = goal;
        self.goal_node = None;
        self.cursor = None;
        self.steps = 0;
        self.cancel_requested = false;

        let id = self.pool.allocate(start);
        let h = euclidean(start, goal);
        let node = self.pool.get_mut(id);
        node.h = h;
        node.f = h;
        self.slots[grid.index_unchecked(start)] = Slot::Open(id);
        self.open.push(h, id);
        self.start_node = Some(id);
        self.state = SearchState::Searching;
        log::debug!("search {start} -> {goal} started, volume {}", self.volume);
        Ok(())
    }

    /// Request that the running search stop. The next
    /// [`search_step`](Self::search_step) frees every node and fails.
    pub fn cancel_search(&mut self) {
        if self.state == SearchState::Searching {
            self.cancel_requested = true;
        }
    }

    /// Expand the best open node.
    ///
    /// Returns the state after the step. Calling this on a finished search
    /// returns the final state again without doing any work.
    pub fn search_step(&mut self, grid: &Grid) -> Result<SearchState, SearchError> {
        match self.state {
            SearchState::NotInitialized => return Err(self.misuse("search_step")),
            SearchState::Succeeded | SearchState::Failed => return Ok(self.state),
            SearchState::Searching => {}
        }
        let actual = (grid.dim_x(), grid.dim_y());
        if actual != self.dims {
            return Err(SearchError::GridMismatch {
                expected: self.dims,
                actual,
            });
        }

        if self.cancel_requested {
            log::debug!("search for {} cancelled after {} steps", self.goal, self.steps);
            self.release_nodes();
            self.state = SearchState::Failed;
            return Ok(self.state);
        }

        self.steps += 1;

        let id = loop {
            let Some(entry) = self.open.pop() else {
                log::debug!("search for {} failed after {} steps", self.goal, self.steps);
                self.state = SearchState::Failed;
                return Ok(self.state);
            };
            let node = self.pool.get(entry.item);
            // Entries left behind by a cheaper re-push no longer match.
            if self.slots[grid.index_unchecked(node.cell)] == Slot::Open(entry.item)
                && entry.expected_cost == node.f
            {
                break entry.item;
            }
        };

        let node = *self.pool.get(id);
        if node.cell == self.goal {
            self.goal_node = Some(id);
            self.link_solution(id);
            self.state = SearchState::Succeeded;
            log::debug!(
                "search for {} succeeded in {} steps, cost {}",
                self.goal,
                self.steps,
                node.g
            );
            return Ok(self.state);
        }

        self.slots[grid.index_unchecked(node.cell)] = Slot::Closed(id);
        log::trace!("expand {} g={} h={} f={}", node.cell, node.g, node.h, node.f);

        let parent_cell = node.parent.map(|p| self.pool.get(p).cell);
        let mut succ = std::mem::take(&mut self.successors);
        successors::generate(grid, node.cell, parent_cell, self.volume, &mut succ);

        for s in &succ {
            let g = node.g + s.cost;
            let si = grid.index_unchecked(s.cell);
            let target = match self.slots[si] {
                Slot::Open(o) | Slot::Closed(o) if self.pool.get(o).g <= g => continue,
                Slot::Open(o) | Slot::Closed(o) => o,
                Slot::Unseen => self.pool.allocate(s.cell),
            };
            let h = euclidean(s.cell, self.goal);
            let n = self.pool.get_mut(target);
            n.parent = Some(id);
            n.g = g;
            n.h = h;
            n.f = g + h;
            let f = n.f;
            self.slots[si] = Slot::Open(target);
            self.open.push(f, target);
        }

        self.successors = succ;
        Ok(SearchState::Searching)
    }

    /// Take up to `budget` steps, stopping early once the search finishes.
    pub fn run_steps(&mut self, grid: &Grid, budget: u32) -> Result<SearchState, SearchError> {
        if self.state == SearchState::NotInitialized {
            return Err(self.misuse("run_steps"));
        }
        let mut state = self.state;
        for _ in 0..budget {
            state = self.search_step(grid)?;
            if state != SearchState::Searching {
                break;
            }
        }
        Ok(state)
    }

    /// Run a whole search and return the path, or an empty vector if there
    /// is none. Nodes are released before returning.
    pub fn pathfind(
        &mut self,
        grid: &Grid,
        start: Point,
        goal: Point,
    ) -> Result<Vec<Point>, SearchError> {
        self.initiate_pathfind();
        self.set_start_and_goal_states(grid, start, goal)?;

        let mut state = SearchState::Searching;
        while state == SearchState::Searching {
            if self.step_limit.is_some_and(|limit| self.steps >= limit) {
                self.cancel_search();
            }
            state = self.search_step(grid)?;
        }

        let path = match state {
            SearchState::Succeeded => self.solution()?.collect(),
            _ => Vec::new(),
        };
        self.free_solution_nodes();
        Ok(path)
    }

    /// Return every node to the pool and go back to `NotInitialized`.
    pub fn free_solution_nodes(&mut self) {
        self.release_nodes();
        self.state = SearchState::NotInitialized;
    }

    fn release_nodes(&mut self) {
        self.pool.release_all();
        self.open.clear();
        self.slots.clear();
        self.start_node = None;
        self.goal_node = None;
        self.cursor = None;
    }

    fn link_solution(&mut self, goal: NodeId) {
        let mut current = goal;
        while let Some(parent) = self.pool.get(current).parent {
            self.pool.get_mut(parent).child = Some(current);
            current = parent;
        }
    }

    fn misuse(&self, operation: &'static str) -> SearchError {
        log::warn!("{operation} called while the search is {:?}", self.state);
        SearchError::InvalidState {
            operation,
            state: self.state,
        }
    }

    // -----------------------------------------------------------------------
    // Solution
    // -----------------------------------------------------------------------

    fn solved(&self, operation: &'static str) -> Result<(NodeId, NodeId), SearchError> {
        match (self.state, self.start_node, self.goal_node) {
            (SearchState::Succeeded, Some(start), Some(goal)) => Ok((start, goal)),
            _ => Err(self.misuse(operation)),
        }
    }

    /// Move the cursor to the first cell of the solution.
    pub fn solution_start(&mut self) -> Result<Point, SearchError> {
        let (start, _) = self.solved("solution_start")?;
        self.cursor = Some(start);
        Ok(self.pool.get(start).cell)
    }

    /// Move the cursor to the last cell of the solution.
    pub fn solution_end(&mut self) -> Result<Point, SearchError> {
        let (_, goal) = self.solved("solution_end")?;
        self.cursor = Some(goal);
        Ok(self.pool.get(goal).cell)
    }

    /// Advance the cursor towards the goal.
    pub fn solution_next(&mut self) -> Option<Point> {
        let next = self.pool.get(self.cursor?).child?;
        self.cursor = Some(next);
        Some(self.pool.get(next).cell)
    }

    /// Move the cursor back towards the start.
    pub fn solution_prev(&mut self) -> Option<Point> {
        let prev = self.pool.get(self.cursor?).parent?;
        self.cursor = Some(prev);
        Some(self.pool.get(prev).cell)
    }

    /// Total cost of the solution.
    pub fn solution_cost(&self) -> Result<Fp, SearchError> {
        let (_, goal) = self.solved("solution_cost")?;
        Ok(self.pool.get(goal).g)
    }

    /// The solution from start to goal, independent of the cursor.
    pub fn solution(&self) -> Result<Solution<'_>, SearchError> {
        let (start, _) = self.solved("solution")?;
        Ok(Solution {
            pool: &self.pool,
            next: Some(start),
        })
    }
}

impl PathFinder for AstarSearch {
    fn find_path(
        &mut self,
        grid: &Grid,
        start: Point,
        end: Point,
    ) -> Result<Vec<Point>, SearchError> {
        self.pathfind(grid, start, end)
    }
}

/// Iterator over the cells of a succeeded search.
#[derive(Clone, Debug)]
pub struct Solution<'a> {
    pool: &'a NodePool,
    next: Option<NodeId>,
}

impl Iterator for Solution<'_> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        let node = self.pool.get(self.next?);
        self.next = node.child;
        Some(node.cell)
    }
}
