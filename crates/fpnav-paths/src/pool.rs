//! Arena of search nodes reused across searches.

use fpnav_core::{Fp, Point};

/// Index of a [`SearchNode`] inside a [`NodePool`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(usize);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct SearchNode {
    pub parent: Option<NodeId>,
    /// Only set along the solution chain once a search succeeds.
    pub child: Option<NodeId>,
    pub g: Fp,
    pub h: Fp,
    pub f: Fp,
    pub cell: Point,
}

impl SearchNode {
    fn fresh(cell: Point) -> Self {
        Self {
            parent: None,
            child: None,
            g: Fp::ZERO,
            h: Fp::ZERO,
            f: Fp::ZERO,
            cell,
        }
    }
}

/// Nodes are never dropped individually: a search releases the whole pool at
/// once and the storage is handed out again on the next search.
#[derive(Clone, Debug, Default)]
pub(crate) struct NodePool {
    nodes: Vec<SearchNode>,
    free: Vec<NodeId>,
}

impl NodePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, cell: Point) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = SearchNode::fresh(cell);
                id
            }
            None => {
                self.nodes.push(SearchNode::fresh(cell));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    /// Return every node to the free list. Lower ids are handed out first, so
    /// a repeated search allocates exactly the same ids.
    pub fn release_all(&mut self) {
        self.free.clear();
        self.free.extend((0..self.nodes.len()).rev().map(NodeId));
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.0]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id.0]
    }

    /// Nodes ever allocated, live or free.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    pub fn live(&self) -> usize {
        self.nodes.len() - self.free.len()
    }
}
