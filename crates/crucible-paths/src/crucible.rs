use std::collections::BinaryHeap;

use crucible_core::{Cost, Distance};

use crate::state::SearchState;

// ---------------------------------------------------------------------------
// Internal node for the priority-queue search
// ---------------------------------------------------------------------------

/// Distance table entry for one search state.
#[derive(Clone)]
pub(crate) struct Node {
    pub(crate) g: Distance,
    pub(crate) parent: usize,
    pub(crate) generation: u32,
    pub(crate) open: bool,
}

/// `parent` value of seed states.
pub(crate) const NO_PARENT: usize = usize::MAX;

impl Default for Node {
    fn default() -> Self {
        Self {
            g: 0,
            parent: NO_PARENT,
            generation: 0,
            open: false,
        }
    }
}

/// Frontier entry, ordered by `g` for use in `BinaryHeap`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct NodeRef {
    pub(crate) idx: usize,
    pub(crate) g: Distance,
}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse so BinaryHeap (max-heap) pops smallest g first.
        other.g.cmp(&self.g)
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// Crucible
// ---------------------------------------------------------------------------

/// Constrained shortest-path engine.
///
/// `Crucible` owns the distance table and frontier of a search. Every query
/// starts from a logically empty table: stale entries from earlier queries
/// are invalidated by bumping a generation counter rather than by clearing
/// memory, so repeated queries on same-sized grids allocate nothing after
/// the first one.
///
/// Queries take `&mut self`; to run independent queries in parallel, give
/// each thread its own `Crucible`.
#[derive(Default)]
pub struct Crucible {
    pub(crate) nodes: Vec<Node>,
    pub(crate) generation: u32,
    pub(crate) open: BinaryHeap<NodeRef>,
    // scratch buffer for successor queries
    pub(crate) sbuf: Vec<(SearchState, Cost)>,
    pub(crate) expanded: usize,
}

impl Crucible {
    /// Create an engine with empty caches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of states expanded by the last query.
    #[inline]
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    /// Start a new query over `len` states: grow the node table if needed
    /// and move to a fresh generation.
    pub(crate) fn begin(&mut self, len: usize) -> u32 {
        if self.nodes.len() < len {
            self.nodes.resize(len, Node::default());
        }
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // Wrapped: entries stamped with old generations could alias.
            for n in self.nodes.iter_mut() {
                n.generation = 0;
            }
            self.generation = 1;
        }
        self.open.clear();
        self.expanded = 0;
        self.generation
    }
}
