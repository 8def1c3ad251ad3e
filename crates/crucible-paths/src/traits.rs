use crucible_core::Cost;

use crate::state::SearchState;

/// Move rules over the augmented (position, heading, run) state space.
///
/// The relaxation loop only ever asks these two questions, so any rule set
/// expressible as a successor function and a goal test can be searched.
pub trait StatePather {
    /// Append the legal successors of `s`, each with the cost of entering
    /// its cell, into `buf`. The caller clears `buf` before calling.
    fn successors(&self, s: SearchState, buf: &mut Vec<(SearchState, Cost)>);

    /// Whether a path may end in state `s`.
    fn is_terminal(&self, s: SearchState) -> bool;
}
