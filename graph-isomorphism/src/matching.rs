use std::fmt::Display;

use crate::feasibility::feasible;
use crate::graph::Graph;
use crate::state::State;

/// Selects between exact and subgraph matching semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Isomorphism,
    Subisomorphism,
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Whether `g1` and `g2` are isomorphic: a bijection over equally sized
/// graphs that preserves vertex labels, edges and edge labels.
pub fn isomorphism(g1: &Graph, g2: &Graph) -> bool {
    match initial_state(g1, g2, Mode::Isomorphism) {
        Some(state) => solve(g1, g2, &state).is_some(),
        None => false,
    }
}

/// Whether `g1` embeds into `g2`: an injection that preserves vertex
/// labels and maps every query edge onto a label-equal data edge. Extra
/// data edges are permitted.
pub fn subisomorphism(g1: &Graph, g2: &Graph) -> bool {
    match initial_state(g1, g2, Mode::Subisomorphism) {
        Some(state) => solve(g1, g2, &state).is_some(),
        None => false,
    }
}

/// The first mapping discovered in the given mode, as pairs of
/// `(query vertex, data vertex)` in query vertex order.
pub fn find_mapping(g1: &Graph, g2: &Graph, mode: Mode) -> Option<Vec<(usize, usize)>> {
    let state = initial_state(g1, g2, mode)?;
    solve(g1, g2, &state).map(|state| state.mapping().collect())
}

/// Seeds the search, or rejects on vertex and edge counts alone.
fn initial_state(g1: &Graph, g2: &Graph, mode: Mode) -> Option<State> {
    let compatible = match mode {
        Mode::Isomorphism => {
            g1.node_count() == g2.node_count() && g1.edge_count() == g2.edge_count()
        }
        Mode::Subisomorphism => {
            g1.node_count() <= g2.node_count() && g1.edge_count() <= g2.edge_count()
        }
    };

    compatible.then(|| {
        State::new(
            g1.node_count(),
            g2.node_count(),
            mode == Mode::Subisomorphism,
        )
    })
}

/// The backtracking search: tries every feasible candidate pair and
/// recurses on a cloned, extended state. Returns the first complete
/// state. Depth is bounded by the query vertex count, since every
/// accepted pair maps one more query vertex.
fn solve(g1: &Graph, g2: &Graph, state: &State) -> Option<State> {
    if state.is_complete() {
        return Some(state.clone());
    }
    for (n, m) in state.candidate_pairs() {
        if feasible(g1, g2, state, n, m) {
            let mut next = state.clone();
            next.add_pair(
                n,
                m,
                g1.predecessors(n),
                g2.predecessors(m),
                g1.successors(n),
                g2.successors(m),
            );
            let found = solve(g1, g2, &next);
            if found.is_some() {
                return found;
            }
        }
    }
    None
}
