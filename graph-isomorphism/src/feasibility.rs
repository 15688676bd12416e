use std::collections::BTreeSet;

use crate::graph::Graph;
use crate::state::{State, UNMAPPED};

/// Whether extending `state` with the candidate pair `(n, m)` can still
/// lead to a complete match.
///
/// Chains the semantic label rule and the syntactic consistency and
/// look-ahead rules; each one is necessary, so the first failure prunes
/// the branch.
pub fn feasible(g1: &Graph, g2: &Graph, state: &State, n: usize, m: usize) -> bool {
    label_rule(g1, g2, n, m)
        && pred_rule(g1, g2, state, n, m)
        && succ_rule(g1, g2, state, n, m)
        && in_rule(g1, g2, state, n, m)
        && out_rule(g1, g2, state, n, m)
        && new_rule(g1, g2, state, n, m)
}

/// Vertex labels of a matched pair must agree.
fn label_rule(g1: &Graph, g2: &Graph, n: usize, m: usize) -> bool {
    g1.label(n) == g2.label(m)
}

/// Consistency of the mapping over incoming edges.
///
/// Every query edge `u -> n` whose source is mapped (with the candidate
/// pair counting as mapped, so self-loops are covered) needs a
/// label-equal data edge `core(u) -> m`. In exact mode the mirrored
/// check runs from the data side as well; in subgraph mode extra data
/// edges between mapped vertices are allowed.
fn pred_rule(g1: &Graph, g2: &Graph, state: &State, n: usize, m: usize) -> bool {
    for edge in g1.in_edges(n) {
        let source = if edge.node == n { m } else { state.core_1(edge.node) };
        if source == UNMAPPED {
            continue;
        }
        if !g2.has_in_edge(m, source, edge.label) {
            return false;
        }
    }
    if !state.subisomorphism() {
        for edge in g2.in_edges(m) {
            let source = if edge.node == m { n } else { state.core_2(edge.node) };
            if source == UNMAPPED {
                continue;
            }
            if !g1.has_in_edge(n, source, edge.label) {
                return false;
            }
        }
    }
    true
}

/// Consistency of the mapping over outgoing edges; the mirror image of
/// [`pred_rule`].
fn succ_rule(g1: &Graph, g2: &Graph, state: &State, n: usize, m: usize) -> bool {
    for edge in g1.out_edges(n) {
        let target = if edge.node == n { m } else { state.core_1(edge.node) };
        if target == UNMAPPED {
            continue;
        }
        if !g2.has_out_edge(m, target, edge.label) {
            return false;
        }
    }
    if !state.subisomorphism() {
        for edge in g2.out_edges(m) {
            let target = if edge.node == m { n } else { state.core_2(edge.node) };
            if target == UNMAPPED {
                continue;
            }
            if !g1.has_out_edge(n, target, edge.label) {
                return false;
            }
        }
    }
    true
}

/// One-step look-ahead over the "in" frontiers: the candidate's
/// neighborhood inside `in_1` must be matchable inside `in_2`.
fn in_rule(g1: &Graph, g2: &Graph, state: &State, n: usize, m: usize) -> bool {
    let succ_1 = intersection_size(state.in_1(), g1.successors(n));
    let succ_2 = intersection_size(state.in_2(), g2.successors(m));
    if !counts_compatible(state.subisomorphism(), succ_1, succ_2) {
        return false;
    }
    let pred_1 = intersection_size(state.in_1(), g1.predecessors(n));
    let pred_2 = intersection_size(state.in_2(), g2.predecessors(m));
    counts_compatible(state.subisomorphism(), pred_1, pred_2)
}

/// One-step look-ahead over the "out" frontiers.
fn out_rule(g1: &Graph, g2: &Graph, state: &State, n: usize, m: usize) -> bool {
    let succ_1 = intersection_size(state.out_1(), g1.successors(n));
    let succ_2 = intersection_size(state.out_2(), g2.successors(m));
    if !counts_compatible(state.subisomorphism(), succ_1, succ_2) {
        return false;
    }
    let pred_1 = intersection_size(state.out_1(), g1.predecessors(n));
    let pred_2 = intersection_size(state.out_2(), g2.predecessors(m));
    counts_compatible(state.subisomorphism(), pred_1, pred_2)
}

/// Two-step look-ahead over the region beyond the frontiers.
///
/// In exact mode both sides count neighbors that are neither mapped nor
/// on a frontier. In subgraph mode an extra data edge can pull an
/// unmapped data vertex onto a data frontier with no query counterpart,
/// so the data side counts all unmapped neighbors instead.
fn new_rule(g1: &Graph, g2: &Graph, state: &State, n: usize, m: usize) -> bool {
    let beyond_1 = state.beyond_frontier_1();
    let pred_1 = intersection_size(&beyond_1, g1.predecessors(n));
    let succ_1 = intersection_size(&beyond_1, g1.successors(n));

    let (pred_2, succ_2) = if state.subisomorphism() {
        (
            unmapped_count(state, g2.predecessors(m)),
            unmapped_count(state, g2.successors(m)),
        )
    } else {
        let beyond_2 = state.beyond_frontier_2();
        (
            intersection_size(&beyond_2, g2.predecessors(m)),
            intersection_size(&beyond_2, g2.successors(m)),
        )
    };

    counts_compatible(state.subisomorphism(), pred_1, pred_2)
        && counts_compatible(state.subisomorphism(), succ_1, succ_2)
}

/// Exact isomorphism needs equal neighborhood counts; a subgraph
/// embedding only needs enough room on the data side.
fn counts_compatible(subisomorphism: bool, query_count: usize, data_count: usize) -> bool {
    if subisomorphism {
        query_count <= data_count
    } else {
        query_count == data_count
    }
}

fn intersection_size(set: &BTreeSet<usize>, nodes: &[usize]) -> usize {
    nodes.iter().filter(|node| set.contains(node)).count()
}

fn unmapped_count(state: &State, nodes: &[usize]) -> usize {
    nodes.iter().filter(|&&node| state.core_2(node) == UNMAPPED).count()
}
