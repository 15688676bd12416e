use std::collections::BTreeSet;

/// Marks a vertex without a partner in a core array.
pub const UNMAPPED: usize = usize::MAX;

/// One node of the search tree: a partial injective mapping between a
/// query graph G1 and a data graph G2, plus the frontier sets that the
/// feasibility rules read.
///
/// `core_1[n]` holds the G2 partner of query vertex `n` (or [`UNMAPPED`]),
/// `core_2[m]` the inverse. `in_1`/`out_1` are the unmapped G1 vertices
/// that are predecessors/successors of the mapped set; `in_2`/`out_2` are
/// the G2 analogues. Extending never mutates a parent state; the search
/// clones per accepted pair.
#[derive(Debug, Clone)]
pub struct State {
    subisomorphism: bool,
    core_1: Vec<usize>,
    core_2: Vec<usize>,
    m_1: BTreeSet<usize>,
    m_2: BTreeSet<usize>,
    in_1: BTreeSet<usize>,
    in_2: BTreeSet<usize>,
    out_1: BTreeSet<usize>,
    out_2: BTreeSet<usize>,
}

impl State {
    /// An empty state for a query with `query_count` vertices and a data
    /// graph with `data_count` vertices.
    pub fn new(query_count: usize, data_count: usize, subisomorphism: bool) -> Self {
        State {
            subisomorphism,
            core_1: vec![UNMAPPED; query_count],
            core_2: vec![UNMAPPED; data_count],
            m_1: BTreeSet::new(),
            m_2: BTreeSet::new(),
            in_1: BTreeSet::new(),
            in_2: BTreeSet::new(),
            out_1: BTreeSet::new(),
            out_2: BTreeSet::new(),
        }
    }

    pub fn subisomorphism(&self) -> bool {
        self.subisomorphism
    }

    /// Whether every query vertex is mapped.
    pub fn is_complete(&self) -> bool {
        self.m_1.len() == self.core_1.len()
    }

    pub fn core_1(&self, n: usize) -> usize {
        self.core_1[n]
    }

    pub fn core_2(&self, m: usize) -> usize {
        self.core_2[m]
    }

    pub(crate) fn in_1(&self) -> &BTreeSet<usize> {
        &self.in_1
    }

    pub(crate) fn in_2(&self) -> &BTreeSet<usize> {
        &self.in_2
    }

    pub(crate) fn out_1(&self) -> &BTreeSet<usize> {
        &self.out_1
    }

    pub(crate) fn out_2(&self) -> &BTreeSet<usize> {
        &self.out_2
    }

    /// The mapped pairs in query vertex order. Only meaningful on a
    /// complete state.
    pub fn mapping(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.core_1.iter().enumerate().map(|(n, &m)| (n, m))
    }

    /// Extends the mapping with the accepted pair `(n, m)`.
    ///
    /// `pred1`/`succ1` are the predecessor/successor sets of `n` in G1,
    /// `pred2`/`succ2` those of `m` in G2. Their unmapped members join
    /// the frontiers; `n` and `m` leave them.
    pub fn add_pair(
        &mut self,
        n: usize,
        m: usize,
        pred1: &[usize],
        pred2: &[usize],
        succ1: &[usize],
        succ2: &[usize],
    ) {
        debug_assert_eq!(self.core_1[n], UNMAPPED, "query vertex already mapped");
        debug_assert_eq!(self.core_2[m], UNMAPPED, "data vertex already mapped");

        self.m_1.insert(n);
        self.m_2.insert(m);
        self.core_1[n] = m;
        self.core_2[m] = n;

        for &u in pred1 {
            if self.core_1[u] == UNMAPPED {
                self.in_1.insert(u);
            }
        }
        for &u in pred2 {
            if self.core_2[u] == UNMAPPED {
                self.in_2.insert(u);
            }
        }
        for &u in succ1 {
            if self.core_1[u] == UNMAPPED {
                self.out_1.insert(u);
            }
        }
        for &u in succ2 {
            if self.core_2[u] == UNMAPPED {
                self.out_2.insert(u);
            }
        }

        self.in_1.remove(&n);
        self.in_2.remove(&m);
        self.out_1.remove(&n);
        self.out_2.remove(&m);
    }

    /// The candidate pairs to try from this state, in a deterministic
    /// order. At most one side of each pair varies per call.
    ///
    /// In exact mode the anchor is on the data side: every vertex of the
    /// chosen G1 frontier is paired with the maximum vertex of the
    /// matching G2 frontier (fallback: the maximum unmapped G2 vertex
    /// against all unmapped G1 vertices). A bijection covers every data
    /// vertex, so fixing the partner loses no match.
    ///
    /// In subgraph mode the anchor is on the query side: the minimum
    /// vertex of the chosen G1 frontier is paired with every vertex of
    /// the matching G2 frontier (fallback: the minimum unmapped G1
    /// vertex against all unmapped G2 vertices). An embedding covers
    /// every query vertex and maps frontier vertices into the matching
    /// data frontier, so fixing the anchor loses no match; a data-side
    /// anchor would, since an embedding may leave any given data vertex
    /// out of its image.
    pub fn candidate_pairs(&self) -> Vec<(usize, usize)> {
        if self.subisomorphism {
            self.query_anchored_pairs()
        } else {
            self.data_anchored_pairs()
        }
    }

    fn data_anchored_pairs(&self) -> Vec<(usize, usize)> {
        if !self.out_1.is_empty() {
            if let Some(&partner) = self.out_2.iter().next_back() {
                return self.out_1.iter().map(|&n| (n, partner)).collect();
            }
        }
        if !self.in_1.is_empty() {
            if let Some(&partner) = self.in_2.iter().next_back() {
                return self.in_1.iter().map(|&n| (n, partner)).collect();
            }
        }
        match (0..self.core_2.len())
            .rev()
            .find(|&m| self.core_2[m] == UNMAPPED)
        {
            Some(partner) => (0..self.core_1.len())
                .filter(|&n| self.core_1[n] == UNMAPPED)
                .map(|n| (n, partner))
                .collect(),
            None => Vec::new(),
        }
    }

    fn query_anchored_pairs(&self) -> Vec<(usize, usize)> {
        if !self.out_2.is_empty() {
            if let Some(&anchor) = self.out_1.iter().next() {
                return self.out_2.iter().map(|&m| (anchor, m)).collect();
            }
        }
        if !self.in_2.is_empty() {
            if let Some(&anchor) = self.in_1.iter().next() {
                return self.in_2.iter().map(|&m| (anchor, m)).collect();
            }
        }
        match (0..self.core_1.len()).find(|&n| self.core_1[n] == UNMAPPED) {
            Some(anchor) => (0..self.core_2.len())
                .filter(|&m| self.core_2[m] == UNMAPPED)
                .map(|m| (anchor, m))
                .collect(),
            None => Vec::new(),
        }
    }

    /// The G1 vertices that are neither mapped nor on a frontier.
    pub(crate) fn beyond_frontier_1(&self) -> BTreeSet<usize> {
        beyond_frontier(&self.core_1, &self.in_1, &self.out_1)
    }

    /// The G2 analogue of [`State::beyond_frontier_1`].
    pub(crate) fn beyond_frontier_2(&self) -> BTreeSet<usize> {
        beyond_frontier(&self.core_2, &self.in_2, &self.out_2)
    }
}

fn beyond_frontier(
    core: &[usize],
    in_set: &BTreeSet<usize>,
    out_set: &BTreeSet<usize>,
) -> BTreeSet<usize> {
    (0..core.len())
        .filter(|&v| core[v] == UNMAPPED && !in_set.contains(&v) && !out_set.contains(&v))
        .collect()
}
