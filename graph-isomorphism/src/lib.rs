/*!
## Graph Isomorphism

A library for matching directed, vertex- and edge-labeled graphs: exact
isomorphism and subgraph isomorphism, built on a backtracking search with
the VF2 feasibility rules.

The algorithm follows

Luigi P. Cordella, Pasquale Foggia, Carlo Sansone, Mario Vento:
A (Sub)Graph Isomorphism Algorithm for Matching Large Graphs.

### License

MIT
*/
pub mod feasibility;
pub mod graph;
pub mod matching;
pub mod state;

use std::io;

pub use crate::graph::{load_graphs, parse_graphs, Graph, GraphBuilder};
pub use crate::matching::{find_mapping, isomorphism, subisomorphism, Mode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("error while reading graph file")]
    ReadGraph {
        #[from]
        source: io::Error,
    },
    #[error("line {line}: unparseable graph line")]
    MalformedLine { line: usize },
    #[error("line {line}: expected vertex id {expected}, found {found}")]
    NonSequentialVertexId {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: vertex {vertex} out of range, graph has {vertices} vertices")]
    VertexOutOfRange {
        line: usize,
        vertex: usize,
        vertices: usize,
    },
    #[error("expected a single graph, found {found}")]
    GraphCount { found: usize },
}
