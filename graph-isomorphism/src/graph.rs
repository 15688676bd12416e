use atoi::FromRadix10;
use std::{convert::TryFrom, fmt::Display, fs::File, io::Read, path::Path, str::FromStr};

use linereader::LineReader;

use crate::Error;

/// One endpoint of a directed edge together with the edge label.
///
/// Appears in `out_edges` with the target as `node` and in `in_edges`
/// with the source as `node`. Ordering is by node first, then label,
/// which makes labeled membership a binary search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Neighbor {
    pub node: usize,
    pub label: usize,
}

/// An immutable directed multigraph with integer vertex and edge labels.
///
/// Vertex ids are dense in `[0, node_count)`. Parallel edges and
/// self-loops are allowed. Adjacency is stored twice: once per direction
/// with edge labels for bulk enumeration, and once per direction as
/// unique sorted vertex sets for membership tests.
pub struct Graph {
    labels: Box<[usize]>,
    edge_count: usize,
    out_offsets: Box<[usize]>,
    out_edges: Box<[Neighbor]>,
    in_offsets: Box<[usize]>,
    in_edges: Box<[Neighbor]>,
    succ_offsets: Box<[usize]>,
    succ_nodes: Box<[usize]>,
    pred_offsets: Box<[usize]>,
    pred_nodes: Box<[usize]>,
}

impl Graph {
    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn label(&self, node: usize) -> usize {
        self.labels[node]
    }

    /// All outgoing edges of `source`, sorted by target, then edge label.
    pub fn out_edges(&self, source: usize) -> &[Neighbor] {
        let from = self.out_offsets[source];
        let to = self.out_offsets[source + 1];
        &self.out_edges[from..to]
    }

    /// All incoming edges of `target`, sorted by source, then edge label.
    pub fn in_edges(&self, target: usize) -> &[Neighbor] {
        let from = self.in_offsets[target];
        let to = self.in_offsets[target + 1];
        &self.in_edges[from..to]
    }

    /// The unique targets of outgoing edges of `source`, sorted.
    pub fn successors(&self, source: usize) -> &[usize] {
        let from = self.succ_offsets[source];
        let to = self.succ_offsets[source + 1];
        &self.succ_nodes[from..to]
    }

    /// The unique sources of incoming edges of `target`, sorted.
    pub fn predecessors(&self, target: usize) -> &[usize] {
        let from = self.pred_offsets[target];
        let to = self.pred_offsets[target + 1];
        &self.pred_nodes[from..to]
    }

    pub fn has_successor(&self, source: usize, target: usize) -> bool {
        self.successors(source).binary_search(&target).is_ok()
    }

    pub fn has_predecessor(&self, target: usize, source: usize) -> bool {
        self.predecessors(target).binary_search(&source).is_ok()
    }

    /// Whether an edge `source -> target` with the given label exists.
    pub fn has_out_edge(&self, source: usize, target: usize, label: usize) -> bool {
        self.out_edges(source)
            .binary_search(&Neighbor { node: target, label })
            .is_ok()
    }

    /// Whether an edge `source -> target` with the given label exists,
    /// looked up from the target side.
    pub fn has_in_edge(&self, target: usize, source: usize, label: usize) -> bool {
        self.in_edges(target)
            .binary_search(&Neighbor { node: source, label })
            .is_ok()
    }
}

impl Display for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "|V|: {}, |E|: {}", self.node_count(), self.edge_count())
    }
}

/// Accumulates vertices and edges and turns them into a [`Graph`].
///
/// Endpoint validation happens in the parser; calling `add_edge` with an
/// endpoint that was never added is a logic error.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    labels: Vec<usize>,
    edges: Vec<(usize, usize, usize)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one vertex and returns its id.
    pub fn add_vertex(&mut self, label: usize) -> usize {
        self.labels.push(label);
        self.labels.len() - 1
    }

    pub fn add_edge(&mut self, source: usize, target: usize, label: usize) {
        self.edges.push((source, target, label));
    }

    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    pub fn build(self) -> Graph {
        let GraphBuilder { labels, edges } = self;
        let node_count = labels.len();
        let edge_count = edges.len();

        for (source, target, _) in &edges {
            debug_assert!(*source < node_count, "edge source out of range");
            debug_assert!(*target < node_count, "edge target out of range");
        }

        let (out_offsets, out_edges) =
            adjacency(node_count, edges.iter().map(|&(u, v, l)| (u, v, l)));
        let (in_offsets, in_edges) =
            adjacency(node_count, edges.iter().map(|&(u, v, l)| (v, u, l)));

        let (succ_offsets, succ_nodes) = unique_nodes(node_count, &out_offsets, &out_edges);
        let (pred_offsets, pred_nodes) = unique_nodes(node_count, &in_offsets, &in_edges);

        Graph {
            labels: labels.into_boxed_slice(),
            edge_count,
            out_offsets: out_offsets.into_boxed_slice(),
            out_edges: out_edges.into_boxed_slice(),
            in_offsets: in_offsets.into_boxed_slice(),
            in_edges: in_edges.into_boxed_slice(),
            succ_offsets: succ_offsets.into_boxed_slice(),
            succ_nodes: succ_nodes.into_boxed_slice(),
            pred_offsets: pred_offsets.into_boxed_slice(),
            pred_nodes: pred_nodes.into_boxed_slice(),
        }
    }
}

/// Builds one CSR direction from `(node, endpoint, label)` triples.
fn adjacency(
    node_count: usize,
    edges: impl Iterator<Item = (usize, usize, usize)> + Clone,
) -> (Vec<usize>, Vec<Neighbor>) {
    let mut degrees = vec![0_usize; node_count];
    for (node, _, _) in edges.clone() {
        degrees[node] += 1;
    }

    let mut offsets = Vec::with_capacity(node_count + 1);
    offsets.push(0);
    for node in 0..node_count {
        offsets.push(offsets[node] + degrees[node]);
    }

    let mut neighbors = vec![Neighbor { node: 0, label: 0 }; offsets[node_count]];
    // stores the next offset to insert for each node
    let mut next_offset = vec![0_usize; node_count];
    for (node, endpoint, label) in edges {
        neighbors[offsets[node] + next_offset[node]] = Neighbor {
            node: endpoint,
            label,
        };
        next_offset[node] += 1;
    }

    // sort adjacency lists
    for node in 0..node_count {
        neighbors[offsets[node]..offsets[node + 1]].sort_unstable();
    }

    (offsets, neighbors)
}

/// Deduplicates a sorted labeled adjacency into unique vertex sets.
fn unique_nodes(
    node_count: usize,
    offsets: &[usize],
    neighbors: &[Neighbor],
) -> (Vec<usize>, Vec<usize>) {
    let mut set_offsets = Vec::with_capacity(node_count + 1);
    set_offsets.push(0);
    let mut nodes = Vec::new();

    for node in 0..node_count {
        let mut previous = None;
        for neighbor in &neighbors[offsets[node]..offsets[node + 1]] {
            if previous != Some(neighbor.node) {
                nodes.push(neighbor.node);
                previous = Some(neighbor.node);
            }
        }
        set_offsets.push(nodes.len());
    }

    (set_offsets, nodes)
}

struct ParseGraphs {
    graphs: Vec<Graph>,
}

impl<R> TryFrom<LineReader<R>> for ParseGraphs
where
    R: Read,
{
    type Error = Error;

    fn try_from(mut lines: LineReader<R>) -> Result<Self, Error> {
        let mut graphs = Vec::new();
        let mut builder = GraphBuilder::new();
        let mut line_number = 0;

        while let Some(line) = lines.next_line() {
            let line = line?;
            line_number += 1;

            let line = trim_line_ending(line);
            if line.is_empty() {
                continue;
            }

            match line[0] {
                b't' => {
                    let gid = graph_id(&line[1..], line_number)?;
                    // A leading `t # 0` opens the first graph; every other
                    // `t` line flushes the graph accumulated so far. The
                    // final sentinel `t #` flushes the last graph.
                    if gid != Some(0) {
                        graphs.push(std::mem::take(&mut builder).build());
                    }
                }
                b'v' => {
                    let (vertex, rest) = split_int(&line[1..], line_number)?;
                    let (label, _) = split_int(rest, line_number)?;
                    if vertex != builder.node_count() {
                        return Err(Error::NonSequentialVertexId {
                            line: line_number,
                            expected: builder.node_count(),
                            found: vertex,
                        });
                    }
                    builder.add_vertex(label);
                }
                b'e' => {
                    let (source, rest) = split_int(&line[1..], line_number)?;
                    let (target, rest) = split_int(rest, line_number)?;
                    let (label, _) = split_int(rest, line_number)?;
                    let node_count = builder.node_count();
                    for endpoint in [source, target] {
                        if endpoint >= node_count {
                            return Err(Error::VertexOutOfRange {
                                line: line_number,
                                vertex: endpoint,
                                vertices: node_count,
                            });
                        }
                    }
                    builder.add_edge(source, target, label);
                }
                _ => return Err(Error::MalformedLine { line: line_number }),
            }
        }

        Ok(ParseGraphs { graphs })
    }
}

fn trim_line_ending(mut line: &[u8]) -> &[u8] {
    while let [rest @ .., b'\n' | b'\r'] = line {
        line = rest;
    }
    line
}

/// Parses the remainder of a `t` line: `# <gid>` with the gid optional.
fn graph_id(bytes: &[u8], line: usize) -> Result<Option<usize>, Error> {
    let bytes = match skip_spaces(bytes) {
        [b'#', rest @ ..] => skip_spaces(rest),
        _ => return Err(Error::MalformedLine { line }),
    };
    if bytes.is_empty() {
        return Ok(None);
    }
    let (gid, used) = usize::from_radix_10(bytes);
    if used == 0 {
        return Err(Error::MalformedLine { line });
    }
    Ok(Some(gid))
}

/// Scans one unsigned integer, skipping leading spaces.
fn split_int(bytes: &[u8], line: usize) -> Result<(usize, &[u8]), Error> {
    let bytes = skip_spaces(bytes);
    let (value, used) = usize::from_radix_10(bytes);
    if used == 0 {
        return Err(Error::MalformedLine { line });
    }
    Ok((value, &bytes[used..]))
}

fn skip_spaces(mut bytes: &[u8]) -> &[u8] {
    while let [b' ', rest @ ..] = bytes {
        bytes = rest;
    }
    bytes
}

/// Reads every graph in a database file.
pub fn load_graphs(path: &Path) -> Result<Vec<Graph>, Error> {
    let file = File::open(path)?;
    parse_graphs(file)
}

/// Reads every graph from a reader in the line-oriented text format.
pub fn parse_graphs(reader: impl Read) -> Result<Vec<Graph>, Error> {
    Ok(ParseGraphs::try_from(LineReader::new(reader))?.graphs)
}

impl FromStr for Graph {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Error> {
        let mut graphs = parse_graphs(input.as_bytes())?;
        if graphs.len() != 1 {
            return Err(Error::GraphCount {
                found: graphs.len(),
            });
        }
        Ok(graphs.remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trim_margin::MarginTrimmable;

    fn graph(input: &str) -> Graph {
        input.trim_margin().unwrap().parse::<Graph>().unwrap()
    }

    #[test]
    fn read_from_slice() {
        let graph = graph(
            "
            |t # 0
            |v 0 10
            |v 1 11
            |v 2 12
            |v 3 11
            |e 0 1 5
            |e 0 2 5
            |e 1 2 6
            |e 3 1 5
            |t #
            |",
        );

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 4);

        assert_eq!(graph.label(0), 10);
        assert_eq!(graph.label(1), 11);
        assert_eq!(graph.label(2), 12);
        assert_eq!(graph.label(3), 11);

        assert_eq!(
            graph.out_edges(0),
            &[
                Neighbor { node: 1, label: 5 },
                Neighbor { node: 2, label: 5 }
            ]
        );
        assert_eq!(graph.out_edges(1), &[Neighbor { node: 2, label: 6 }]);
        assert_eq!(graph.out_edges(2), &[]);
        assert_eq!(graph.out_edges(3), &[Neighbor { node: 1, label: 5 }]);

        assert_eq!(
            graph.in_edges(1),
            &[
                Neighbor { node: 0, label: 5 },
                Neighbor { node: 3, label: 5 }
            ]
        );
        assert_eq!(
            graph.in_edges(2),
            &[
                Neighbor { node: 0, label: 5 },
                Neighbor { node: 1, label: 6 }
            ]
        );

        assert_eq!(graph.successors(0), &[1, 2]);
        assert_eq!(graph.successors(2), &[]);
        assert_eq!(graph.predecessors(1), &[0, 3]);
        assert_eq!(graph.predecessors(0), &[]);

        assert!(graph.has_successor(0, 1));
        assert!(!graph.has_successor(1, 0));
        assert!(graph.has_predecessor(2, 1));
        assert!(!graph.has_predecessor(0, 1));

        assert!(graph.has_out_edge(0, 1, 5));
        assert!(!graph.has_out_edge(0, 1, 6));
        assert!(graph.has_in_edge(2, 1, 6));
        assert!(!graph.has_in_edge(2, 1, 5));
    }

    #[test]
    fn parallel_edges_and_self_loops() {
        let graph = graph(
            "
            |t # 0
            |v 0 1
            |v 1 1
            |e 0 1 7
            |e 0 1 7
            |e 0 1 8
            |e 1 1 9
            |t #
            |",
        );

        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.out_edges(0).len(), 3);
        // the unique successor set collapses parallel edges
        assert_eq!(graph.successors(0), &[1]);
        assert_eq!(graph.successors(1), &[1]);
        assert_eq!(graph.predecessors(1), &[0, 1]);
        assert!(graph.has_out_edge(0, 1, 7));
        assert!(graph.has_out_edge(0, 1, 8));
        assert!(graph.has_out_edge(1, 1, 9));
        assert!(!graph.has_out_edge(1, 1, 7));
    }

    #[test]
    fn read_multiple_graphs() {
        let input = "
            |t # 0
            |v 0 1
            |v 1 2
            |e 0 1 3
            |
            |t # 1
            |v 0 4
            |t #
            |"
        .trim_margin()
        .unwrap();

        let graphs = parse_graphs(input.as_bytes()).unwrap();

        assert_eq!(graphs.len(), 2);
        assert_eq!(graphs[0].node_count(), 2);
        assert_eq!(graphs[0].edge_count(), 1);
        assert_eq!(graphs[1].node_count(), 1);
        assert_eq!(graphs[1].label(0), 4);
    }

    #[test]
    fn missing_sentinel_drops_last_graph() {
        let input = "
            |t # 0
            |v 0 1
            |t # 1
            |v 0 2
            |"
        .trim_margin()
        .unwrap();

        let graphs = parse_graphs(input.as_bytes()).unwrap();

        assert_eq!(graphs.len(), 1);
        assert_eq!(graphs[0].label(0), 1);
    }

    #[test]
    fn malformed_line() {
        let input = "t # 0\nv 0 1\nx 1 2\nt #\n";
        match parse_graphs(input.as_bytes()) {
            Err(Error::MalformedLine { line }) => assert_eq!(line, 3),
            other => panic!("expected malformed line error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn edge_endpoint_out_of_range() {
        let input = "t # 0\nv 0 1\ne 0 3 1\nt #\n";
        match parse_graphs(input.as_bytes()) {
            Err(Error::VertexOutOfRange {
                line,
                vertex,
                vertices,
            }) => {
                assert_eq!(line, 3);
                assert_eq!(vertex, 3);
                assert_eq!(vertices, 1);
            }
            other => panic!("expected out of range error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn non_sequential_vertex_id() {
        let input = "t # 0\nv 0 1\nv 2 1\nt #\n";
        match parse_graphs(input.as_bytes()) {
            Err(Error::NonSequentialVertexId {
                line,
                expected,
                found,
            }) => {
                assert_eq!(line, 3);
                assert_eq!(expected, 1);
                assert_eq!(found, 2);
            }
            other => panic!("expected vertex id error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn single_graph_from_str_requires_one_graph() {
        let input = "t # 0\nv 0 1\nt # 1\nv 0 2\nt #\n";
        match input.parse::<Graph>() {
            Err(Error::GraphCount { found }) => assert_eq!(found, 2),
            other => panic!("expected graph count error, got {:?}", other.map(|_| ())),
        }
    }
}
