//! Shared utilities for graph algorithms
//!
//! Provides a read-only, optimized view of the graph topology for algorithm execution.

use std::collections::HashMap;

/// Node Identifier type (u64)
pub type NodeId = u64;

/// A dense, integer-indexed view of the graph topology using Compressed Sparse Row (CSR) format.
///
/// Besides the directed CSR structures the view carries an undirected,
/// deduplicated adjacency (sorted ascending, no self entries). Link
/// prediction, community detection and betweenness all treat the
/// concept graph as undirected and read only that part.
pub struct GraphView {
    /// Number of nodes
    pub node_count: usize,
    /// Mapping from dense index (0..N) back to NodeId
    pub index_to_node: Vec<NodeId>,
    /// Mapping from NodeId to dense index
    pub node_to_index: HashMap<NodeId, usize>,

    /// Outgoing edges CSR structure
    /// Offsets into `out_targets`. Size = node_count + 1
    pub out_offsets: Vec<usize>,
    /// Contiguous array of target node indices
    pub out_targets: Vec<usize>,

    /// Incoming edges CSR structure (Compressed Sparse Column effectively)
    /// Offsets into `in_sources`. Size = node_count + 1
    pub in_offsets: Vec<usize>,
    /// Contiguous array of source node indices
    pub in_sources: Vec<usize>,

    /// Undirected neighbor CSR structure. Size = node_count + 1
    pub und_offsets: Vec<usize>,
    /// Sorted, deduplicated neighbor indices
    pub und_targets: Vec<usize>,
}

impl GraphView {
    /// Build a view from dense node ids and directed `(source_idx, target_idx)` edges.
    ///
    /// Edges referencing an index outside `0..index_to_node.len()` and
    /// self-loops are ignored. Parallel edges are kept in the directed
    /// structures and collapsed in the undirected one.
    pub fn from_edges(index_to_node: Vec<NodeId>, edges: &[(usize, usize)]) -> Self {
        let node_count = index_to_node.len();
        let node_to_index = index_to_node
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx))
            .collect();

        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        let mut undirected: Vec<Vec<usize>> = vec![Vec::new(); node_count];

        for &(u, v) in edges {
            if u >= node_count || v >= node_count || u == v {
                continue;
            }
            outgoing[u].push(v);
            incoming[v].push(u);
            undirected[u].push(v);
            undirected[v].push(u);
        }

        let (out_offsets, out_targets) = flatten(outgoing);
        let (in_offsets, in_sources) = flatten(incoming);
        for neighbors in undirected.iter_mut() {
            neighbors.sort_unstable();
            neighbors.dedup();
        }
        let (und_offsets, und_targets) = flatten(undirected);

        GraphView {
            node_count,
            index_to_node,
            node_to_index,
            out_offsets,
            out_targets,
            in_offsets,
            in_sources,
            und_offsets,
            und_targets,
        }
    }

    /// Get the out-degree of a node (by index)
    pub fn out_degree(&self, idx: usize) -> usize {
        self.out_offsets[idx + 1] - self.out_offsets[idx]
    }

    /// Get the in-degree of a node (by index)
    pub fn in_degree(&self, idx: usize) -> usize {
        self.in_offsets[idx + 1] - self.in_offsets[idx]
    }

    /// Number of distinct neighbors, ignoring direction
    pub fn degree(&self, idx: usize) -> usize {
        self.und_offsets[idx + 1] - self.und_offsets[idx]
    }

    /// Get outgoing neighbors (successors) of a node
    pub fn successors(&self, idx: usize) -> &[usize] {
        let start = self.out_offsets[idx];
        let end = self.out_offsets[idx + 1];
        &self.out_targets[start..end]
    }

    /// Get incoming neighbors (predecessors) of a node
    pub fn predecessors(&self, idx: usize) -> &[usize] {
        let start = self.in_offsets[idx];
        let end = self.in_offsets[idx + 1];
        &self.in_sources[start..end]
    }

    /// Sorted neighbors of a node, ignoring direction
    pub fn neighbors(&self, idx: usize) -> &[usize] {
        let start = self.und_offsets[idx];
        let end = self.und_offsets[idx + 1];
        &self.und_targets[start..end]
    }

    /// Whether `u` and `v` share an edge in either direction
    pub fn are_adjacent(&self, u: usize, v: usize) -> bool {
        self.neighbors(u).binary_search(&v).is_ok()
    }

    /// Number of distinct undirected edges
    pub fn undirected_edge_count(&self) -> usize {
        self.und_targets.len() / 2
    }
}

fn flatten(lists: Vec<Vec<usize>>) -> (Vec<usize>, Vec<usize>) {
    let mut offsets = Vec::with_capacity(lists.len() + 1);
    let mut targets = Vec::new();
    offsets.push(0);
    for list in lists {
        targets.extend(list);
        offsets.push(targets.len());
    }
    (offsets, targets)
}

/// Walk two sorted slices and collect the shared entries
pub fn sorted_intersection(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}
