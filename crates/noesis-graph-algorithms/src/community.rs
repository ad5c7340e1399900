//! Community detection algorithms
//!
//! Weakly connected components (union-find) and Louvain modularity
//! optimisation over the undirected projection of the view.

use super::common::{GraphView, NodeId};
use std::collections::{BTreeMap, HashMap};

/// Result of WCC algorithm
pub struct WccResult {
    /// Map of Component ID -> List of NodeIds
    pub components: HashMap<usize, Vec<NodeId>>,
    /// Map of NodeId -> Component ID
    pub node_component: HashMap<NodeId, usize>,
}

/// Union-Find data structure
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        UnionFind {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, i: usize) -> usize {
        if self.parent[i] != i {
            self.parent[i] = self.find(self.parent[i]); // Path compression
        }
        self.parent[i]
    }

    fn union(&mut self, i: usize, j: usize) {
        let root_i = self.find(i);
        let root_j = self.find(j);

        if root_i != root_j {
            if self.rank[root_i] < self.rank[root_j] {
                self.parent[root_i] = root_j;
            } else if self.rank[root_i] > self.rank[root_j] {
                self.parent[root_j] = root_i;
            } else {
                self.parent[root_j] = root_i;
                self.rank[root_i] += 1;
            }
        }
    }
}

/// Weakly Connected Components (WCC)
///
/// Finds all disjoint subgraphs in the graph.
/// Ignores edge direction.
pub fn weakly_connected_components(view: &GraphView) -> WccResult {
    let n = view.node_count;
    let mut uf = UnionFind::new(n);

    for u_idx in 0..n {
        for &v_idx in view.neighbors(u_idx) {
            uf.union(u_idx, v_idx);
        }
    }

    let mut components = HashMap::new();
    let mut node_component = HashMap::new();

    for i in 0..n {
        let root = uf.find(i);
        let node_id = view.index_to_node[i];

        components.entry(root).or_insert_with(Vec::new).push(node_id);
        node_component.insert(node_id, root);
    }

    WccResult {
        components,
        node_component,
    }
}

/// Louvain configuration
#[derive(Debug, Clone, Copy)]
pub struct LouvainConfig {
    /// Maximum number of aggregation levels
    pub max_levels: usize,
    /// Maximum local-moving sweeps per level
    pub max_sweeps: usize,
    /// Minimum modularity gain for a node to change community
    pub min_gain: f64,
}

impl Default for LouvainConfig {
    fn default() -> Self {
        Self {
            max_levels: 10,
            max_sweeps: 50,
            min_gain: 1.0e-10,
        }
    }
}

/// Result of Louvain community detection
#[derive(Debug, Clone)]
pub struct LouvainResult {
    /// Map of NodeId -> Community ID (0..k, numbered by first appearance in index order)
    pub node_community: HashMap<NodeId, usize>,
    /// Map of Community ID -> member NodeIds in index order
    pub communities: BTreeMap<usize, Vec<NodeId>>,
    /// Modularity of the final partition
    pub modularity: f64,
}

/// Weighted, possibly aggregated, graph used between Louvain levels
struct LevelGraph {
    adjacency: Vec<Vec<(usize, f64)>>,
    /// Total weight of edges folded inside each node
    internal: Vec<f64>,
}

impl LevelGraph {
    fn from_view(view: &GraphView) -> Self {
        let adjacency = (0..view.node_count)
            .map(|i| view.neighbors(i).iter().map(|&j| (j, 1.0)).collect())
            .collect();
        Self {
            adjacency,
            internal: vec![0.0; view.node_count],
        }
    }

    fn len(&self) -> usize {
        self.adjacency.len()
    }

    fn strength(&self, i: usize) -> f64 {
        self.adjacency[i].iter().map(|&(_, w)| w).sum::<f64>() + 2.0 * self.internal[i]
    }

    /// One round of local moving. Returns (community per node, whether anything moved).
    fn local_moving(&self, m2: f64, config: &LouvainConfig) -> (Vec<usize>, bool) {
        let n = self.len();
        let strength: Vec<f64> = (0..n).map(|i| self.strength(i)).collect();
        let mut community: Vec<usize> = (0..n).collect();
        let mut total = strength.clone();
        let mut any_move = false;

        for _ in 0..config.max_sweeps {
            let mut moved = false;

            for i in 0..n {
                let current = community[i];
                let k_i = strength[i];
                total[current] -= k_i;

                // Weight from i into each neighboring community, ordered by id
                let mut links: BTreeMap<usize, f64> = BTreeMap::new();
                for &(j, w) in &self.adjacency[i] {
                    *links.entry(community[j]).or_insert(0.0) += w;
                }

                let gain = |c: usize, w_in: f64| w_in - total[c] * k_i / m2;
                let mut best = current;
                let mut best_gain = gain(current, links.get(&current).copied().unwrap_or(0.0));

                for (&c, &w_in) in &links {
                    let g = gain(c, w_in);
                    if g > best_gain + config.min_gain {
                        best = c;
                        best_gain = g;
                    }
                }

                total[best] += k_i;
                if best != current {
                    community[i] = best;
                    moved = true;
                    any_move = true;
                }
            }

            if !moved {
                break;
            }
        }

        (community, any_move)
    }

    fn aggregate(&self, community: &[usize], count: usize) -> LevelGraph {
        let mut links: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); count];
        let mut internal = vec![0.0; count];

        for i in 0..self.len() {
            let ci = community[i];
            internal[ci] += self.internal[i];
            for &(j, w) in &self.adjacency[i] {
                let cj = community[j];
                if ci == cj {
                    // Seen once from each endpoint
                    internal[ci] += w / 2.0;
                } else {
                    *links[ci].entry(cj).or_insert(0.0) += w;
                }
            }
        }

        LevelGraph {
            adjacency: links.into_iter().map(|m| m.into_iter().collect()).collect(),
            internal,
        }
    }
}

/// Renumber labels 0..k by order of first appearance
fn renumber(labels: &[usize]) -> (Vec<usize>, usize) {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    let out = labels
        .iter()
        .map(|&label| {
            let next = mapping.len();
            *mapping.entry(label).or_insert(next)
        })
        .collect();
    (out, mapping.len())
}

/// Newman modularity of a partition given as one label per dense index
pub fn modularity(view: &GraphView, membership: &[usize]) -> f64 {
    let m = view.undirected_edge_count() as f64;
    if m == 0.0 {
        return 0.0;
    }

    let mut internal: HashMap<usize, f64> = HashMap::new();
    let mut degree_sum: HashMap<usize, f64> = HashMap::new();

    for u in 0..view.node_count {
        let cu = membership[u];
        *degree_sum.entry(cu).or_insert(0.0) += view.degree(u) as f64;
        for &v in view.neighbors(u) {
            if v > u && membership[v] == cu {
                *internal.entry(cu).or_insert(0.0) += 1.0;
            }
        }
    }

    degree_sum
        .iter()
        .map(|(c, &d)| {
            let l = internal.get(c).copied().unwrap_or(0.0);
            l / m - (d / (2.0 * m)).powi(2)
        })
        .sum()
}

/// Louvain community detection.
///
/// Greedy local moving followed by aggregation, repeated while the
/// partition keeps improving. Nodes are visited in index order and ties
/// resolve to the lowest community id, so the result is deterministic for
/// a given view. Graphs with fewer than two edges yield singleton
/// communities.
pub fn louvain(view: &GraphView, config: LouvainConfig) -> LouvainResult {
    let n = view.node_count;
    let mut membership: Vec<usize> = (0..n).collect();

    if view.undirected_edge_count() >= 2 {
        let m2 = 2.0 * view.undirected_edge_count() as f64;
        let mut level = LevelGraph::from_view(view);

        for _ in 0..config.max_levels {
            let (community, moved) = level.local_moving(m2, &config);
            if !moved {
                break;
            }

            let (community, count) = renumber(&community);
            for label in membership.iter_mut() {
                *label = community[*label];
            }

            if count == level.len() {
                break;
            }
            level = level.aggregate(&community, count);
        }
    }

    let (membership, _) = renumber(&membership);
    let modularity = modularity(view, &membership);

    let mut node_community = HashMap::with_capacity(n);
    let mut communities: BTreeMap<usize, Vec<NodeId>> = BTreeMap::new();
    for (idx, &c) in membership.iter().enumerate() {
        let node_id = view.index_to_node[idx];
        node_community.insert(node_id, c);
        communities.entry(c).or_default().push(node_id);
    }

    LouvainResult {
        node_community,
        communities,
        modularity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::tests::view_from;

    #[test]
    fn test_wcc() {
        // Nodes: 1, 2, 3, 4, 5, 6
        // Edges: 1->2, 3->4->5, 6 (isolated)
        let view = GraphView::from_edges(vec![1, 2, 3, 4, 5, 6], &[(0, 1), (2, 3), (3, 4)]);

        let result = weakly_connected_components(&view);

        assert_eq!(result.components.len(), 3);

        let c1 = *result.node_component.get(&1).unwrap();
        let c2 = *result.node_component.get(&2).unwrap();
        assert_eq!(c1, c2);

        let c3 = *result.node_component.get(&3).unwrap();
        let c4 = *result.node_component.get(&4).unwrap();
        let c5 = *result.node_component.get(&5).unwrap();
        assert_eq!(c3, c4);
        assert_eq!(c4, c5);
        assert_ne!(c1, c3);
    }

    #[test]
    fn test_louvain_two_triangles() {
        // Triangles {0,1,2} and {3,4,5} joined by 2 - 3
        let view = view_from(6, &[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3), (2, 3)]);
        let result = louvain(&view, LouvainConfig::default());

        assert_eq!(result.communities.len(), 2);
        let left = result.node_community[&0];
        assert_eq!(result.node_community[&1], left);
        assert_eq!(result.node_community[&2], left);
        let right = result.node_community[&3];
        assert_ne!(left, right);
        assert_eq!(result.node_community[&4], right);
        assert_eq!(result.node_community[&5], right);
        assert!((result.modularity - 5.0 / 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_louvain_disconnected_components_stay_apart() {
        let view = view_from(5, &[(0, 1), (1, 2), (3, 4)]);
        let result = louvain(&view, LouvainConfig::default());

        assert_ne!(result.node_community[&0], result.node_community[&3]);
        assert_eq!(result.node_community[&3], result.node_community[&4]);
    }

    #[test]
    fn test_louvain_fewer_than_two_edges_is_singletons() {
        let view = view_from(3, &[(0, 1)]);
        let result = louvain(&view, LouvainConfig::default());
        assert_eq!(result.communities.len(), 3);

        let empty = view_from(0, &[]);
        let result = louvain(&empty, LouvainConfig::default());
        assert!(result.node_community.is_empty());
        assert_eq!(result.modularity, 0.0);
    }
}
