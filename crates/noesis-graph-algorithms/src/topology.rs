//! Graph topology analysis algorithms
//!
//! Triangle counting and clustering coefficients on the undirected view.

use super::common::{sorted_intersection, GraphView, NodeId};
use std::collections::HashMap;

/// Triangle Counting
///
/// Returns total number of triangles in the graph.
/// Direction is ignored and each triangle is counted once.
pub fn count_triangles(view: &GraphView) -> usize {
    let mut triangle_count = 0;

    // Only count u < v < w to avoid overcounting
    for u in 0..view.node_count {
        let u_neighbors = view.neighbors(u);
        for &v in u_neighbors {
            if v <= u {
                continue;
            }
            triangle_count += sorted_intersection(u_neighbors, view.neighbors(v))
                .into_iter()
                .filter(|&w| w > v)
                .count();
        }
    }

    triangle_count
}

/// Local clustering coefficient per node.
///
/// Nodes with fewer than two neighbors score 0.
pub fn clustering_coefficients(view: &GraphView) -> HashMap<NodeId, f64> {
    (0..view.node_count)
        .map(|u| {
            let neighbors = view.neighbors(u);
            let k = neighbors.len();
            let coefficient = if k < 2 {
                0.0
            } else {
                let links: usize = neighbors
                    .iter()
                    .map(|&v| {
                        sorted_intersection(neighbors, view.neighbors(v))
                            .into_iter()
                            .filter(|&w| w > v)
                            .count()
                    })
                    .sum();
                2.0 * links as f64 / (k * (k - 1)) as f64
            };
            (view.index_to_node[u], coefficient)
        })
        .collect()
}

/// Mean of the local clustering coefficients (0 for an empty view)
pub fn average_clustering(view: &GraphView) -> f64 {
    if view.node_count == 0 {
        return 0.0;
    }
    clustering_coefficients(view).values().sum::<f64>() / view.node_count as f64
}
