//! PageRank algorithm implementation
//!
//! Iterative importance over the directed edges of the view. Scores are
//! normalised to sum to 1 and the rank held by dangling nodes (no
//! outgoing edges) is spread uniformly over all nodes each round.

use super::common::{GraphView, NodeId};
use std::collections::HashMap;

/// PageRank configuration
#[derive(Debug, Clone, Copy)]
pub struct PageRankConfig {
    /// Damping factor (usually 0.85)
    pub damping_factor: f64,
    /// Maximum number of iterations
    pub iterations: usize,
    /// L1 tolerance for convergence
    pub tolerance: f64,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.85,
            iterations: 100,
            tolerance: 1.0e-6,
        }
    }
}

/// Calculate PageRank for the graph view
pub fn page_rank(
    view: &GraphView,
    config: PageRankConfig,
) -> HashMap<NodeId, f64> {
    let n = view.node_count;

    if n == 0 {
        return HashMap::new();
    }

    let uniform = 1.0 / n as f64;
    let mut scores = vec![uniform; n];
    let mut next_scores = vec![0.0; n];

    let d = config.damping_factor;
    let base_score = (1.0 - d) * uniform;

    for _ in 0..config.iterations {
        let dangling: f64 = (0..n)
            .filter(|&i| view.out_degree(i) == 0)
            .map(|i| scores[i])
            .sum();
        let dangling_share = d * dangling * uniform;

        let mut total_diff = 0.0;
        for i in 0..n {
            let mut sum_incoming = 0.0;

            for &source_idx in view.predecessors(i) {
                // out_degree >= 1 because source_idx -> i exists
                sum_incoming += scores[source_idx] / view.out_degree(source_idx) as f64;
            }

            next_scores[i] = base_score + dangling_share + d * sum_incoming;
            total_diff += (next_scores[i] - scores[i]).abs();
        }

        // Swap buffers
        std::mem::swap(&mut scores, &mut next_scores);

        if total_diff < config.tolerance * n as f64 {
            break;
        }
    }

    let mut result = HashMap::with_capacity(n);
    for (idx, score) in scores.into_iter().enumerate() {
        result.insert(view.index_to_node[idx], score);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::tests::view_from;

    #[test]
    fn test_star_hub_ranks_highest() {
        // 1 -> 0, 2 -> 0, 3 -> 0, 0 -> 1
        let view = view_from(4, &[(1, 0), (2, 0), (3, 0), (0, 1)]);
        let scores = page_rank(&view, PageRankConfig::default());

        let hub = scores[&0];
        assert!(scores.values().all(|&s| s <= hub));
        let total: f64 = scores.values().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_view() {
        let view = view_from(0, &[]);
        assert!(page_rank(&view, PageRankConfig::default()).is_empty());
    }

    #[test]
    fn test_isolated_nodes_share_uniform_rank() {
        let view = view_from(2, &[]);
        let scores = page_rank(&view, PageRankConfig::default());
        assert!((scores[&0] - 0.5).abs() < 1e-9);
        assert!((scores[&1] - 0.5).abs() < 1e-9);
    }
}
