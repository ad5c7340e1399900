//! Centrality measures over the undirected projection of the view
//!
//! Degree, betweenness (Brandes) and eigenvector centrality. Isolated
//! nodes are always present in the output with a score of 0.

use super::common::{GraphView, NodeId};
use std::collections::{HashMap, VecDeque};

/// Degree centrality: distinct neighbors / (n - 1)
pub fn degree_centrality(view: &GraphView) -> HashMap<NodeId, f64> {
    let n = view.node_count;
    let scale = if n > 1 { 1.0 / (n - 1) as f64 } else { 0.0 };

    (0..n)
        .map(|idx| (view.index_to_node[idx], view.degree(idx) as f64 * scale))
        .collect()
}

/// Betweenness centrality using Brandes' algorithm.
///
/// Treats the graph as undirected and normalises by `2 / ((n-1)(n-2))`
/// so scores fall in `[0, 1]`.
pub fn betweenness_centrality(view: &GraphView) -> HashMap<NodeId, f64> {
    let n = view.node_count;
    let mut centrality = vec![0.0f64; n];

    let mut stack = Vec::with_capacity(n);
    let mut queue = VecDeque::with_capacity(n);
    let mut pred: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0f64; n];
    let mut dist = vec![-1i64; n];
    let mut delta = vec![0.0f64; n];

    for s in 0..n {
        stack.clear();
        for i in 0..n {
            pred[i].clear();
            sigma[i] = 0.0;
            dist[i] = -1;
            delta[i] = 0.0;
        }
        sigma[s] = 1.0;
        dist[s] = 0;
        queue.push_back(s);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for &w in view.neighbors(v) {
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    pred[w].push(v);
                }
            }
        }

        while let Some(w) = stack.pop() {
            for &v in &pred[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != s {
                centrality[w] += delta[w];
            }
        }
    }

    // Each undirected path was counted from both endpoints
    let scale = if n > 2 {
        1.0 / ((n - 1) * (n - 2)) as f64
    } else {
        0.0
    };

    centrality
        .into_iter()
        .enumerate()
        .map(|(idx, c)| (view.index_to_node[idx], c * scale))
        .collect()
}

/// Eigenvector centrality by power iteration on the undirected adjacency.
///
/// Returns `None` when the iteration does not converge within `max_iter`
/// rounds; callers decide on a fallback.
pub fn eigenvector_centrality(
    view: &GraphView,
    max_iter: usize,
    tolerance: f64,
) -> Option<HashMap<NodeId, f64>> {
    let n = view.node_count;
    if n == 0 {
        return Some(HashMap::new());
    }

    let mut x = vec![1.0 / n as f64; n];
    let mut next = vec![0.0f64; n];

    for _ in 0..max_iter {
        // x + A x keeps bipartite graphs from oscillating
        for i in 0..n {
            next[i] = x[i] + view.neighbors(i).iter().map(|&j| x[j]).sum::<f64>();
        }

        let norm = next.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Some(view.index_to_node.iter().map(|&id| (id, 0.0)).collect());
        }
        for v in next.iter_mut() {
            *v /= norm;
        }

        let diff: f64 = x.iter().zip(&next).map(|(a, b)| (a - b).abs()).sum();
        std::mem::swap(&mut x, &mut next);

        if diff < n as f64 * tolerance {
            return Some(
                x.into_iter()
                    .enumerate()
                    .map(|(idx, score)| {
                        let score = if view.degree(idx) == 0 { 0.0 } else { score };
                        (view.index_to_node[idx], score)
                    })
                    .collect(),
            );
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::tests::view_from;

    #[test]
    fn test_degree_centrality() {
        // 0 - 1, 0 - 2, 3 isolated
        let view = view_from(4, &[(0, 1), (2, 0)]);
        let scores = degree_centrality(&view);

        assert!((scores[&0] - 2.0 / 3.0).abs() < 1e-12);
        assert!((scores[&1] - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(scores[&3], 0.0);
    }

    #[test]
    fn test_betweenness_path_graph() {
        // 0 - 1 - 2: node 1 lies on the only 0..2 path
        let view = view_from(3, &[(0, 1), (1, 2)]);
        let scores = betweenness_centrality(&view);

        assert!((scores[&1] - 1.0).abs() < 1e-12);
        assert_eq!(scores[&0], 0.0);
        assert_eq!(scores[&2], 0.0);
    }

    #[test]
    fn test_betweenness_disconnected_node_is_zero() {
        let view = view_from(4, &[(0, 1), (1, 2)]);
        let scores = betweenness_centrality(&view);
        assert_eq!(scores.len(), 4);
        assert_eq!(scores[&3], 0.0);
        assert!(scores.values().all(|&s| (0.0..=1.0).contains(&s)));
    }

    #[test]
    fn test_eigenvector_star() {
        let view = view_from(4, &[(0, 1), (0, 2), (0, 3)]);
        let scores = eigenvector_centrality(&view, 1000, 1e-9).unwrap();
        assert!(scores[&0] > scores[&1]);
        assert!((scores[&1] - scores[&2]).abs() < 1e-9);
    }
}
