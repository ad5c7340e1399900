//! Graph algorithms module
//!
//! Algorithms are implemented in the `noesis-graph-algorithms` crate.
//! This module provides the integration/adapter layer: it projects a
//! `ConceptGraph` onto the crate's dense CSR `GraphView`.

use crate::graph::{ConceptGraph, ConceptId};
use noesis_graph_algorithms::{GraphView, NodeId as AlgoNodeId};
use std::collections::HashMap;

// Re-export algorithms
pub use noesis_graph_algorithms::{
    average_clustering, betweenness_centrality, count_triangles, degree_centrality,
    eigenvector_centrality, louvain, page_rank, score_non_adjacent_pairs, similarity,
    weakly_connected_components, LouvainConfig, LouvainResult, PageRankConfig, SimilarityMetric,
    UnknownMetric, WccResult,
};
pub use noesis_graph_algorithms::common::sorted_intersection;

/// Dense projection of a concept graph.
///
/// Concept ids are sorted ascending before indexing, so dense index order
/// equals id order. Algorithm node ids are the dense indices themselves.
pub struct ConceptView {
    pub view: GraphView,
    ids: Vec<ConceptId>,
    index: HashMap<ConceptId, usize>,
}

impl ConceptView {
    pub fn id(&self, idx: usize) -> &ConceptId {
        &self.ids[idx]
    }

    pub fn index_of(&self, id: &ConceptId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn ids(&self) -> &[ConceptId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Translate an algorithm result keyed by dense index back to concept ids
    pub fn resolve<T>(&self, scores: HashMap<AlgoNodeId, T>) -> HashMap<ConceptId, T> {
        scores
            .into_iter()
            .filter_map(|(node, value)| {
                self.ids
                    .get(node as usize)
                    .map(|id| (id.clone(), value))
            })
            .collect()
    }
}

/// Build a view over every concept and relationship of the graph
pub fn build_view(graph: &ConceptGraph) -> ConceptView {
    // 1. Index mappings in id order
    let ids = graph.sorted_ids();
    let index: HashMap<ConceptId, usize> = ids
        .iter()
        .enumerate()
        .map(|(idx, id)| (id.clone(), idx))
        .collect();

    // 2. Directed edges between indexed concepts
    let edges: Vec<(usize, usize)> = graph
        .relationships()
        .iter()
        .filter_map(|r| Some((*index.get(&r.source)?, *index.get(&r.target)?)))
        .collect();

    // 3. CSR conversion happens in the algorithms crate
    let view = GraphView::from_edges((0..ids.len() as AlgoNodeId).collect(), &edges);

    ConceptView { view, ids, index }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Concept, ConceptType, Relationship};

    #[test]
    fn test_view_is_id_ordered() {
        let mut graph = ConceptGraph::new();
        for id in ["zeta", "alpha", "mu"] {
            graph.add_concept(Concept::new(id, id, ConceptType::Theory)).unwrap();
        }
        graph.add_relationship(Relationship::new("zeta", "alpha", "uses")).unwrap();

        let cv = build_view(&graph);
        assert_eq!(cv.len(), 3);
        assert_eq!(cv.id(0).as_str(), "alpha");
        assert_eq!(cv.index_of(&"zeta".into()), Some(2));
        assert!(cv.view.are_adjacent(0, 2));
        assert_eq!(cv.view.successors(2), &[0]);
        assert_eq!(cv.view.degree(1), 0);
    }

    #[test]
    fn test_resolve_maps_back_to_ids() {
        let mut graph = ConceptGraph::new();
        graph.add_concept(Concept::new("b", "B", ConceptType::Method)).unwrap();
        graph.add_concept(Concept::new("a", "A", ConceptType::Method)).unwrap();
        let cv = build_view(&graph);

        let resolved = cv.resolve(HashMap::from([(0u64, 1.5), (1u64, 2.5), (9u64, 0.0)]));
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[&ConceptId::from("a")], 1.5);
    }
}
