//! Graph analytics
//!
//! Centrality rankings, Louvain communities and summary statistics over a
//! concept graph snapshot. Empty graphs produce empty results, never errors.

use crate::algo::{self, ConceptView, LouvainConfig, PageRankConfig};
use crate::graph::{ConceptGraph, ConceptId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};

const EIGENVECTOR_MAX_ITER: usize = 1000;
const EIGENVECTOR_TOLERANCE: f64 = 1.0e-6;
const ANALYSIS_TOP_N: usize = 20;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("Unknown centrality metric '{0}' (expected one of: degree, pagerank, betweenness, eigenvector)")]
    UnknownMetric(String),
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Centrality measure selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CentralityMetric {
    Degree,
    #[serde(rename = "pagerank")]
    PageRank,
    Betweenness,
    Eigenvector,
}

impl CentralityMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            CentralityMetric::Degree => "degree",
            CentralityMetric::PageRank => "pagerank",
            CentralityMetric::Betweenness => "betweenness",
            CentralityMetric::Eigenvector => "eigenvector",
        }
    }
}

impl fmt::Display for CentralityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CentralityMetric {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "degree" => Ok(CentralityMetric::Degree),
            "pagerank" | "page_rank" => Ok(CentralityMetric::PageRank),
            "betweenness" => Ok(CentralityMetric::Betweenness),
            "eigenvector" => Ok(CentralityMetric::Eigenvector),
            _ => Err(AnalyticsError::UnknownMetric(s.to_string())),
        }
    }
}

/// A concept with its centrality score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedConcept {
    pub id: ConceptId,
    pub score: f64,
}

/// Louvain partition of the concept graph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommunityResult {
    /// Concept id -> community id
    pub membership: BTreeMap<ConceptId, usize>,
    /// Community id -> member ids, ascending
    pub communities: BTreeMap<usize, Vec<ConceptId>>,
    pub modularity: f64,
}

impl CommunityResult {
    pub fn count(&self) -> usize {
        self.communities.len()
    }
}

/// Summary statistics of a concept graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub num_nodes: usize,
    pub num_edges: usize,
    /// Directed density: edges / (n (n - 1))
    pub density: f64,
    pub is_connected: bool,
    pub num_connected_components: usize,
    pub average_clustering: f64,
    pub node_type_distribution: BTreeMap<String, usize>,
    pub relationship_type_distribution: BTreeMap<String, usize>,
}

/// Analysis bundle stored on each layer's metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphAnalysis {
    pub statistics: GraphStatistics,
    pub top_pagerank: Vec<RankedConcept>,
    pub top_betweenness: Vec<RankedConcept>,
    pub num_communities: usize,
    pub modularity: f64,
}

/// Sort descending by score, ties by id ascending
pub fn rank_scores(scores: HashMap<ConceptId, f64>) -> Vec<RankedConcept> {
    let mut ranked: Vec<RankedConcept> = scores
        .into_iter()
        .map(|(id, score)| RankedConcept { id, score })
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    ranked
}

/// Analytics over one graph snapshot. The dense view is built once and
/// shared by every query.
pub struct GraphAnalytics<'a> {
    graph: &'a ConceptGraph,
    view: ConceptView,
}

impl<'a> GraphAnalytics<'a> {
    pub fn new(graph: &'a ConceptGraph) -> Self {
        let view = algo::build_view(graph);
        debug!(
            "Analytics view: {} nodes, {} undirected edges",
            view.len(),
            view.view.undirected_edge_count()
        );
        Self { graph, view }
    }

    pub fn view(&self) -> &ConceptView {
        &self.view
    }

    /// Raw centrality scores for every concept. Isolated concepts score 0
    /// under every metric except PageRank, where they keep the uniform
    /// teleport share and can outrank weakly connected concepts.
    pub fn centrality_scores(&self, metric: CentralityMetric) -> HashMap<ConceptId, f64> {
        let scores = match metric {
            CentralityMetric::Degree => algo::degree_centrality(&self.view.view),
            CentralityMetric::PageRank => algo::page_rank(&self.view.view, PageRankConfig::default()),
            CentralityMetric::Betweenness => algo::betweenness_centrality(&self.view.view),
            CentralityMetric::Eigenvector => {
                match algo::eigenvector_centrality(
                    &self.view.view,
                    EIGENVECTOR_MAX_ITER,
                    EIGENVECTOR_TOLERANCE,
                ) {
                    Some(scores) => scores,
                    None => {
                        warn!("Eigenvector centrality failed to converge, using PageRank instead");
                        algo::page_rank(&self.view.view, PageRankConfig::default())
                    }
                }
            }
        };
        self.view.resolve(scores)
    }

    /// Ranked centrality (descending, ties by id)
    pub fn centrality(&self, metric: CentralityMetric) -> Vec<RankedConcept> {
        info!("Calculating {} centrality...", metric);
        rank_scores(self.centrality_scores(metric))
    }

    pub fn top_concepts(&self, metric: CentralityMetric, n: usize) -> Vec<RankedConcept> {
        let mut ranked = self.centrality(metric);
        ranked.truncate(n);
        ranked
    }

    /// Louvain communities; disconnected components never share a community
    pub fn detect_communities(&self) -> CommunityResult {
        let result = algo::louvain(&self.view.view, LouvainConfig::default());

        let membership: BTreeMap<ConceptId, usize> = self.view.resolve(result.node_community).into_iter().collect();
        let communities = result
            .communities
            .into_iter()
            .map(|(c, members)| {
                let ids = members
                    .into_iter()
                    .map(|node| self.view.id(node as usize).clone())
                    .collect();
                (c, ids)
            })
            .collect();

        let result = CommunityResult {
            membership,
            communities,
            modularity: result.modularity,
        };
        info!(
            "Found {} communities (modularity {:.4})",
            result.count(),
            result.modularity
        );
        result
    }

    pub fn statistics(&self) -> GraphStatistics {
        let n = self.graph.concept_count();
        let m = self.graph.relationship_count();
        let density = if n > 1 {
            m as f64 / (n * (n - 1)) as f64
        } else {
            0.0
        };
        let components = algo::weakly_connected_components(&self.view.view).components.len();

        let mut node_type_distribution = BTreeMap::new();
        for concept in self.graph.concepts() {
            *node_type_distribution
                .entry(concept.concept_type.to_string())
                .or_insert(0) += 1;
        }
        let mut relationship_type_distribution = BTreeMap::new();
        for relationship in self.graph.relationships() {
            *relationship_type_distribution
                .entry(relationship.rel_type.to_string())
                .or_insert(0) += 1;
        }

        GraphStatistics {
            num_nodes: n,
            num_edges: m,
            density,
            is_connected: components == 1,
            num_connected_components: components,
            average_clustering: algo::average_clustering(&self.view.view),
            node_type_distribution,
            relationship_type_distribution,
        }
    }

    /// Concepts within `distance` undirected hops of `id`, excluding `id`
    pub fn neighborhood(&self, id: &ConceptId, distance: usize) -> BTreeSet<ConceptId> {
        let mut found = BTreeSet::new();
        let Some(start) = self.view.index_of(id) else {
            return found;
        };

        let mut seen = vec![false; self.view.len()];
        seen[start] = true;
        let mut queue = VecDeque::from([(start, 0usize)]);
        while let Some((u, d)) = queue.pop_front() {
            if d == distance {
                continue;
            }
            for &v in self.view.view.neighbors(u) {
                if !seen[v] {
                    seen[v] = true;
                    found.insert(self.view.id(v).clone());
                    queue.push_back((v, d + 1));
                }
            }
        }
        found
    }

    /// Statistics, top concepts and communities in one serialisable bundle
    pub fn analyze(&self) -> GraphAnalysis {
        let communities = self.detect_communities();
        GraphAnalysis {
            statistics: self.statistics(),
            top_pagerank: self.top_concepts(CentralityMetric::PageRank, ANALYSIS_TOP_N),
            top_betweenness: self.top_concepts(CentralityMetric::Betweenness, ANALYSIS_TOP_N),
            num_communities: communities.count(),
            modularity: communities.modularity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Concept, ConceptType, Relationship};

    fn graph(ids: &[&str], edges: &[(&str, &str)]) -> ConceptGraph {
        let mut graph = ConceptGraph::new();
        for id in ids {
            graph.add_concept(Concept::new(*id, *id, ConceptType::Method)).unwrap();
        }
        for (s, t) in edges {
            graph.add_relationship(Relationship::new(*s, *t, "related_to")).unwrap();
        }
        graph
    }

    #[test]
    fn test_parse_metric() {
        assert_eq!("PageRank".parse::<CentralityMetric>().unwrap(), CentralityMetric::PageRank);
        assert_eq!("page-rank".parse::<CentralityMetric>().unwrap(), CentralityMetric::PageRank);
        assert_eq!(
            "closeness".parse::<CentralityMetric>(),
            Err(AnalyticsError::UnknownMetric("closeness".to_string()))
        );
    }

    #[test]
    fn test_empty_graph() {
        let graph = ConceptGraph::new();
        let analytics = GraphAnalytics::new(&graph);

        assert!(analytics.centrality(CentralityMetric::Betweenness).is_empty());
        assert_eq!(analytics.detect_communities().count(), 0);
        let stats = analytics.statistics();
        assert_eq!(stats.num_nodes, 0);
        assert!(!stats.is_connected);
    }

    #[test]
    fn test_star_centrality_ranking_and_ties() {
        // hub connects to three leaves; an isolated concept is still ranked
        let graph = graph(
            &["hub", "c", "b", "a", "lonely"],
            &[("hub", "a"), ("hub", "b"), ("c", "hub")],
        );
        let analytics = GraphAnalytics::new(&graph);

        let degree = analytics.centrality(CentralityMetric::Degree);
        assert_eq!(degree.len(), 5);
        assert_eq!(degree[0].id.as_str(), "hub");
        assert!((degree[0].score - 0.75).abs() < 1e-12);
        // Equal leaves ordered by id
        let leaves: Vec<&str> = degree[1..4].iter().map(|r| r.id.as_str()).collect();
        assert_eq!(leaves, vec!["a", "b", "c"]);
        assert_eq!(degree[4].id.as_str(), "lonely");
        assert_eq!(degree[4].score, 0.0);

        let pagerank = analytics.centrality_scores(CentralityMetric::PageRank);
        assert!(pagerank[&ConceptId::new("lonely")] > 0.0);
        assert_eq!(analytics.centrality_scores(CentralityMetric::Betweenness)[&ConceptId::new("lonely")], 0.0);

        let betweenness = analytics.top_concepts(CentralityMetric::Betweenness, 1);
        assert_eq!(betweenness[0].id.as_str(), "hub");
    }

    #[test]
    fn test_communities_on_disconnected_graph() {
        let graph = graph(
            &["a1", "a2", "a3", "b1", "b2", "b3"],
            &[
                ("a1", "a2"),
                ("a2", "a3"),
                ("a3", "a1"),
                ("b1", "b2"),
                ("b2", "b3"),
                ("b3", "b1"),
            ],
        );
        let communities = GraphAnalytics::new(&graph).detect_communities();

        assert_eq!(communities.count(), 2);
        assert_eq!(communities.membership[&ConceptId::new("a1")], communities.membership[&ConceptId::new("a3")]);
        assert_ne!(communities.membership[&ConceptId::new("a1")], communities.membership[&ConceptId::new("b1")]);
        assert!((communities.modularity - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_statistics_and_neighborhood() {
        let graph = graph(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c")]);
        let analytics = GraphAnalytics::new(&graph);
        let stats = analytics.statistics();

        assert_eq!(stats.num_edges, 2);
        assert_eq!(stats.num_connected_components, 2);
        assert!(!stats.is_connected);
        assert!((stats.density - 2.0 / 12.0).abs() < 1e-12);
        assert_eq!(stats.node_type_distribution["method"], 4);
        assert_eq!(stats.relationship_type_distribution["related_to"], 2);

        let near = analytics.neighborhood(&"a".into(), 2);
        assert_eq!(near.into_iter().map(|id| id.to_string()).collect::<Vec<_>>(), vec!["b", "c"]);
        assert!(analytics.neighborhood(&"zz".into(), 1).is_empty());
    }

    #[test]
    fn test_analyze_bundle_serializes() {
        let graph = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let analysis = GraphAnalytics::new(&graph).analyze();

        assert_eq!(analysis.top_pagerank.len(), 3);
        assert_eq!(analysis.statistics.num_nodes, 3);
        let json = serde_json::to_value(&analysis).unwrap();
        assert!(json["statistics"]["num_connected_components"].is_number());
    }
}
