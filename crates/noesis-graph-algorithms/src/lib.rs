//! Pure graph algorithms for concept-graph reasoning
//!
//! Everything operates on [`GraphView`], a dense CSR projection that
//! callers build once per analysis round.

pub mod common;
pub mod pagerank;
pub mod centrality;
pub mod community;
pub mod similarity;
pub mod topology;

pub use common::{GraphView, NodeId};
pub use pagerank::{page_rank, PageRankConfig};
pub use centrality::{betweenness_centrality, degree_centrality, eigenvector_centrality};
pub use community::{
    louvain, modularity, weakly_connected_components, LouvainConfig, LouvainResult, WccResult,
};
pub use similarity::{score_non_adjacent_pairs, similarity, SimilarityMetric, UnknownMetric};
pub use topology::{average_clustering, clustering_coefficients, count_triangles};
