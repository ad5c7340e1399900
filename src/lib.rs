//! Noesis: recursive hypothesis exploration over concept graphs
//!
//! Takes a graph of scientific concepts, scores unconnected concept pairs by
//! structural similarity, asks a generative text service for a research
//! hypothesis per promising pair, and recursively grows a tree of hypothesis
//! layers by folding accepted hypotheses back into the graph.
//!
//! # Architecture
//!
//! - [`graph`]: typed in-memory concept graph and its JSON export format
//! - [`algo`]: projection onto the dense view of `noesis-graph-algorithms`
//! - [`analytics`]: centrality, communities and summary statistics
//! - [`predict`]: link prediction with five similarity metrics
//! - [`llm`]: the [`TextGenerator`] seam and an HTTP client
//! - [`hypothesis`]: prompt, parsing, retries and the one-round engine
//! - [`explore`]: layers, branching, run budget and the recursive driver
//! - [`config`]: YAML/JSON configuration
//!
//! ## Example Usage
//!
//! ```rust
//! use noesis::graph::{Concept, ConceptGraph, ConceptType, Relationship};
//! use noesis::predict::{LinkPredictor, PredictionOptions};
//!
//! let mut graph = ConceptGraph::new();
//! graph.add_concept(Concept::new("a", "Graph Neural Network", ConceptType::Method)).unwrap();
//! graph.add_concept(Concept::new("b", "Percolation Theory", ConceptType::Theory)).unwrap();
//! graph.add_concept(Concept::new("c", "Porous Media", ConceptType::Material)).unwrap();
//! graph.add_relationship(Relationship::new("a", "c", "applied_to")).unwrap();
//! graph.add_relationship(Relationship::new("b", "c", "describes")).unwrap();
//!
//! let options = PredictionOptions { cross_domain_only: true, ..Default::default() };
//! let links = LinkPredictor::new(&graph).predict(&options);
//! assert_eq!(links[0].pair(), ("a".into(), "b".into()));
//! assert_eq!(links[0].score, 1.0);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod analytics;
pub mod config;
pub mod explore;
pub mod graph;
pub mod hypothesis;
pub mod llm;
pub mod predict;

// Re-export main types for convenience
pub use graph::{
    Concept, ConceptGraph, ConceptId, ConceptType, GraphError, GraphResult, RelationType, Relationship,
};

pub use analytics::{CentralityMetric, GraphAnalysis, GraphAnalytics, GraphStatistics};

pub use predict::{CandidateLink, LinkPredictor, PredictionOptions};

pub use llm::{LLMClient, LLMError, LLMResult, TextGenerator};

pub use hypothesis::{
    EngineParams, GenerationFailure, HypothesisEngine, HypothesisGenerator, HypothesisRecord,
    PromptContext, QualityThresholds,
};

pub use explore::{
    BranchingCriterion, ExplorationTree, HypothesisLayer, RecursiveAlchemist, TerminationReason,
};

pub use config::{ConfigError, ExplorationConfig};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
