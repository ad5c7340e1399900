//! Concept graph model
//!
//! Typed, in-memory concept graph consumed by analytics, link prediction
//! and the recursive exploration engine:
//! - Concepts with a closed type set and unique ids
//! - Directed, typed relationships between existing concepts
//! - Undirected neighbor/degree queries
//! - Best-effort import/export of the ingestion pipeline's JSON format

pub mod concept;
pub mod export;
pub mod relationship;
pub mod store;
pub mod types;

// Re-export main types
pub use concept::Concept;
pub use export::{load_graph, save_graph, ExportError, ExportResult, GraphExport, LoadReport};
pub use relationship::Relationship;
pub use store::{ConceptGraph, GraphError, GraphResult};
pub use types::{ConceptId, ConceptType, RelationType};
