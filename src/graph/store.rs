//! In-memory concept graph
//!
//! Concepts are kept in insertion order; an undirected neighbor index is
//! maintained alongside the directed relationship list so neighbor and
//! degree queries never scan edges.

use super::concept::Concept;
use super::relationship::Relationship;
use super::types::{ConceptId, ConceptType};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors that can occur during graph operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Concept {0} already exists")]
    DuplicateId(ConceptId),

    #[error("Invalid relationship {from} -> {to}: concept {missing} does not exist")]
    MissingEndpoint {
        from: ConceptId,
        to: ConceptId,
        missing: ConceptId,
    },

    #[error("Self-loop on concept {0} is not allowed")]
    SelfLoop(ConceptId),

    #[error("Confidence {0} is outside [0, 1]")]
    InvalidConfidence(f64),
}

pub type GraphResult<T> = Result<T, GraphError>;

static NO_NEIGHBORS: BTreeSet<ConceptId> = BTreeSet::new();

fn check_confidence(confidence: f64) -> GraphResult<()> {
    if (0.0..=1.0).contains(&confidence) {
        Ok(())
    } else {
        Err(GraphError::InvalidConfidence(confidence))
    }
}

/// Typed concept graph (the reasoning core's GraphModel)
///
/// Duplicate ids are rejected, never merged. Every mutating call either
/// applies fully or leaves the graph untouched.
#[derive(Debug, Clone, Default)]
pub struct ConceptGraph {
    /// Concept storage in insertion order
    concepts: IndexMap<ConceptId, Concept>,

    /// Directed relationships in insertion order
    relationships: Vec<Relationship>,

    /// Undirected neighbor index (sorted for deterministic iteration)
    adjacency: FxHashMap<ConceptId, BTreeSet<ConceptId>>,

    /// Concept type index
    type_index: FxHashMap<ConceptType, Vec<ConceptId>>,
}

impl ConceptGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a concept. Rejects duplicate ids and out-of-range confidence.
    pub fn add_concept(&mut self, concept: Concept) -> GraphResult<()> {
        if self.concepts.contains_key(&concept.id) {
            return Err(GraphError::DuplicateId(concept.id));
        }
        check_confidence(concept.confidence)?;

        self.type_index
            .entry(concept.concept_type)
            .or_default()
            .push(concept.id.clone());
        self.adjacency.entry(concept.id.clone()).or_default();
        self.concepts.insert(concept.id.clone(), concept);
        Ok(())
    }

    /// Insert a relationship between two existing, distinct concepts
    pub fn add_relationship(&mut self, relationship: Relationship) -> GraphResult<()> {
        for endpoint in [&relationship.source, &relationship.target] {
            if !self.concepts.contains_key(endpoint) {
                return Err(GraphError::MissingEndpoint {
                    from: relationship.source.clone(),
                    to: relationship.target.clone(),
                    missing: endpoint.clone(),
                });
            }
        }
        if relationship.source == relationship.target {
            return Err(GraphError::SelfLoop(relationship.source));
        }
        check_confidence(relationship.confidence)?;

        self.adjacency
            .entry(relationship.source.clone())
            .or_default()
            .insert(relationship.target.clone());
        self.adjacency
            .entry(relationship.target.clone())
            .or_default()
            .insert(relationship.source.clone());
        self.relationships.push(relationship);
        Ok(())
    }

    pub fn concept(&self, id: &ConceptId) -> Option<&Concept> {
        self.concepts.get(id)
    }

    pub fn contains(&self, id: &ConceptId) -> bool {
        self.concepts.contains_key(id)
    }

    /// Neighbors ignoring edge direction (empty for unknown ids)
    pub fn neighbors(&self, id: &ConceptId) -> &BTreeSet<ConceptId> {
        self.adjacency.get(id).unwrap_or(&NO_NEIGHBORS)
    }

    /// Number of distinct undirected neighbors
    pub fn degree(&self, id: &ConceptId) -> usize {
        self.neighbors(id).len()
    }

    pub fn are_adjacent(&self, a: &ConceptId, b: &ConceptId) -> bool {
        self.neighbors(a).contains(b)
    }

    /// Shared neighbors of `a` and `b`, ascending
    pub fn common_neighbors(&self, a: &ConceptId, b: &ConceptId) -> Vec<ConceptId> {
        self.neighbors(a)
            .intersection(self.neighbors(b))
            .cloned()
            .collect()
    }

    /// Concepts of one type, in insertion order
    pub fn nodes_by_type(&self, concept_type: ConceptType) -> Vec<&Concept> {
        self.type_index
            .get(&concept_type)
            .map(|ids| ids.iter().filter_map(|id| self.concepts.get(id)).collect())
            .unwrap_or_default()
    }

    /// All concepts in insertion order
    pub fn concepts(&self) -> impl Iterator<Item = &Concept> {
        self.concepts.values()
    }

    /// All concept ids, ascending
    pub fn sorted_ids(&self) -> Vec<ConceptId> {
        let mut ids: Vec<ConceptId> = self.concepts.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn concept_count(&self) -> usize {
        self.concepts.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Independent copy; later mutation of either side does not affect the other
    pub fn snapshot(&self) -> ConceptGraph {
        self.clone()
    }

    /// Induced subgraph over `ids`: the listed concepts plus every
    /// relationship whose endpoints are both listed. Unknown ids are ignored.
    pub fn subgraph(&self, ids: &BTreeSet<ConceptId>) -> ConceptGraph {
        let mut sub = ConceptGraph::new();
        for concept in self.concepts.values().filter(|c| ids.contains(&c.id)) {
            // Already unique and validated in self
            let _ = sub.add_concept(concept.clone());
        }
        for relationship in &self.relationships {
            if ids.contains(&relationship.source) && ids.contains(&relationship.target) {
                let _ = sub.add_relationship(relationship.clone());
            }
        }
        sub
    }
}
