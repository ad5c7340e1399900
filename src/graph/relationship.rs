//! Relationship (edge) between two concepts

use super::types::{ConceptId, RelationType};
use serde::{Deserialize, Serialize};

/// A directed, typed relationship.
///
/// Direction is kept for reporting and PageRank; neighbor queries and
/// link prediction ignore it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: ConceptId,
    pub target: ConceptId,
    #[serde(rename = "type")]
    pub rel_type: RelationType,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Optional supporting context (sentence, mechanism, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Relationship {
    pub fn new(
        source: impl Into<ConceptId>,
        target: impl Into<ConceptId>,
        rel_type: impl Into<RelationType>,
    ) -> Self {
        Relationship {
            source: source.into(),
            target: target.into(),
            rel_type: rel_type.into(),
            confidence: 1.0,
            context: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Whether this edge touches `id` at either end
    pub fn touches(&self, id: &ConceptId) -> bool {
        &self.source == id || &self.target == id
    }
}
