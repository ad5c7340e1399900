//! Concept (node) of the reasoning graph

use super::types::{ConceptId, ConceptType};
use serde::{Deserialize, Serialize};

/// A scientific idea, method or (if synthetic) a generated hypothesis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    /// Stable unique identifier
    pub id: ConceptId,
    /// Human-readable name
    pub name: String,
    /// Kind of concept
    #[serde(rename = "type")]
    pub concept_type: ConceptType,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Extraction or generation confidence in [0, 1]
    pub confidence: f64,
}

impl Concept {
    /// Create a concept with an empty description and full confidence
    pub fn new(id: impl Into<ConceptId>, name: impl Into<String>, concept_type: ConceptType) -> Self {
        Concept {
            id: id.into(),
            name: name.into(),
            concept_type,
            description: String::new(),
            confidence: 1.0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn is_hypothesis(&self) -> bool {
        self.concept_type == ConceptType::Hypothesis
    }
}
