//! Layer expansion
//!
//! Accepted hypotheses become synthetic concepts wired to the two concepts
//! they connect. Child layers run on a private graph built from a branch's
//! synthetic nodes and their context.

use super::branch::Branch;
use super::layer::{HypothesisLayer, LayerState};
use crate::graph::{Concept, ConceptGraph, ConceptId, ConceptType, RelationType, Relationship};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Id of the synthetic concept for hypothesis `index` of layer `layer_id`
pub fn synthetic_id(layer_id: usize, index: usize) -> ConceptId {
    ConceptId::new(format!("hypothesis:{}:{}", layer_id, index))
}

/// Fill `expanded_concepts` and `expanded_relationships` and mark the layer expanded
pub fn expand_layer(layer: &mut HypothesisLayer) {
    let mut concepts = Vec::with_capacity(layer.hypotheses.len());
    let mut relationships = Vec::with_capacity(layer.hypotheses.len() * 2);

    for (index, h) in layer.hypotheses.iter().enumerate() {
        let id = synthetic_id(layer.layer_id, index);
        let score = h.combined_score.clamp(0.0, 1.0);

        concepts.push(
            Concept::new(id.clone(), h.hypothesis.title.clone(), ConceptType::Hypothesis)
                .with_description(h.hypothesis.rationale.clone())
                .with_confidence(score),
        );
        for endpoint in [&h.link.source_id, &h.link.target_id] {
            relationships.push(
                Relationship::new(id.clone(), endpoint.clone(), RelationType::hypothesized_connection())
                    .with_confidence(score)
                    .with_context(h.hypothesis.mechanism.clone()),
            );
        }
    }

    debug!(
        "Expanded layer {} into {} concepts, {} relationships",
        layer.layer_id,
        concepts.len(),
        relationships.len()
    );
    layer.expanded_concepts = concepts;
    layer.expanded_relationships = relationships;
    layer.state = LayerState::Expanded;
}

/// Copy of `graph` with the layer's synthetic concepts and relationships added
pub fn augmented_graph(graph: &ConceptGraph, layer: &HypothesisLayer) -> ConceptGraph {
    let mut augmented = graph.snapshot();
    for concept in &layer.expanded_concepts {
        if let Err(e) = augmented.add_concept(concept.clone()) {
            warn!("Skipping synthetic concept: {}", e);
        }
    }
    for relationship in &layer.expanded_relationships {
        if let Err(e) = augmented.add_relationship(relationship.clone()) {
            warn!("Skipping synthetic relationship: {}", e);
        }
    }
    augmented
}

/// Private graph for one branch: its synthetic concepts, their source and
/// target concepts, and every relationship among them in `augmented`
pub fn branch_graph(augmented: &ConceptGraph, layer: &HypothesisLayer, branch: &Branch) -> ConceptGraph {
    let mut ids = BTreeSet::new();
    for &index in &branch.members {
        let Some(h) = layer.hypotheses.get(index) else {
            continue;
        };
        ids.insert(synthetic_id(layer.layer_id, index));
        ids.insert(h.link.source_id.clone());
        ids.insert(h.link.target_id.clone());
    }
    augmented.subgraph(&ids)
}
