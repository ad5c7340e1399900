//! Prompt context for hypothesis generation

use crate::graph::ConceptGraph;
use crate::predict::CandidateLink;
use serde::{Deserialize, Serialize};

const MAX_LISTED_NEIGHBORS: usize = 5;
const NO_DESCRIPTION: &str = "No description available";

/// Everything the generator is told about one candidate link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptContext {
    pub source_name: String,
    pub source_type: String,
    pub source_description: String,
    pub target_name: String,
    pub target_type: String,
    pub target_description: String,
    /// Similarity score formatted to 4 decimals
    pub similarity_score: String,
    /// Up to five common-neighbor names, then "..." when truncated
    pub common_neighbors: String,
    pub num_common_neighbors: usize,
}

fn or_placeholder(description: &str) -> String {
    if description.trim().is_empty() {
        NO_DESCRIPTION.to_string()
    } else {
        description.to_string()
    }
}

impl PromptContext {
    /// Build the context for `link`, resolving neighbor names through `graph`
    pub fn from_candidate(link: &CandidateLink, graph: &ConceptGraph) -> Self {
        let mut names: Vec<String> = link
            .common_neighbors
            .iter()
            .take(MAX_LISTED_NEIGHBORS)
            .map(|id| {
                graph
                    .concept(id)
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| id.to_string())
            })
            .collect();
        if link.common_neighbors.len() > MAX_LISTED_NEIGHBORS {
            names.push("...".to_string());
        }

        PromptContext {
            source_name: link.source_name.clone(),
            source_type: link.source_type.to_string(),
            source_description: or_placeholder(&link.source_description),
            target_name: link.target_name.clone(),
            target_type: link.target_type.to_string(),
            target_description: or_placeholder(&link.target_description),
            similarity_score: format!("{:.4}", link.score),
            common_neighbors: names.join(", "),
            num_common_neighbors: link.common_neighbors.len(),
        }
    }

    /// Full prompt text sent to the generative service
    pub fn render(&self) -> String {
        let neighbors = if self.common_neighbors.is_empty() {
            "none"
        } else {
            self.common_neighbors.as_str()
        };

        format!(
            r#"Two concepts from a scientific knowledge graph are not yet connected, but their graph neighborhoods suggest they could be.

Concept A: {source_name} ({source_type})
Description: {source_description}

Concept B: {target_name} ({target_type})
Description: {target_description}

Structural similarity: {score}
Shared neighbors ({count}): {neighbors}

Propose one novel, testable research hypothesis connecting Concept A and Concept B.
Respond with a single JSON object of this shape:
{{
  "hypothesis": {{
    "title": "short title",
    "rationale": "why the connection is plausible",
    "research_direction": "what to investigate",
    "mechanism": "proposed mechanism linking the two concepts",
    "next_steps": ["step 1", "step 2", "step 3"],
    "novelty_score": 0.0,
    "feasibility_score": 0.0,
    "impact_score": 0.0,
    "keywords": ["keyword"]
  }}
}}
All scores are numbers between 0 and 1."#,
            source_name = self.source_name,
            source_type = self.source_type,
            source_description = self.source_description,
            target_name = self.target_name,
            target_type = self.target_type,
            target_description = self.target_description,
            score = self.similarity_score,
            count = self.num_common_neighbors,
            neighbors = neighbors,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Concept, ConceptId, ConceptType};

    fn link(neighbors: usize) -> CandidateLink {
        CandidateLink {
            source_id: "gnn".into(),
            target_id: "soil".into(),
            score: 0.123456,
            source_type: ConceptType::Method,
            target_type: ConceptType::Material,
            source_name: "Graph Neural Network".to_string(),
            target_name: "Soil Microbiome".to_string(),
            source_description: "Message passing on graphs".to_string(),
            target_description: String::new(),
            common_neighbors: (0..neighbors).map(|i| ConceptId::new(format!("n{}", i))).collect(),
        }
    }

    #[test]
    fn test_context_fields() {
        let mut graph = ConceptGraph::new();
        graph.add_concept(Concept::new("n0", "Network Theory", ConceptType::Theory)).unwrap();

        let ctx = PromptContext::from_candidate(&link(2), &graph);
        assert_eq!(ctx.similarity_score, "0.1235");
        assert_eq!(ctx.common_neighbors, "Network Theory, n1");
        assert_eq!(ctx.num_common_neighbors, 2);
        assert_eq!(ctx.target_description, NO_DESCRIPTION);
        assert_eq!(ctx.source_type, "method");
    }

    #[test]
    fn test_neighbor_list_truncated() {
        let ctx = PromptContext::from_candidate(&link(7), &ConceptGraph::new());
        assert_eq!(ctx.common_neighbors, "n0, n1, n2, n3, n4, ...");
        assert_eq!(ctx.num_common_neighbors, 7);

        let prompt = ctx.render();
        assert!(prompt.contains("Shared neighbors (7): n0, n1, n2, n3, n4, ..."));
        assert!(prompt.contains("\"novelty_score\""));
    }
}
