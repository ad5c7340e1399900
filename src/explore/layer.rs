//! Hypothesis layers and the exploration tree

use crate::analytics::GraphAnalysis;
use crate::config::ExplorationConfig;
use crate::graph::{Concept, Relationship};
use crate::hypothesis::{EngineParams, HypothesisRecord};
use crate::predict::CandidateLink;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

/// Lifecycle of a layer: `Pending -> Expanded -> (Terminal | Branched)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerState {
    Pending,
    Expanded,
    Terminal,
    Branched,
}

/// Why a layer did not branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    MaxDepth,
    NoHypotheses,
    TooFewHypotheses,
    BudgetExhausted,
}

/// An accepted hypothesis with the candidate it was generated for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerHypothesis {
    pub hypothesis: HypothesisRecord,
    pub link: CandidateLink,
    pub combined_score: f64,
}

impl LayerHypothesis {
    pub fn new(hypothesis: HypothesisRecord, link: CandidateLink) -> Self {
        let combined_score = hypothesis.combined_score();
        Self {
            hypothesis,
            link,
            combined_score,
        }
    }
}

/// Identity of a layer about to be generated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSpec {
    pub layer_id: usize,
    pub parent_layer_id: Option<usize>,
    pub branch_name: String,
    pub depth: usize,
}

impl LayerSpec {
    pub fn root() -> Self {
        Self {
            layer_id: 0,
            parent_layer_id: None,
            branch_name: "root".to_string(),
            depth: 0,
        }
    }
}

/// Bookkeeping of the round that produced a layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerMetadata {
    pub created_at: DateTime<Utc>,
    pub graph_analysis: GraphAnalysis,
    pub num_candidates: usize,
    pub generation_calls: usize,
    pub generation_failures: usize,
    pub rejected_by_thresholds: usize,
    /// The run budget stopped this round before candidates ran out
    pub budget_exhausted: bool,
    pub params: EngineParams,
}

/// One round of hypothesis generation at a position in the tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HypothesisLayer {
    pub layer_id: usize,
    pub parent_layer_id: Option<usize>,
    pub branch_name: String,
    pub depth: usize,
    pub state: LayerState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination: Option<TerminationReason>,
    /// Sorted by combined score, descending
    pub hypotheses: Vec<LayerHypothesis>,
    pub expanded_concepts: Vec<Concept>,
    pub expanded_relationships: Vec<Relationship>,
    pub metadata: LayerMetadata,
}

impl HypothesisLayer {
    pub fn new(spec: LayerSpec, hypotheses: Vec<LayerHypothesis>, metadata: LayerMetadata) -> Self {
        Self {
            layer_id: spec.layer_id,
            parent_layer_id: spec.parent_layer_id,
            branch_name: spec.branch_name,
            depth: spec.depth,
            state: LayerState::Pending,
            termination: None,
            hypotheses,
            expanded_concepts: Vec::new(),
            expanded_relationships: Vec::new(),
            metadata,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_layer_id.is_none()
    }

    pub fn terminate(&mut self, reason: TerminationReason) {
        self.state = LayerState::Terminal;
        self.termination = Some(reason);
    }
}

/// Counters and settings of a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub generation_calls: usize,
    pub generation_failures: usize,
    pub total_hypotheses: usize,
    pub budget_exhausted: bool,
    pub config: ExplorationConfig,
}

/// Layers ordered by id, forming a tree rooted at layer 0
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationTree {
    pub layers: Vec<HypothesisLayer>,
    pub metadata: RunMetadata,
}

impl ExplorationTree {
    pub fn new(mut layers: Vec<HypothesisLayer>, metadata: RunMetadata) -> Self {
        layers.sort_by_key(|l| l.layer_id);
        Self { layers, metadata }
    }

    pub fn root(&self) -> Option<&HypothesisLayer> {
        self.layers.iter().find(|l| l.is_root())
    }

    pub fn layer(&self, layer_id: usize) -> Option<&HypothesisLayer> {
        self.layers
            .binary_search_by_key(&layer_id, |l| l.layer_id)
            .ok()
            .map(|idx| &self.layers[idx])
    }

    pub fn children(&self, layer_id: usize) -> Vec<&HypothesisLayer> {
        self.layers
            .iter()
            .filter(|l| l.parent_layer_id == Some(layer_id))
            .collect()
    }

    /// Layers without children
    pub fn leaves(&self) -> Vec<&HypothesisLayer> {
        let parents: BTreeSet<usize> = self.layers.iter().filter_map(|l| l.parent_layer_id).collect();
        self.layers
            .iter()
            .filter(|l| !parents.contains(&l.layer_id))
            .collect()
    }

    /// Deepest layer depth (edges from the root)
    pub fn depth(&self) -> usize {
        self.layers.iter().map(|l| l.depth).max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn total_hypotheses(&self) -> usize {
        self.layers.iter().map(|l| l.hypotheses.len()).sum()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = self
            .to_json_pretty()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)?;
        info!("Exploration tree saved to {:?}", path);
        Ok(())
    }
}
