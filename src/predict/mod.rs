//! Link prediction
//!
//! Scores non-adjacent concept pairs by neighborhood similarity and
//! returns ranked candidate links. Pairs are canonical (`source_id <
//! target_id`), so a pair is never reported in both orders.
//!
//! Ranking is by score descending, ties by `(source_id, target_id)`
//! ascending. The dense view indexes concepts in id order, which lets the
//! tie-break run on indices.

use crate::algo::{self, ConceptView, SimilarityMetric, UnknownMetric};
use crate::graph::{ConceptGraph, ConceptId, ConceptType};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PredictError {
    #[error("{0}")]
    UnknownMethod(String),
}

impl From<UnknownMetric> for PredictError {
    fn from(e: UnknownMetric) -> Self {
        PredictError::UnknownMethod(e.to_string())
    }
}

pub type PredictResult<T> = Result<T, PredictError>;

/// Parse a similarity method name (`jaccard`, `adamic_adar`, ...)
pub fn parse_method(name: &str) -> PredictResult<SimilarityMetric> {
    Ok(name.parse::<SimilarityMetric>()?)
}

/// Canonical, order-independent key of a concept pair
pub fn pair_key(a: &ConceptId, b: &ConceptId) -> (ConceptId, ConceptId) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

/// A scored, currently unconnected concept pair plus the context needed to
/// ask for a hypothesis about it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateLink {
    pub source_id: ConceptId,
    pub target_id: ConceptId,
    pub score: f64,
    pub source_type: ConceptType,
    pub target_type: ConceptType,
    pub source_name: String,
    pub target_name: String,
    #[serde(default)]
    pub source_description: String,
    #[serde(default)]
    pub target_description: String,
    /// Shared neighbors, ascending
    #[serde(default)]
    pub common_neighbors: Vec<ConceptId>,
}

impl CandidateLink {
    pub fn is_cross_domain(&self) -> bool {
        self.source_type != self.target_type
    }

    pub fn pair(&self) -> (ConceptId, ConceptId) {
        pair_key(&self.source_id, &self.target_id)
    }
}

/// Parameters of one prediction query
#[derive(Debug, Clone)]
pub struct PredictionOptions {
    pub method: SimilarityMetric,
    pub top_n: usize,
    pub min_similarity: f64,
    pub cross_domain_only: bool,
    /// When non-empty, at least one endpoint must have one of these types
    pub type_filter: Vec<ConceptType>,
    /// Pairs (canonical, see [`pair_key`]) that must not be proposed
    pub excluded_pairs: HashSet<(ConceptId, ConceptId)>,
}

impl Default for PredictionOptions {
    fn default() -> Self {
        Self {
            method: SimilarityMetric::Jaccard,
            top_n: 30,
            min_similarity: 0.0,
            cross_domain_only: false,
            type_filter: Vec::new(),
            excluded_pairs: HashSet::new(),
        }
    }
}

/// Link predictor over one graph snapshot
pub struct LinkPredictor<'a> {
    graph: &'a ConceptGraph,
    view: ConceptView,
    types: Vec<ConceptType>,
}

impl<'a> LinkPredictor<'a> {
    pub fn new(graph: &'a ConceptGraph) -> Self {
        let view = algo::build_view(graph);
        let types = view
            .ids()
            .iter()
            .map(|id| {
                graph
                    .concept(id)
                    .map(|c| c.concept_type)
                    .unwrap_or(ConceptType::Unknown)
            })
            .collect();
        Self { graph, view, types }
    }

    /// Similarity of two concepts by id (0 for unknown ids)
    pub fn score(&self, method: SimilarityMetric, a: &ConceptId, b: &ConceptId) -> f64 {
        match (self.view.index_of(a), self.view.index_of(b)) {
            (Some(u), Some(v)) => algo::similarity(&self.view.view, method, u, v),
            _ => 0.0,
        }
    }

    /// Top candidate links across all non-adjacent pairs
    pub fn predict(&self, options: &PredictionOptions) -> Vec<CandidateLink> {
        info!("Calculating {} similarity scores...", options.method);

        let scored = algo::score_non_adjacent_pairs(&self.view.view, options.method, options.min_similarity);
        let total = scored.len();

        let mut kept: Vec<(usize, usize, f64)> = scored
            .into_iter()
            .filter(|&(u, v, _)| self.admits(u, v, options))
            .collect();
        rank(&mut kept);
        kept.truncate(options.top_n);

        debug!("{} scored pairs, {} after filters", total, kept.len());
        info!("Generated {} link predictions", kept.len());

        kept.into_iter().map(|(u, v, s)| self.candidate(u, v, s)).collect()
    }

    /// "Unexplored connections" of focus concepts: the best `per_concept`
    /// non-neighbors of each, merged, deduplicated and re-ranked.
    pub fn predict_for_concepts(
        &self,
        concepts: &[ConceptId],
        per_concept: usize,
        options: &PredictionOptions,
    ) -> Vec<CandidateLink> {
        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        let mut merged: Vec<(usize, usize, f64)> = Vec::new();

        for concept in concepts {
            let Some(focus) = self.view.index_of(concept) else {
                warn!("Concept '{}' not found in graph", concept);
                continue;
            };

            let mut scored: Vec<(usize, usize, f64)> = (0..self.view.len())
                .into_par_iter()
                .filter(|&v| v != focus && !self.view.view.are_adjacent(focus, v))
                .map(|v| {
                    let (u, v) = if focus < v { (focus, v) } else { (v, focus) };
                    (u, v, algo::similarity(&self.view.view, options.method, u, v))
                })
                .filter(|&(u, v, s)| s >= options.min_similarity && self.admits(u, v, options))
                .collect();
            rank(&mut scored);

            for entry in scored.into_iter().take(per_concept) {
                if seen.insert((entry.0, entry.1)) {
                    merged.push(entry);
                }
            }
        }

        rank(&mut merged);
        merged.truncate(options.top_n);
        info!(
            "Generated {} predictions for {} focus concepts",
            merged.len(),
            concepts.len()
        );
        merged.into_iter().map(|(u, v, s)| self.candidate(u, v, s)).collect()
    }

    fn admits(&self, u: usize, v: usize, options: &PredictionOptions) -> bool {
        let (tu, tv) = (self.types[u], self.types[v]);
        if options.cross_domain_only && tu == tv {
            return false;
        }
        if !options.type_filter.is_empty()
            && !options.type_filter.contains(&tu)
            && !options.type_filter.contains(&tv)
        {
            return false;
        }
        if !options.excluded_pairs.is_empty() {
            let key = (self.view.id(u).clone(), self.view.id(v).clone());
            if options.excluded_pairs.contains(&key) {
                return false;
            }
        }
        true
    }

    fn candidate(&self, u: usize, v: usize, score: f64) -> CandidateLink {
        let source_id = self.view.id(u).clone();
        let target_id = self.view.id(v).clone();
        let source = self.graph.concept(&source_id);
        let target = self.graph.concept(&target_id);

        let common: BTreeSet<ConceptId> = algo::sorted_intersection(
            self.view.view.neighbors(u),
            self.view.view.neighbors(v),
        )
        .into_iter()
        .map(|z| self.view.id(z).clone())
        .collect();

        CandidateLink {
            source_type: self.types[u],
            target_type: self.types[v],
            source_name: source.map(|c| c.name.clone()).unwrap_or_else(|| source_id.to_string()),
            target_name: target.map(|c| c.name.clone()).unwrap_or_else(|| target_id.to_string()),
            source_description: source.map(|c| c.description.clone()).unwrap_or_default(),
            target_description: target.map(|c| c.description.clone()).unwrap_or_default(),
            common_neighbors: common.into_iter().collect(),
            source_id,
            target_id,
            score,
        }
    }
}

/// Score descending, then `(u, v)` ascending
fn rank(pairs: &mut [(usize, usize, f64)]) {
    pairs.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(Ordering::Equal)
            .then_with(|| (a.0, a.1).cmp(&(b.0, b.1)))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Concept, Relationship};

    fn abc() -> ConceptGraph {
        let mut graph = ConceptGraph::new();
        graph.add_concept(Concept::new("A", "Alpha", ConceptType::Method)).unwrap();
        graph.add_concept(Concept::new("B", "Beta", ConceptType::Theory)).unwrap();
        graph.add_concept(Concept::new("C", "Gamma", ConceptType::Material)).unwrap();
        graph.add_relationship(Relationship::new("A", "C", "uses")).unwrap();
        graph.add_relationship(Relationship::new("B", "C", "explains")).unwrap();
        graph
    }

    #[test]
    fn test_jaccard_example() {
        let graph = abc();
        let predictor = LinkPredictor::new(&graph);
        let options = PredictionOptions {
            cross_domain_only: true,
            ..Default::default()
        };

        let links = predictor.predict(&options);
        assert_eq!(links.len(), 1);
        let top = &links[0];
        assert_eq!((top.source_id.as_str(), top.target_id.as_str()), ("A", "B"));
        assert_eq!(top.score, 1.0);
        assert_eq!(top.common_neighbors, vec![ConceptId::from("C")]);
        assert_eq!(top.source_name, "Alpha");
        assert!(top.is_cross_domain());
    }

    #[test]
    fn test_excluded_and_type_filter() {
        let graph = abc();
        let predictor = LinkPredictor::new(&graph);

        let mut options = PredictionOptions::default();
        options.excluded_pairs.insert(pair_key(&"B".into(), &"A".into()));
        assert!(predictor.predict(&options).is_empty());

        let options = PredictionOptions {
            type_filter: vec![ConceptType::Phenomenon],
            ..Default::default()
        };
        assert!(predictor.predict(&options).is_empty());
    }

    #[test]
    fn test_predict_for_concepts_merges_and_dedups() {
        let mut graph = abc();
        graph.add_concept(Concept::new("D", "Delta", ConceptType::Method)).unwrap();
        graph.add_relationship(Relationship::new("D", "C", "uses")).unwrap();
        let predictor = LinkPredictor::new(&graph);

        let focus = vec![ConceptId::from("A"), ConceptId::from("B"), ConceptId::from("missing")];
        let links = predictor.predict_for_concepts(&focus, 5, &PredictionOptions::default());

        let pairs: Vec<(&str, &str)> = links
            .iter()
            .map(|l| (l.source_id.as_str(), l.target_id.as_str()))
            .collect();
        // A-B appears once although both A and B propose it
        assert_eq!(pairs, vec![("A", "B"), ("A", "D"), ("B", "D")]);
    }

    #[test]
    fn test_parse_method() {
        assert_eq!(parse_method("resource_allocation").unwrap(), SimilarityMetric::ResourceAllocation);
        assert!(matches!(parse_method("katz"), Err(PredictError::UnknownMethod(_))));
    }
}
