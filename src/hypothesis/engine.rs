//! Hypothesis engine
//!
//! One flat round: analyze the graph, predict candidate links, generate a
//! hypothesis per candidate in ranked order until the quota is met, filter
//! by quality thresholds and package the survivors as a layer.
//!
//! Candidates are dispatched in waves of at most `max_concurrent` calls,
//! never more than the remaining quota. Results are consumed in ranked
//! order, so the accepted set does not depend on completion order.

use super::generator::HypothesisGenerator;
use super::prompt::PromptContext;
use super::record::QualityThresholds;
use crate::algo::SimilarityMetric;
use crate::analytics::{CentralityMetric, GraphAnalytics};
use crate::config::{ConfigResult, ExplorationConfig};
use crate::explore::{HypothesisLayer, LayerHypothesis, LayerMetadata, LayerSpec};
use crate::graph::{ConceptGraph, ConceptId};
use crate::predict::{CandidateLink, LinkPredictor, PredictionOptions};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Parameters of one engine round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineParams {
    pub method: SimilarityMetric,
    pub top_n: usize,
    pub min_similarity: f64,
    pub cross_domain_only: bool,
    pub focus_on_central_concepts: bool,
    pub central_concepts: usize,
    pub per_concept: usize,
    pub max_hypotheses: usize,
    pub thresholds: QualityThresholds,
    pub temperature: f64,
    pub max_concurrent: usize,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            method: SimilarityMetric::Jaccard,
            top_n: 30,
            min_similarity: 0.0,
            cross_domain_only: false,
            focus_on_central_concepts: false,
            central_concepts: 20,
            per_concept: 5,
            max_hypotheses: 10,
            thresholds: QualityThresholds::default(),
            temperature: 0.7,
            max_concurrent: 4,
        }
    }
}

impl EngineParams {
    /// Root-layer parameters from a validated configuration
    pub fn from_config(config: &ExplorationConfig) -> ConfigResult<Self> {
        Ok(Self {
            method: config.prediction.metric()?,
            top_n: config.prediction.top_n,
            min_similarity: config.prediction.min_similarity,
            cross_domain_only: config.prediction.cross_domain_only,
            focus_on_central_concepts: config.prediction.focus_on_central_concepts,
            central_concepts: config.prediction.central_concepts,
            per_concept: config.prediction.per_concept,
            max_hypotheses: config.generation.max_hypotheses,
            thresholds: config.generation.thresholds,
            temperature: config.generation.temperature,
            max_concurrent: config.generation.max_concurrent.max(1),
        })
    }

    /// Same parameters with a different hypothesis quota
    pub fn with_max_hypotheses(mut self, max_hypotheses: usize) -> Self {
        self.max_hypotheses = max_hypotheses;
        self
    }
}

/// Run-wide limits consulted by the engine. Implementations must be safe
/// to share between concurrently running rounds.
pub trait GenerationBudget: Send + Sync {
    /// Whether a new candidate may be started
    fn allows_generation(&self) -> bool;
    fn record_calls(&self, calls: usize);
    fn record_failure(&self);
    /// Claim room for one accepted hypothesis; false once the cap is reached
    fn record_accepted(&self) -> bool;
}

/// No limits
pub struct Unlimited;

impl GenerationBudget for Unlimited {
    fn allows_generation(&self) -> bool {
        true
    }
    fn record_calls(&self, _calls: usize) {}
    fn record_failure(&self) {}
    fn record_accepted(&self) -> bool {
        true
    }
}

pub struct HypothesisEngine {
    generator: HypothesisGenerator,
}

impl HypothesisEngine {
    pub fn new(generator: HypothesisGenerator) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &HypothesisGenerator {
        &self.generator
    }

    /// Candidate links for one round (analytics supplies the focus concepts)
    pub fn candidates(
        &self,
        graph: &ConceptGraph,
        analytics: &GraphAnalytics<'_>,
        params: &EngineParams,
        excluded_pairs: &HashSet<(ConceptId, ConceptId)>,
    ) -> Vec<CandidateLink> {
        let predictor = LinkPredictor::new(graph);
        let options = PredictionOptions {
            method: params.method,
            top_n: params.top_n,
            min_similarity: params.min_similarity,
            cross_domain_only: params.cross_domain_only,
            excluded_pairs: excluded_pairs.clone(),
            ..Default::default()
        };

        if params.focus_on_central_concepts {
            let central: Vec<ConceptId> = analytics
                .top_concepts(CentralityMetric::PageRank, params.central_concepts)
                .into_iter()
                .map(|r| r.id)
                .collect();
            predictor.predict_for_concepts(&central, params.per_concept, &options)
        } else {
            predictor.predict(&options)
        }
    }

    /// Produce one pending layer from `graph`
    pub async fn run(
        &self,
        graph: &ConceptGraph,
        params: &EngineParams,
        spec: LayerSpec,
        excluded_pairs: &HashSet<(ConceptId, ConceptId)>,
        budget: &dyn GenerationBudget,
    ) -> HypothesisLayer {
        info!(
            "Starting hypothesis round for layer {} ({}): {} concepts",
            spec.layer_id,
            spec.branch_name,
            graph.concept_count()
        );

        // Step 1: analyze graph
        let analytics = GraphAnalytics::new(graph);
        let graph_analysis = analytics.analyze();

        // Step 2: candidate links
        let candidates = self.candidates(graph, &analytics, params, excluded_pairs);
        debug!("{} candidate links for layer {}", candidates.len(), spec.layer_id);

        // Step 3-4: generate and filter
        let mut accepted: Vec<LayerHypothesis> = Vec::new();
        let mut generation_calls = 0;
        let mut generation_failures = 0;
        let mut rejected = 0;
        let mut budget_exhausted = false;
        let mut next = 0;

        while accepted.len() < params.max_hypotheses && next < candidates.len() {
            let wave_size = params
                .max_concurrent
                .max(1)
                .min(params.max_hypotheses - accepted.len())
                .min(candidates.len() - next);

            let mut wave = Vec::with_capacity(wave_size);
            for link in &candidates[next..next + wave_size] {
                if !budget.allows_generation() {
                    budget_exhausted = true;
                    break;
                }
                wave.push(link);
            }
            if wave.is_empty() {
                break;
            }
            next += wave.len();

            let contexts: Vec<PromptContext> = wave
                .iter()
                .map(|link| PromptContext::from_candidate(link, graph))
                .collect();
            let results = join_all(
                wave.iter()
                    .zip(&contexts)
                    .map(|(link, ctx)| self.generator.generate(link, ctx, params.temperature)),
            )
            .await;

            for (link, result) in wave.into_iter().zip(results) {
                match result {
                    Ok(generated) => {
                        generation_calls += generated.attempts;
                        budget.record_calls(generated.attempts);
                        if !params.thresholds.accepts(&generated.record) {
                            debug!("Hypothesis '{}' below quality thresholds", generated.record.title);
                            rejected += 1;
                            continue;
                        }
                        if !budget.record_accepted() {
                            budget_exhausted = true;
                            continue;
                        }
                        accepted.push(LayerHypothesis::new(generated.record, link.clone()));
                    }
                    Err(failure) => {
                        generation_calls += failure.attempts;
                        generation_failures += 1;
                        budget.record_calls(failure.attempts);
                        budget.record_failure();
                        warn!("{}", failure);
                    }
                }
            }

            if budget_exhausted {
                warn!("Run budget exhausted during layer {}", spec.layer_id);
                break;
            }
        }

        if params.thresholds.is_active() {
            info!(
                "Filtered {} hypotheses to {} (novelty>={}, feasibility>={}, impact>={})",
                accepted.len() + rejected,
                accepted.len(),
                params.thresholds.min_novelty,
                params.thresholds.min_feasibility,
                params.thresholds.min_impact
            );
        }

        // Step 5: rank (stable, so equal scores keep candidate order)
        accepted.sort_by(|a, b| {
            b.combined_score
                .partial_cmp(&a.combined_score)
                .unwrap_or(Ordering::Equal)
        });

        info!(
            "Layer {} produced {} hypotheses ({} failures, {} rejected)",
            spec.layer_id,
            accepted.len(),
            generation_failures,
            rejected
        );

        let metadata = LayerMetadata {
            created_at: chrono::Utc::now(),
            graph_analysis,
            num_candidates: candidates.len(),
            generation_calls,
            generation_failures,
            rejected_by_thresholds: rejected,
            budget_exhausted,
            params: params.clone(),
        };
        HypothesisLayer::new(spec, accepted, metadata)
    }
}
