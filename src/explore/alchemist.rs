//! Recursive alchemist
//!
//! Grows an exploration tree breadth-first from a seed graph. Each layer
//! moves `Pending -> Expanded -> (Terminal | Branched)`; a branched layer
//! queues one task per branch, and queued tasks run in chunks of at most
//! `max_concurrent_branches`. Every task owns its graph snapshot, so
//! siblings never share mutable state beyond the [`RunContext`].

use super::branch::{partition, BranchingCriterion};
use super::budget::RunContext;
use super::expand::{augmented_graph, branch_graph, expand_layer};
use super::layer::{
    ExplorationTree, HypothesisLayer, LayerMetadata, LayerSpec, LayerState, RunMetadata, TerminationReason,
};
use crate::analytics::GraphAnalysis;
use crate::config::{ConfigResult, ExplorationConfig};
use crate::graph::{ConceptGraph, ConceptId};
use crate::hypothesis::{EngineParams, HypothesisEngine, HypothesisGenerator};
use crate::llm::TextGenerator;
use futures::future::join_all;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info};

/// Minimum hypotheses a branch needs to seed a child layer
const MIN_BRANCH_SIZE: usize = 2;

type PairSet = HashSet<(ConceptId, ConceptId)>;

/// A child layer waiting to be generated
struct BranchTask {
    spec: LayerSpec,
    graph: ConceptGraph,
    /// Pairs already explored by ancestors
    explored: PairSet,
}

pub struct RecursiveAlchemist {
    engine: HypothesisEngine,
    config: ExplorationConfig,
    root_params: EngineParams,
    branch_params: EngineParams,
    criterion: BranchingCriterion,
}

impl RecursiveAlchemist {
    /// Validates `config` and derives the per-layer parameters
    pub fn new(engine: HypothesisEngine, config: ExplorationConfig) -> ConfigResult<Self> {
        config.validate()?;
        let root_params = EngineParams::from_config(&config)?;
        let branch_params = root_params
            .clone()
            .with_max_hypotheses(config.recursion.hypotheses_per_layer);
        let criterion = config.recursion.criterion()?;

        Ok(Self {
            engine,
            config,
            root_params,
            branch_params,
            criterion,
        })
    }

    /// Alchemist over `generator` with the configured attempt bound
    pub fn with_generator(generator: Arc<dyn TextGenerator>, config: ExplorationConfig) -> ConfigResult<Self> {
        let generator = HypothesisGenerator::new(generator).with_max_attempts(config.generation.max_attempts);
        Self::new(HypothesisEngine::new(generator), config)
    }

    pub fn config(&self) -> &ExplorationConfig {
        &self.config
    }

    /// Run the whole exploration. Never fails: generation problems show up
    /// as empty or terminal layers.
    pub async fn explore(&self, graph: &ConceptGraph) -> ExplorationTree {
        let started_at = chrono::Utc::now();
        let run = RunContext::new(&self.config.budget);
        let recursion = &self.config.recursion;

        info!(
            "Starting exploration: max_depth={}, branches_per_layer={}, criterion={}, max_attempts={}",
            recursion.max_depth,
            recursion.branches_per_layer,
            self.criterion,
            self.engine.generator().max_attempts()
        );

        let mut layers = Vec::new();
        let mut queue: VecDeque<BranchTask> = VecDeque::new();

        let explored = PairSet::new();
        let root = self
            .engine
            .run(graph, &self.root_params, LayerSpec::root(), &explored, &run)
            .await;
        self.settle(root, graph, explored, &run, &mut layers, &mut queue);

        let chunk_size = recursion.max_concurrent_branches.max(1);
        while !queue.is_empty() {
            if run.is_exhausted() {
                // No new rounds once the budget is spent
                let skipped: Vec<BranchTask> = queue.drain(..).collect();
                info!("Budget exhausted, closing {} queued branch layer(s)", skipped.len());
                for task in skipped {
                    let layer = self.skipped_layer(task.spec);
                    self.settle(layer, &task.graph, task.explored, &run, &mut layers, &mut queue);
                }
                break;
            }

            let chunk: Vec<BranchTask> = queue.drain(..chunk_size.min(queue.len())).collect();
            debug!("Running {} branch layer(s), {} queued", chunk.len(), queue.len());

            let results = join_all(chunk.iter().map(|task| {
                self.engine
                    .run(&task.graph, &self.branch_params, task.spec.clone(), &task.explored, &run)
            }))
            .await;

            for (task, layer) in chunk.into_iter().zip(results) {
                self.settle(layer, &task.graph, task.explored, &run, &mut layers, &mut queue);
            }
        }

        let counters = run.snapshot();
        let tree = ExplorationTree::new(
            layers,
            RunMetadata {
                started_at,
                finished_at: chrono::Utc::now(),
                generation_calls: counters.generation_calls,
                generation_failures: counters.generation_failures,
                total_hypotheses: counters.total_hypotheses,
                budget_exhausted: counters.budget_exhausted,
                config: self.config.clone(),
            },
        );

        info!(
            "Exploration complete: {} layers, {} hypotheses, depth {}",
            tree.len(),
            tree.total_hypotheses(),
            tree.depth()
        );
        tree
    }

    /// Expand a freshly generated layer, then either terminate it or queue
    /// its branches
    fn settle(
        &self,
        mut layer: HypothesisLayer,
        graph: &ConceptGraph,
        explored: PairSet,
        run: &RunContext,
        layers: &mut Vec<HypothesisLayer>,
        queue: &mut VecDeque<BranchTask>,
    ) {
        expand_layer(&mut layer);

        match self.termination(&layer, run) {
            Some(reason) => {
                debug!("Layer {} terminal: {:?}", layer.layer_id, reason);
                layer.terminate(reason);
            }
            None => {
                let branches: Vec<_> = partition(&layer.hypotheses, self.criterion, self.config.recursion.branches_per_layer)
                    .into_iter()
                    .filter(|b| b.len() >= MIN_BRANCH_SIZE)
                    .collect();

                if branches.is_empty() {
                    layer.terminate(TerminationReason::TooFewHypotheses);
                } else {
                    let augmented = augmented_graph(graph, &layer);
                    let mut child_explored = explored;
                    child_explored.extend(layer.hypotheses.iter().map(|h| h.link.pair()));

                    let ids = run.allocate_layer_ids(branches.len());
                    for (branch, layer_id) in branches.iter().zip(ids) {
                        info!(
                            "Layer {} -> layer {} ({}, {} hypotheses)",
                            layer.layer_id,
                            layer_id,
                            branch.name,
                            branch.len()
                        );
                        queue.push_back(BranchTask {
                            spec: LayerSpec {
                                layer_id,
                                parent_layer_id: Some(layer.layer_id),
                                branch_name: branch.name.clone(),
                                depth: layer.depth + 1,
                            },
                            graph: branch_graph(&augmented, &layer, branch),
                            explored: child_explored.clone(),
                        });
                    }
                    layer.state = LayerState::Branched;
                }
            }
        }

        layers.push(layer);
    }

    /// Empty layer for a branch that never ran
    fn skipped_layer(&self, spec: LayerSpec) -> HypothesisLayer {
        let metadata = LayerMetadata {
            created_at: chrono::Utc::now(),
            graph_analysis: GraphAnalysis::default(),
            num_candidates: 0,
            generation_calls: 0,
            generation_failures: 0,
            rejected_by_thresholds: 0,
            budget_exhausted: true,
            params: self.branch_params.clone(),
        };
        HypothesisLayer::new(spec, Vec::new(), metadata)
    }

    fn termination(&self, layer: &HypothesisLayer, run: &RunContext) -> Option<TerminationReason> {
        if layer.hypotheses.is_empty() {
            Some(if layer.metadata.budget_exhausted {
                TerminationReason::BudgetExhausted
            } else {
                TerminationReason::NoHypotheses
            })
        } else if layer.depth >= self.config.recursion.max_depth {
            Some(TerminationReason::MaxDepth)
        } else if layer.hypotheses.len() < MIN_BRANCH_SIZE {
            Some(TerminationReason::TooFewHypotheses)
        } else if run.is_exhausted() {
            Some(TerminationReason::BudgetExhausted)
        } else {
            None
        }
    }
}
