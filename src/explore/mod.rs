//! Recursive exploration
//!
//! Layers of hypotheses arranged in a tree: the root comes from the seed
//! graph, every other layer from a branch of its parent's hypotheses.

pub mod alchemist;
pub mod branch;
pub mod budget;
pub mod expand;
pub mod layer;

pub use alchemist::RecursiveAlchemist;
pub use branch::{partition, Branch, BranchingCriterion, BranchingError};
pub use budget::{RunContext, RunCounters};
pub use expand::{augmented_graph, branch_graph, expand_layer, synthetic_id};
pub use layer::{
    ExplorationTree, HypothesisLayer, LayerHypothesis, LayerMetadata, LayerSpec, LayerState, RunMetadata,
    TerminationReason,
};
