//! Hypothesis generation
//!
//! Prompt construction, response parsing with bounded retries, and the
//! engine that runs one flat round of generation over a concept graph.

pub mod engine;
pub mod generator;
pub mod parser;
pub mod prompt;
pub mod record;

pub use engine::{EngineParams, GenerationBudget, HypothesisEngine, Unlimited};
pub use generator::{FailureReason, Generated, GenerationFailure, HypothesisGenerator};
pub use parser::{extract_json_object, parse_hypothesis};
pub use prompt::PromptContext;
pub use record::{HypothesisRecord, QualityThresholds};
