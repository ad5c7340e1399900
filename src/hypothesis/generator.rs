//! Hypothesis generator
//!
//! Turns one candidate link into a validated [`HypothesisRecord`] through
//! the injected [`TextGenerator`]. Parse, validation and transport failures
//! are retried up to `max_attempts`; after that the candidate is reported
//! as a [`GenerationFailure`] value. No placeholder record is ever produced.

use super::parser::parse_hypothesis;
use super::prompt::PromptContext;
use super::record::HypothesisRecord;
use crate::graph::ConceptId;
use crate::llm::{LLMError, TextGenerator};
use crate::predict::CandidateLink;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a single attempt failed
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    /// The service call itself failed
    Transport(LLMError),
    /// No JSON object could be extracted
    Parse(String),
    /// JSON found but a field is missing or out of range
    Validation(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Transport(e) => write!(f, "transport: {}", e),
            FailureReason::Parse(msg) => write!(f, "parse: {}", msg),
            FailureReason::Validation(msg) => write!(f, "validation: {}", msg),
        }
    }
}

/// Candidate skipped after exhausting its attempts
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Generation failed for {source_id} <-> {target_id} after {attempts} attempt(s): {reason}")]
pub struct GenerationFailure {
    pub source_id: ConceptId,
    pub target_id: ConceptId,
    pub attempts: usize,
    pub reason: FailureReason,
}

/// Successful generation together with the number of calls it took
#[derive(Debug, Clone)]
pub struct Generated {
    pub record: HypothesisRecord,
    pub attempts: usize,
}

pub struct HypothesisGenerator {
    generator: Arc<dyn TextGenerator>,
    max_attempts: usize,
}

impl HypothesisGenerator {
    /// Default bound: one attempt plus two retries
    pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub async fn generate(
        &self,
        candidate: &CandidateLink,
        context: &PromptContext,
        temperature: f64,
    ) -> Result<Generated, GenerationFailure> {
        info!(
            "Generating hypothesis for: {} <-> {}",
            candidate.source_name, candidate.target_name
        );

        let mut last_reason = FailureReason::Parse("no attempt made".to_string());
        for attempt in 1..=self.max_attempts {
            let reason = match self.generator.generate_structured(context, temperature).await {
                Ok(text) => match parse_hypothesis(&text) {
                    Ok(record) => {
                        debug!("Accepted response on attempt {}", attempt);
                        return Ok(Generated { record, attempts: attempt });
                    }
                    Err(reason) => reason,
                },
                Err(e) => FailureReason::Transport(e),
            };
            warn!(
                "Attempt {}/{} for {} <-> {} failed: {}",
                attempt, self.max_attempts, candidate.source_id, candidate.target_id, reason
            );
            last_reason = reason;
        }

        Err(GenerationFailure {
            source_id: candidate.source_id.clone(),
            target_id: candidate.target_id.clone(),
            attempts: self.max_attempts,
            reason: last_reason,
        })
    }
}
