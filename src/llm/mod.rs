//! Generative text service
//!
//! The exploration core talks to the service through [`TextGenerator`],
//! a single-method seam. [`client::LLMClient`] is the HTTP implementation;
//! tests inject scripted fakes.

pub mod client;

use crate::hypothesis::PromptContext;
use async_trait::async_trait;
use thiserror::Error;

pub use client::LLMClient;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LLMError {
    #[error("LLM API error: {0}")]
    ApiError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type LLMResult<T> = Result<T, LLMError>;

/// Black-box structured text generation
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Render `prompt` and return the raw response text. The caller parses
    /// and validates it; implementations only report transport problems.
    async fn generate_structured(&self, prompt: &PromptContext, temperature: f64) -> LLMResult<String>;
}
