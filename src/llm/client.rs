//! LLM client for hypothesis generation

use crate::config::{LLMConfig, LLMProvider};
use crate::hypothesis::PromptContext;
use crate::llm::{LLMError, LLMResult, TextGenerator};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a creative research scientist who proposes novel, \
testable hypotheses connecting scientific concepts. You must respond with valid JSON only.";

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

pub struct LLMClient {
    client: Client,
    config: LLMConfig,
    api_base_url: String,
}

impl LLMClient {
    pub fn new(config: &LLMConfig) -> LLMResult<Self> {
        if config.provider != LLMProvider::Ollama && config.api_key.is_none() {
            return Err(LLMError::ConfigError(format!(
                "{:?} requires an API key",
                config.provider
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LLMError::ConfigError(e.to_string()))?;

        let api_base_url = config
            .api_base_url
            .clone()
            .unwrap_or_else(|| config.provider.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            config: config.clone(),
            api_base_url,
        })
    }

    pub fn provider(&self) -> LLMProvider {
        self.config.provider
    }

    pub fn model(&self) -> &str {
        self.config.model_name()
    }

    fn system_prompt(&self) -> String {
        self.config
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string())
    }

    fn api_key(&self) -> LLMResult<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| LLMError::ConfigError(format!("{:?} requires an API key", self.config.provider)))
    }

    /// Send a prompt and return the raw response text
    pub async fn generate(&self, prompt: &str, temperature: f64) -> LLMResult<String> {
        debug!(
            "Requesting completion from {:?} ({}), {} prompt chars",
            self.config.provider,
            self.model(),
            prompt.len()
        );
        match self.config.provider {
            LLMProvider::Ollama => self.ollama_chat(prompt, temperature).await,
            LLMProvider::OpenAI => self.openai_chat(prompt, temperature).await,
            LLMProvider::Anthropic => self.anthropic_messages(prompt, temperature).await,
            LLMProvider::Gemini => self.gemini_generate(prompt, temperature).await,
        }
    }

    async fn ollama_chat(&self, prompt: &str, temperature: f64) -> LLMResult<String> {
        #[derive(Serialize)]
        struct Options {
            temperature: f64,
            num_predict: u32,
        }

        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            messages: Vec<Message>,
            format: &'a str,
            stream: bool,
            options: Options,
        }

        #[derive(Deserialize)]
        struct Response {
            message: MessageContent,
        }

        #[derive(Deserialize)]
        struct MessageContent {
            content: String,
        }

        let url = format!("{}/api/chat", self.api_base_url);
        let resp = self
            .client
            .post(&url)
            .json(&Request {
                model: self.model(),
                messages: vec![
                    Message { role: "system".to_string(), content: self.system_prompt() },
                    Message { role: "user".to_string(), content: prompt.to_string() },
                ],
                format: "json",
                stream: false,
                options: Options {
                    temperature,
                    num_predict: self.config.max_tokens,
                },
            })
            .send()
            .await
            .map_err(|e| LLMError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LLMError::ApiError(format!("Ollama error: {}", resp.status())));
        }

        let result: Response = resp
            .json()
            .await
            .map_err(|e| LLMError::SerializationError(e.to_string()))?;
        Ok(result.message.content)
    }

    async fn openai_chat(&self, prompt: &str, temperature: f64) -> LLMResult<String> {
        #[derive(Serialize)]
        struct ResponseFormat {
            #[serde(rename = "type")]
            kind: &'static str,
        }

        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            messages: Vec<Message>,
            temperature: f64,
            max_tokens: u32,
            response_format: ResponseFormat,
        }

        #[derive(Deserialize)]
        struct Response {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: MessageContent,
        }

        #[derive(Deserialize)]
        struct MessageContent {
            content: Option<String>,
        }

        let api_key = self.api_key()?;
        let url = format!("{}/chat/completions", self.api_base_url);
        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&Request {
                model: self.model(),
                messages: vec![
                    Message { role: "system".to_string(), content: self.system_prompt() },
                    Message { role: "user".to_string(), content: prompt.to_string() },
                ],
                temperature,
                max_tokens: self.config.max_tokens,
                response_format: ResponseFormat { kind: "json_object" },
            })
            .send()
            .await
            .map_err(|e| LLMError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LLMError::ApiError(format!("OpenAI error: {}", resp.status())));
        }

        let result: Response = resp
            .json()
            .await
            .map_err(|e| LLMError::SerializationError(e.to_string()))?;
        Ok(result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    async fn anthropic_messages(&self, prompt: &str, temperature: f64) -> LLMResult<String> {
        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            system: String,
            messages: Vec<Message>,
            temperature: f64,
            max_tokens: u32,
        }

        #[derive(Deserialize)]
        struct Response {
            content: Vec<Block>,
        }

        #[derive(Deserialize)]
        struct Block {
            #[serde(default)]
            text: String,
        }

        let api_key = self.api_key()?;
        let url = format!("{}/messages", self.api_base_url);
        let resp = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&Request {
                model: self.model(),
                system: self.system_prompt(),
                messages: vec![Message {
                    role: "user".to_string(),
                    content: format!("{}\n\nRespond with valid JSON only.", prompt),
                }],
                temperature,
                max_tokens: self.config.max_tokens,
            })
            .send()
            .await
            .map_err(|e| LLMError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(LLMError::ApiError(format!("Anthropic error {}: {}", status, text)));
        }

        let result: Response = resp
            .json()
            .await
            .map_err(|e| LLMError::SerializationError(e.to_string()))?;
        Ok(result.content.into_iter().map(|b| b.text).collect())
    }

    async fn gemini_generate(&self, prompt: &str, temperature: f64) -> LLMResult<String> {
        #[derive(Serialize)]
        struct Request {
            contents: Vec<Content>,
            #[serde(rename = "generationConfig")]
            generation_config: GenerationConfig,
        }

        #[derive(Serialize, Deserialize)]
        struct Content {
            role: Option<String>,
            parts: Vec<Part>,
        }

        #[derive(Serialize, Deserialize)]
        struct Part {
            text: String,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct GenerationConfig {
            temperature: f64,
            max_output_tokens: u32,
            response_mime_type: &'static str,
        }

        #[derive(Deserialize)]
        struct Response {
            candidates: Option<Vec<Candidate>>,
        }

        #[derive(Deserialize)]
        struct Candidate {
            content: Content,
        }

        let api_key = self.api_key()?;
        // No separate system role on this endpoint; prepend the instruction
        let full_prompt = format!("{}\n\n{}", self.system_prompt(), prompt);

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base_url,
            self.model(),
            api_key
        );

        let resp = self
            .client
            .post(&url)
            .json(&Request {
                contents: vec![Content {
                    role: Some("user".to_string()),
                    parts: vec![Part { text: full_prompt }],
                }],
                generation_config: GenerationConfig {
                    temperature,
                    max_output_tokens: self.config.max_tokens,
                    response_mime_type: "application/json",
                },
            })
            .send()
            .await
            .map_err(|e| LLMError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(LLMError::ApiError(format!("Gemini error: {}", text)));
        }

        let result: Response = resp
            .json()
            .await
            .map_err(|e| LLMError::SerializationError(e.to_string()))?;

        if let Some(candidates) = result.candidates {
            if let Some(first) = candidates.first() {
                if let Some(part) = first.content.parts.first() {
                    return Ok(part.text.clone());
                }
            }
        }

        Ok(String::new())
    }
}

#[async_trait]
impl TextGenerator for LLMClient {
    async fn generate_structured(&self, prompt: &PromptContext, temperature: f64) -> LLMResult<String> {
        self.generate(&prompt.render(), temperature).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hosted_providers_require_key() {
        let config = LLMConfig {
            provider: LLMProvider::OpenAI,
            ..Default::default()
        };
        assert!(matches!(LLMClient::new(&config), Err(LLMError::ConfigError(_))));
    }

    #[test]
    fn test_defaults_resolved() {
        let client = LLMClient::new(&LLMConfig::default()).unwrap();
        assert_eq!(client.provider(), LLMProvider::Ollama);
        assert_eq!(client.model(), "llama3.1:8b");
        assert_eq!(client.api_base_url, "http://localhost:11434");

        let config = LLMConfig {
            provider: LLMProvider::Gemini,
            api_key: Some("k".to_string()),
            api_base_url: Some("http://proxy.local/v1beta/".to_string()),
            model: "gemini-pro".to_string(),
            ..Default::default()
        };
        let client = LLMClient::new(&config).unwrap();
        assert_eq!(client.api_base_url, "http://proxy.local/v1beta");
        assert_eq!(client.model(), "gemini-pro");
    }
}
