use crate::config::Config;
use crate::error::ApiError;
use crate::models::{ChatMessage, MessagesRequest, MessagesResponse};
use tracing::{debug, warn};
use ureq::{Agent, AgentBuilder};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

/// A text-in, text-out generative model
#[cfg_attr(test, mockall::automock)]
pub trait LanguageModel {
    fn complete(&self, instruction: &str) -> Result<String, ApiError>;
}

/// Anthropic Messages API client
pub struct AnthropicClient {
    agent: Agent,
    api_url: String,
    api_key: String,
    model: String,
}

impl AnthropicClient {
    pub fn new(config: &Config) -> Self {
        let agent = AgentBuilder::new().timeout(config.http_timeout).build();

        AnthropicClient {
            agent,
            api_url: config.anthropic_url.clone(),
            api_key: config.anthropic_api_key.clone(),
            model: config.anthropic_model.clone(),
        }
    }
}

impl LanguageModel for AnthropicClient {
    fn complete(&self, instruction: &str) -> Result<String, ApiError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: vec![ChatMessage {
                role: "user",
                content: instruction,
            }],
        };

        debug!("Requesting completion from {}", self.model);

        let response = self
            .agent
            .post(&self.api_url)
            .set("x-api-key", &self.api_key)
            .set("anthropic-version", ANTHROPIC_VERSION)
            .set("content-type", "application/json")
            .send_json(&request)?;

        let parsed: MessagesResponse = response.into_json()?;

        if parsed.stop_reason.as_deref() == Some("max_tokens") {
            warn!("Model reply was truncated at {MAX_TOKENS} tokens");
        }

        let text = parsed.text();
        if text.trim().is_empty() {
            return Err(ApiError::Decode("reply contained no text".to_string()));
        }
        Ok(text)
    }
}
