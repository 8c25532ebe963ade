//! OpenAI API client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::chat::ChatRequest;
use crate::error::LlmError;
use crate::message::Message;

use super::config::OpenAIConfig;
use super::types::{OpenAIChatRequest, OpenAIErrorResponse, OpenAIMessage};

/// OpenAI API client.
#[derive(Debug, Clone)]
pub struct OpenAI {
    pub(crate) config: Arc<OpenAIConfig>,
    pub(crate) client: Client,
}

impl OpenAI {
    /// Create a new OpenAI client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or the HTTP client cannot be built.
    pub fn new(config: OpenAIConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() {
            return Err(LlmError::auth("openai", "API key is required"));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(timeout));
        }

        let client = builder
            .build()
            .map_err(|e| LlmError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Create a client from environment variables.
    ///
    /// # Errors
    ///
    /// See [`OpenAIConfig::from_env`] and [`OpenAI::new`].
    pub fn from_env() -> Result<Self, LlmError> {
        let config = OpenAIConfig::from_env()?;
        Self::new(config)
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Build the chat completions URL.
    pub(crate) fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Build request headers for JSON requests.
    pub(crate) fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream");

        if let Some(org) = &self.config.organization {
            req = req.header("OpenAI-Organization", org);
        }

        req
    }

    /// Convert Message to OpenAI format.
    pub(crate) fn convert_message(msg: &Message) -> OpenAIMessage {
        OpenAIMessage {
            role: msg.role.as_str().to_owned(),
            content: msg.content.clone(),
        }
    }

    /// Build the request body.
    pub(crate) fn build_body(request: &ChatRequest) -> OpenAIChatRequest {
        OpenAIChatRequest {
            model: request.model.clone(),
            messages: request.messages.iter().map(Self::convert_message).collect(),
            stream: request.stream,
        }
    }

    /// Parse an error response from OpenAI.
    pub(crate) fn parse_error(status: u16, body: &str) -> LlmError {
        if let Ok(error_response) = serde_json::from_str::<OpenAIErrorResponse>(body) {
            let error = error_response.error;

            return match status {
                401 | 403 => LlmError::auth("openai", error.message),
                429 => LlmError::rate_limited("openai"),
                _ => LlmError::provider_code(
                    "openai",
                    error
                        .code
                        .or(error.error_type)
                        .unwrap_or_else(|| status.to_string()),
                    error.message,
                ),
            };
        }

        LlmError::http_status(status, body.to_owned())
    }
}
