//! OpenAI client configuration.

use crate::error::LlmError;

/// Configuration for the OpenAI client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAIConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Base URL for the API (defaults to OpenAI's API).
    pub base_url: String,
    /// Optional organization ID.
    pub organization: Option<String>,
    /// Connection timeout in seconds.
    ///
    /// Only bounds connecting: completions are streamed and may legitimately
    /// run for a long time.
    pub connect_timeout_secs: Option<u64>,
}

impl OpenAIConfig {
    /// Default OpenAI API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";

    /// Creates a new configuration with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Reads from:
    /// - `OPENAI_API_KEY` - Required API key
    /// - `OPENAI_BASE_URL` - Optional base URL
    /// - `OPENAI_ORGANIZATION` - Optional organization ID
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Auth`] if `OPENAI_API_KEY` is not set.
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| LlmError::auth("openai", "OPENAI_API_KEY environment variable not set"))?;

        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_owned());

        let organization = std::env::var("OPENAI_ORGANIZATION").ok();

        Ok(Self {
            api_key,
            base_url,
            organization,
            ..Self::default()
        })
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the organization ID.
    #[must_use]
    pub fn with_organization(mut self, org: impl Into<String>) -> Self {
        self.organization = Some(org.into());
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = Some(secs);
        self
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            organization: None,
            connect_timeout_secs: Some(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = OpenAIConfig::new("test-key");
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, OpenAIConfig::DEFAULT_BASE_URL);
        assert_eq!(config.connect_timeout_secs, Some(30));
    }

    #[test]
    fn test_config_builder() {
        let config = OpenAIConfig::new("key")
            .with_base_url("http://localhost:8080/v1")
            .with_organization("org-1")
            .with_connect_timeout(5);

        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.organization.as_deref(), Some("org-1"));
        assert_eq!(config.connect_timeout_secs, Some(5));
    }
}
