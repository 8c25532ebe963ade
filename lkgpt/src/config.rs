//! Completion configuration.

use crate::error::{Error, Result};

/// Fixed settings shared by every completion of a [`ChatCompletion`](crate::ChatCompletion).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionConfig {
    /// Language code the assistant answers in (e.g., "en-US").
    pub language: String,
    /// Model identifier sent with each request.
    pub model: String,
    /// Name the assistant introduces itself with.
    pub assistant_name: String,
}

impl CompletionConfig {
    /// Default answer language.
    pub const DEFAULT_LANGUAGE: &'static str = "en-US";
    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "gpt-3.5-turbo";
    /// Default assistant name.
    pub const DEFAULT_ASSISTANT_NAME: &'static str = "LiveGPT";

    /// Creates a configuration answering in `language`.
    #[must_use]
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            ..Self::default()
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Reads from:
    /// - `LKGPT_LANGUAGE` - Optional answer language
    /// - `LKGPT_MODEL` - Optional model
    /// - `LKGPT_ASSISTANT_NAME` - Optional assistant name
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable is set but blank.
    pub fn from_env() -> Result<Self> {
        let read = |key: &str, default: &str| -> Result<String> {
            match std::env::var(key) {
                Ok(value) if value.trim().is_empty() => {
                    Err(Error::config(format!("{key} is set but empty")))
                }
                Ok(value) => Ok(value),
                Err(_) => Ok(default.to_owned()),
            }
        };

        Ok(Self {
            language: read("LKGPT_LANGUAGE", Self::DEFAULT_LANGUAGE)?,
            model: read("LKGPT_MODEL", Self::DEFAULT_MODEL)?,
            assistant_name: read("LKGPT_ASSISTANT_NAME", Self::DEFAULT_ASSISTANT_NAME)?,
        })
    }

    /// Sets the answer language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the assistant name.
    #[must_use]
    pub fn with_assistant_name(mut self, name: impl Into<String>) -> Self {
        self.assistant_name = name.into();
        self
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            language: Self::DEFAULT_LANGUAGE.to_owned(),
            model: Self::DEFAULT_MODEL.to_owned(),
            assistant_name: Self::DEFAULT_ASSISTANT_NAME.to_owned(),
        }
    }
}
