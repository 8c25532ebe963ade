//! Chat request type and the provider capabilities the crate is built on.
//!
//! This module provides:
//! - [`ChatRequest`]: model identifier plus ordered, role-tagged messages
//! - [`ChatProvider`]: opens a streaming completion for a request
//! - [`DeltaSource`]: the open stream, pulled one text delta at a time
//!
//! Concrete providers live under [`crate::llms`]; [`crate::mock`] offers a
//! scripted one for tests.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::message::Message;

/// A streaming chat completion request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier (e.g., "gpt-3.5-turbo").
    #[serde(default)]
    pub model: String,

    /// Conversation messages, in order.
    #[serde(default)]
    pub messages: Vec<Message>,

    /// Whether to stream the response.
    #[serde(default)]
    pub stream: bool,
}

impl ChatRequest {
    /// Creates a new request with the specified model.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Adds a system message.
    #[must_use]
    pub fn system(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::system(content));
        self
    }

    /// Adds a user message.
    #[must_use]
    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::user(content));
        self
    }

    /// Enables or disables streaming.
    #[must_use]
    pub const fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}

/// An open completion stream yielding incremental text deltas.
///
/// Implementations are pulled by a single consumer. `recv` returns
/// `Ok(None)` once the provider signals end-of-stream; any other failure is an
/// error. The owner must call [`close`](Self::close) when done with the source.
#[async_trait]
pub trait DeltaSource: Send {
    /// Receive the next text delta.
    async fn recv(&mut self) -> Result<Option<String>, LlmError>;

    /// Release the underlying connection.
    fn close(&mut self);
}

/// Boxed delta source, as handed out by providers.
pub type BoxedDeltaSource = Box<dyn DeltaSource>;

/// A service able to open streaming chat completions.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Open a streaming completion for `request`.
    async fn open_stream(&self, request: &ChatRequest) -> Result<BoxedDeltaSource, LlmError>;

    /// Provider name used in logs and errors.
    fn provider_name(&self) -> &'static str;
}

/// Shared chat provider.
pub type SharedChatProvider = Arc<dyn ChatProvider>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;

    #[test]
    fn test_request_builder() {
        let request = ChatRequest::new("gpt-3.5-turbo")
            .system("Be brief.")
            .user("Hello!")
            .stream(true);

        assert_eq!(request.model, "gpt-3.5-turbo");
        assert!(request.stream);
        let roles: Vec<Role> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, [Role::System, Role::User]);
    }
}
