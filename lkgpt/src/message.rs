//! Message types exchanged with completion providers.
//!
//! [`Message`] is a role-tagged chunk of a request. [`Sentence`] is one
//! attributed utterance of the caller's conversation history.

use serde::{Deserialize, Serialize};

/// Role of a message in a completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions and injected context.
    System,
    /// The end user's prompt.
    User,
    /// A previous model answer.
    Assistant,
}

impl Role {
    /// Get the wire representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A role-tagged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who the message is attributed to.
    pub role: Role,
    /// Text content.
    pub content: String,
}

impl Message {
    /// Create a message with the given role.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// One utterance of the conversation, attributed to a speaker.
///
/// Histories are ordered chronologically; the crate only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// Display name of the speaker.
    pub name: String,
    /// What the speaker said.
    pub transcript: String,
}

impl Sentence {
    /// Create a sentence.
    #[must_use]
    pub fn new(name: impl Into<String>, transcript: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transcript: transcript.into(),
        }
    }
}
