//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lkgpt::prelude::*;
//! ```

#[cfg(feature = "openai")]
pub use crate::llms::{OpenAI, OpenAIConfig};

pub use crate::chat::{BoxedDeltaSource, ChatProvider, ChatRequest, DeltaSource, SharedChatProvider};
pub use crate::completion::ChatCompletion;
pub use crate::config::CompletionConfig;
pub use crate::error::{Error, LlmError, Result};
pub use crate::message::{Message, Role, Sentence};
pub use crate::prompt::{PromptComposer, transcript};
pub use crate::stream::SentenceStream;

pub use tokio_util::sync::CancellationToken;
