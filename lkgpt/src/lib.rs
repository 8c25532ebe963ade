//! lkgpt - streaming chat completions, one sentence at a time.
//!
//! This crate turns a conversation history and a prompt into a streaming chat
//! completion request and hands the answer back as complete sentences, ready to
//! be spoken by a voice assistant.
//!
//! - [`PromptComposer`] builds the request (instructions, transcript, prompt).
//! - [`SentenceStream`] aggregates streamed text deltas into sentences.
//! - [`ChatCompletion`] ties both to a [`ChatProvider`] such as
//!   [`llms::OpenAI`].

pub mod chat;
pub mod completion;
pub mod config;
pub mod error;
pub mod llms;
pub mod message;
pub mod mock;
pub mod prelude;
pub mod prompt;
pub mod stream;

pub use chat::{BoxedDeltaSource, ChatProvider, ChatRequest, DeltaSource, SharedChatProvider};
pub use completion::ChatCompletion;
pub use config::CompletionConfig;
pub use error::{Error, LlmError, Result};
pub use message::{Message, Role, Sentence};
pub use prompt::{PromptComposer, transcript};
pub use stream::SentenceStream;
