//! LLM backend implementations.
//!
//! # Available Backends
//!
//! - [`openai`] - OpenAI Chat Completions API and compatible servers

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::{OpenAI, OpenAIConfig};
