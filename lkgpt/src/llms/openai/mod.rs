//! OpenAI API client implementation.
//!
//! This module provides a streaming chat completion provider for the OpenAI
//! API and servers that speak the same protocol.

mod chat;
mod client;
mod config;
mod stream;
mod types;

pub use client::OpenAI;
pub use config::OpenAIConfig;
pub use stream::OpenAIDeltaSource;
