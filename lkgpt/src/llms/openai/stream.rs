//! OpenAI SSE stream parsing.

use std::pin::Pin;

use async_trait::async_trait;
use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures::{Stream, StreamExt};

use crate::chat::DeltaSource;
use crate::error::LlmError;

use super::types::{OpenAIErrorResponse, OpenAIStreamChunk};

type EventStream =
    Pin<Box<dyn Stream<Item = Result<Event, EventStreamError<reqwest::Error>>> + Send>>;

/// What a single SSE `data:` payload means for the delta stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Frame {
    /// Text content of the first choice (possibly empty).
    Delta(String),
    /// The `[DONE]` sentinel.
    Done,
    /// Nothing to report (keep-alive, usage-only chunk, ...).
    Skip,
}

/// Interpret the data of one SSE event.
pub(crate) fn parse_event(data: &str) -> Result<Frame, LlmError> {
    let data = data.trim();
    if data.is_empty() {
        return Ok(Frame::Skip);
    }
    if data == "[DONE]" {
        return Ok(Frame::Done);
    }

    if let Ok(response) = serde_json::from_str::<OpenAIErrorResponse>(data) {
        let error = response.error;
        return Err(LlmError::provider_code(
            "openai",
            error.code.or(error.error_type).unwrap_or_default(),
            error.message,
        ));
    }

    let chunk: OpenAIStreamChunk = serde_json::from_str(data).map_err(|e| {
        LlmError::response_format(
            "valid OpenAI stream chunk",
            format!("parse error: {e}, data: {data}"),
        )
    })?;

    Ok(chunk.choices.into_iter().next().map_or(Frame::Skip, |choice| {
        Frame::Delta(choice.delta.content.unwrap_or_default())
    }))
}

/// Delta source reading an OpenAI streaming response body.
///
/// Yields the content of the first choice of every chunk, ends on `[DONE]` or
/// when the body ends, and drops the connection on [`close`](DeltaSource::close).
pub struct OpenAIDeltaSource {
    events: Option<EventStream>,
    closed: bool,
}

impl OpenAIDeltaSource {
    /// Wrap a successful streaming response.
    #[must_use]
    pub fn new(response: reqwest::Response) -> Self {
        Self {
            events: Some(Box::pin(response.bytes_stream().eventsource())),
            closed: false,
        }
    }
}

#[async_trait]
impl DeltaSource for OpenAIDeltaSource {
    async fn recv(&mut self) -> Result<Option<String>, LlmError> {
        if self.closed {
            return Err(LlmError::stream("stream already closed"));
        }
        let Some(events) = self.events.as_mut() else {
            return Ok(None);
        };

        loop {
            let next = events.next().await;
            let frame = match next {
                Some(Ok(event)) => parse_event(&event.data)?,
                Some(Err(e)) => return Err(LlmError::stream(e.to_string())),
                None => Frame::Done,
            };

            match frame {
                Frame::Delta(text) => return Ok(Some(text)),
                Frame::Done => {
                    self.events = None;
                    return Ok(None);
                }
                Frame::Skip => {}
            }
        }
    }

    fn close(&mut self) {
        self.closed = true;
        self.events = None;
    }
}

impl std::fmt::Debug for OpenAIDeltaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIDeltaSource")
            .field("finished", &self.events.is_none())
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_chunk() {
        let data = r#"{"id":"chatcmpl-123","object":"chat.completion.chunk","created":1677858242,"model":"gpt-3.5-turbo","choices":[{"index":0,"delta":{"content":"Hello"},"finish_reason":null}]}"#;
        assert_eq!(parse_event(data), Ok(Frame::Delta("Hello".to_owned())));
    }

    #[test]
    fn test_parse_role_only_chunk() {
        let data = r#"{"choices":[{"index":0,"delta":{"role":"assistant"},"finish_reason":null}]}"#;
        assert_eq!(parse_event(data), Ok(Frame::Delta(String::new())));
    }

    #[test]
    fn test_parse_done_and_usage() {
        assert_eq!(parse_event(" [DONE] "), Ok(Frame::Done));
        assert_eq!(
            parse_event(r#"{"choices":[],"usage":{"total_tokens":12}}"#),
            Ok(Frame::Skip)
        );
    }

    #[test]
    fn test_parse_error_payload() {
        let data = r#"{"error":{"message":"The server had an error","type":"server_error"}}"#;
        assert!(matches!(
            parse_event(data),
            Err(LlmError::Provider { ref message, .. }) if message == "The server had an error"
        ));
        assert!(matches!(parse_event("not json"), Err(LlmError::ResponseFormat { .. })));
    }
}
