//! OpenAI API request and response types.
//!
//! Internal wire types for the streaming Chat Completions API.

use serde::{Deserialize, Serialize};

/// OpenAI chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct OpenAIChatRequest {
    pub model: String,
    pub messages: Vec<OpenAIMessage>,
    pub stream: bool,
}

/// OpenAI message format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenAIMessage {
    pub role: String,
    pub content: String,
}

/// OpenAI streaming chunk.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIStreamChunk {
    #[serde(default)]
    pub choices: Vec<OpenAIStreamChoice>,
}

/// OpenAI stream choice.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIStreamChoice {
    #[serde(default)]
    pub delta: OpenAIStreamDelta,
}

/// OpenAI stream delta.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAIStreamDelta {
    #[serde(default)]
    pub content: Option<String>,
}

/// OpenAI error response.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIErrorResponse {
    pub error: OpenAIError,
}

/// OpenAI error details.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIError {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = OpenAIChatRequest {
            model: "gpt-3.5-turbo".to_owned(),
            messages: vec![OpenAIMessage {
                role: "user".to_owned(),
                content: "Hello".to_owned(),
            }],
            stream: true,
        };

        let json = serde_json::to_value(&request).expect("serialization should succeed");
        assert_eq!(
            json,
            serde_json::json!({
                "model": "gpt-3.5-turbo",
                "messages": [{"role": "user", "content": "Hello"}],
                "stream": true
            })
        );
    }

    #[test]
    fn test_chunk_deserialization() {
        let json = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion.chunk",
            "created": 1677858242,
            "model": "gpt-3.5-turbo",
            "choices": [{"index": 0, "delta": {"role": "assistant"}, "finish_reason": null}]
        }"#;

        let chunk: OpenAIStreamChunk =
            serde_json::from_str(json).expect("deserialization should succeed");
        assert_eq!(chunk.choices.len(), 1);
        assert!(chunk.choices[0].delta.content.is_none());
    }
}
