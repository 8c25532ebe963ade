//! OpenAI ChatProvider implementation.

use async_trait::async_trait;
use tracing::debug;

use crate::chat::{BoxedDeltaSource, ChatProvider, ChatRequest};
use crate::error::LlmError;

use super::client::OpenAI;
use super::stream::OpenAIDeltaSource;

#[async_trait]
impl ChatProvider for OpenAI {
    async fn open_stream(&self, request: &ChatRequest) -> Result<BoxedDeltaSource, LlmError> {
        let url = self.chat_url();
        let mut body = Self::build_body(request);
        body.stream = true;

        debug!(
            %url,
            model = %body.model,
            messages = body.messages.len(),
            "opening chat completion stream"
        );
        let response = self.build_request(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::parse_error(status.as_u16(), &error_text));
        }

        Ok(Box::new(OpenAIDeltaSource::new(response)))
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
