//! Sentence-streaming chat completions.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::chat::{ChatProvider, SharedChatProvider};
use crate::config::CompletionConfig;
use crate::error::{Error, Result};
use crate::message::Sentence;
use crate::prompt::PromptComposer;
use crate::stream::SentenceStream;

/// Answers prompts in the context of a conversation, one sentence at a time.
///
/// # Example
///
/// ```rust,ignore
/// use lkgpt::prelude::*;
///
/// let completion = ChatCompletion::new(OpenAI::from_env()?, CompletionConfig::new("en-US"));
/// let cancel = CancellationToken::new();
///
/// let mut stream = completion.complete(&cancel, &history, "What's new?").await?;
/// loop {
///     match stream.next_sentence().await {
///         Ok(sentence) => speak(&sentence),
///         Err(err) if err.is_exhausted() => break,
///         Err(err) => return Err(err),
///     }
/// }
/// stream.close();
/// ```
#[derive(Clone)]
pub struct ChatCompletion {
    provider: SharedChatProvider,
    composer: PromptComposer,
}

impl ChatCompletion {
    /// Create a completion front end over `provider`.
    #[must_use]
    pub fn new(provider: impl ChatProvider + 'static, config: CompletionConfig) -> Self {
        Self::from_shared(Arc::new(provider), config)
    }

    /// Create a completion front end over an already shared provider.
    #[must_use]
    pub const fn from_shared(provider: SharedChatProvider, config: CompletionConfig) -> Self {
        Self {
            provider,
            composer: PromptComposer::new(config),
        }
    }

    /// The composer used to build requests.
    #[must_use]
    pub const fn composer(&self) -> &PromptComposer {
        &self.composer
    }

    /// Open a completion for `prompt` and return its sentence stream.
    ///
    /// The returned stream stops with [`Error::Cancelled`] as soon as `cancel`
    /// fires; the caller still owns it and should [`close`](SentenceStream::close) it.
    ///
    /// # Errors
    ///
    /// - [`Error::UpstreamOpen`] if the provider fails to open the stream.
    /// - [`Error::Cancelled`] if `cancel` fires before the stream is open.
    pub async fn complete(
        &self,
        cancel: &CancellationToken,
        history: &[Sentence],
        prompt: &str,
    ) -> Result<SentenceStream> {
        let request = self.composer.compose(history, prompt);
        let provider = self.provider.provider_name();

        let opened = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            opened = self.provider.open_stream(&request) => Some(opened),
        };

        match opened {
            Some(Ok(source)) => {
                debug!(
                    provider,
                    history = history.len(),
                    model = %request.model,
                    "completion stream opened"
                );
                Ok(SentenceStream::new(source, cancel.clone()))
            }
            Some(Err(err)) => {
                error!(provider, error = %err, "error creating chat completion stream");
                Err(Error::UpstreamOpen(err))
            }
            None => {
                debug!(provider, "completion cancelled before the stream opened");
                Err(Error::Cancelled)
            }
        }
    }
}

impl std::fmt::Debug for ChatCompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletion")
            .field("provider", &self.provider.provider_name())
            .field("composer", &self.composer)
            .finish()
    }
}
