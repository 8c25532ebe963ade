//! Scripted provider implementation for testing.
//!
//! [`MockProvider`] opens [`MockDeltaSource`]s that replay a fixed list of
//! [`MockEvent`]s, so sentence handling can be exercised without network
//! access.
//!
//! # Example
//!
//! ```rust,ignore
//! use lkgpt::mock::{MockEvent, MockProvider};
//!
//! let provider = MockProvider::new(MockEvent::deltas(["Hello", " world."]));
//! // Every opened stream yields "Hello", " world." and then ends.
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::chat::{BoxedDeltaSource, ChatProvider, ChatRequest, DeltaSource};
use crate::error::LlmError;

/// One scripted step of a mock stream.
#[derive(Debug, Clone)]
pub enum MockEvent {
    /// Yield a text delta.
    Delta(String),
    /// Fail the pull with the given error.
    Fail(LlmError),
    /// Never complete the pull.
    Hang,
}

impl MockEvent {
    /// Creates a delta event.
    #[must_use]
    pub fn delta(text: impl Into<String>) -> Self {
        Self::Delta(text.into())
    }

    /// Creates one delta event per item.
    #[must_use]
    pub fn deltas<I, S>(texts: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts.into_iter().map(Self::delta).collect()
    }
}

#[derive(Debug, Default)]
struct SourceState {
    events: Vec<MockEvent>,
    position: AtomicUsize,
    recvs: AtomicUsize,
    closes: AtomicUsize,
}

/// A delta source replaying scripted events, then signalling end-of-stream.
///
/// Clones share state, so a test can keep a handle to inspect how the source
/// was used after handing it to a [`SentenceStream`](crate::SentenceStream).
#[derive(Debug, Clone, Default)]
pub struct MockDeltaSource {
    state: Arc<SourceState>,
}

impl MockDeltaSource {
    /// Create a source replaying `events`.
    #[must_use]
    pub fn new(events: Vec<MockEvent>) -> Self {
        Self {
            state: Arc::new(SourceState {
                events,
                ..SourceState::default()
            }),
        }
    }

    /// Number of pulls that actually ran.
    #[must_use]
    pub fn recv_count(&self) -> usize {
        self.state.recvs.load(Ordering::SeqCst)
    }

    /// Number of times [`close`](DeltaSource::close) was called.
    #[must_use]
    pub fn close_count(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeltaSource for MockDeltaSource {
    async fn recv(&mut self) -> Result<Option<String>, LlmError> {
        self.state.recvs.fetch_add(1, Ordering::SeqCst);
        let index = self.state.position.fetch_add(1, Ordering::SeqCst);

        match self.state.events.get(index) {
            Some(MockEvent::Delta(text)) => Ok(Some(text.clone())),
            Some(MockEvent::Fail(err)) => Err(err.clone()),
            Some(MockEvent::Hang) => futures::future::pending().await,
            None => Ok(None),
        }
    }

    fn close(&mut self) {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// A provider whose streams replay the same scripted events.
///
/// Records the last request it was asked to open and every source it handed
/// out.
#[derive(Debug, Default)]
pub struct MockProvider {
    events: Vec<MockEvent>,
    open_error: Option<LlmError>,
    hang_on_open: bool,
    last_request: Mutex<Option<ChatRequest>>,
    opened: Mutex<Vec<MockDeltaSource>>,
}

impl MockProvider {
    /// Create a provider whose streams replay `events`.
    #[must_use]
    pub fn new(events: Vec<MockEvent>) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    /// Create a provider that refuses to open streams.
    #[must_use]
    pub fn failing(err: LlmError) -> Self {
        Self {
            open_error: Some(err),
            ..Self::default()
        }
    }

    /// Create a provider whose `open_stream` never completes.
    #[must_use]
    pub fn hanging() -> Self {
        Self {
            hang_on_open: true,
            ..Self::default()
        }
    }

    /// The most recent request passed to `open_stream`.
    #[must_use]
    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request.lock().ok().and_then(|guard| guard.clone())
    }

    /// Handles to every source opened so far.
    #[must_use]
    pub fn opened(&self) -> Vec<MockDeltaSource> {
        self.opened
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    async fn open_stream(&self, request: &ChatRequest) -> Result<BoxedDeltaSource, LlmError> {
        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some(request.clone());
        }
        if self.hang_on_open {
            futures::future::pending::<()>().await;
        }
        if let Some(err) = &self.open_error {
            return Err(err.clone());
        }

        let source = MockDeltaSource::new(self.events.clone());
        if let Ok(mut guard) = self.opened.lock() {
            guard.push(source.clone());
        }
        Ok(Box::new(source))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_source_replays_events() {
        let mut source = MockDeltaSource::new(vec![
            MockEvent::delta("a"),
            MockEvent::Fail(LlmError::stream("x")),
        ]);

        assert_eq!(source.recv().await, Ok(Some("a".to_owned())));
        assert_eq!(source.recv().await, Err(LlmError::stream("x")));
        assert_eq!(source.recv().await, Ok(None));
        assert_eq!(source.recv().await, Ok(None));
        assert_eq!(source.recv_count(), 4);
    }

    #[tokio::test]
    async fn test_mock_provider_records_request() {
        let provider = MockProvider::new(MockEvent::deltas(["Hi."]));
        let request = ChatRequest::new("mock-model").user("ping");

        let mut source = provider.open_stream(&request).await.expect("open");
        source.close();

        assert_eq!(provider.last_request(), Some(request));
        assert_eq!(provider.opened().len(), 1);
        assert_eq!(provider.opened()[0].close_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_provider_failing() {
        let provider = MockProvider::failing(LlmError::auth("mock", "bad key"));
        let result = provider.open_stream(&ChatRequest::default()).await;
        assert!(matches!(result, Err(LlmError::Auth { .. })));
        assert!(provider.opened().is_empty());
    }
}
