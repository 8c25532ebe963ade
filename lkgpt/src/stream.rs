//! Sentence-level view over a streaming completion.
//!
//! [`SentenceStream`] wraps an open [`DeltaSource`] and hands out one complete
//! sentence per [`next_sentence`](SentenceStream::next_sentence) call:
//!
//! ```text
//! delta "Hello"       -> (buffered)
//! delta " world."     -> "Hello world."
//! delta "Hi. Bye."    -> "Hi. Bye."
//! delta "Partial"     -> (buffered)
//! end-of-stream       -> "Partial", then Error::StreamExhausted
//! ```
//!
//! A boundary is detected only when the *newest* delta ends with a period
//! (ignoring trailing whitespace). Periods in the middle of a delta are not
//! split on, so sentence granularity follows the provider's chunking.

use futures::Stream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::chat::BoxedDeltaSource;
use crate::error::{Error, Result};

/// Character that terminates a sentence.
pub const SENTENCE_TERMINATOR: char = '.';

/// Check whether a delta closes the sentence in progress.
fn ends_sentence(delta: &str) -> bool {
    delta.trim_end().ends_with(SENTENCE_TERMINATOR)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    Exhausted,
    Failed,
    Closed,
}

/// Yields complete sentences from a streaming completion.
///
/// Pull-based and single-consumer: each call to
/// [`next_sentence`](Self::next_sentence) waits until a boundary is found, the
/// stream ends, the source fails or the cancellation token fires.
///
/// The wrapped source is released by [`close`](Self::close), or on drop if the
/// owner never called it. It is released exactly once either way.
pub struct SentenceStream {
    source: BoxedDeltaSource,
    cancel: CancellationToken,
    state: State,
}

impl SentenceStream {
    /// Wrap `source`. Pulls fail with [`Error::Cancelled`] once `cancel` fires.
    #[must_use]
    pub fn new(source: BoxedDeltaSource, cancel: CancellationToken) -> Self {
        Self {
            source,
            cancel,
            state: State::Open,
        }
    }

    /// Receive the next complete sentence.
    ///
    /// Text is returned exactly as the provider produced it, including any
    /// leading whitespace carried by the first delta.
    ///
    /// # Errors
    ///
    /// - [`Error::StreamExhausted`] once no sentence is left. Text still buffered
    ///   at end-of-stream is returned first, as a final sentence.
    /// - [`Error::UpstreamStream`] if the source fails. The partial sentence is
    ///   discarded, never returned.
    /// - [`Error::Cancelled`] if the cancellation token fired.
    /// - [`Error::Terminated`] after a failure or cancellation, and
    ///   [`Error::Closed`] after [`close`](Self::close).
    pub async fn next_sentence(&mut self) -> Result<String> {
        match self.state {
            State::Open => {}
            State::Exhausted => return Err(Error::StreamExhausted),
            State::Failed => return Err(Error::Terminated),
            State::Closed => return Err(Error::Closed),
        }

        let mut buffer = String::new();
        loop {
            let received = tokio::select! {
                biased;
                () = self.cancel.cancelled() => None,
                received = self.source.recv() => Some(received),
            };

            let Some(received) = received else {
                debug!(discarded = buffer.len(), "completion cancelled");
                self.state = State::Failed;
                return Err(Error::Cancelled);
            };

            match received {
                Ok(Some(delta)) => {
                    buffer.push_str(&delta);
                    if ends_sentence(&delta) {
                        debug!(len = buffer.len(), "sentence boundary");
                        return Ok(buffer);
                    }
                }
                Ok(None) => {
                    self.state = State::Exhausted;
                    if buffer.trim().is_empty() {
                        debug!("completion stream exhausted");
                        return Err(Error::StreamExhausted);
                    }
                    debug!(len = buffer.len(), "flushing trailing text at end of stream");
                    return Ok(buffer);
                }
                Err(err) => {
                    warn!(discarded = buffer.len(), error = %err, "completion stream failed");
                    self.state = State::Failed;
                    return Err(Error::UpstreamStream(err));
                }
            }
        }
    }

    /// Release the underlying source. Calling it again has no effect.
    pub fn close(&mut self) {
        if self.state == State::Closed {
            return;
        }
        debug!(state = ?self.state, "closing completion stream");
        self.state = State::Closed;
        self.source.close();
    }

    /// Returns `true` once no further sentence can be produced.
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        !matches!(self.state, State::Open)
    }

    /// Turn this stream into a [`futures::Stream`] of sentences.
    ///
    /// The stream ends after exhaustion or after yielding the first error.
    /// The source is closed when the returned stream is dropped.
    pub fn into_sentences(self) -> impl Stream<Item = Result<String>> + Send {
        let mut stream = self;
        async_stream::try_stream! {
            loop {
                match stream.next_sentence().await {
                    Ok(sentence) => yield sentence,
                    Err(Error::StreamExhausted) => break,
                    Err(err) => Err::<(), _>(err)?,
                }
            }
        }
    }
}

impl Drop for SentenceStream {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for SentenceStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceStream")
            .field("state", &self.state)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::mock::{MockDeltaSource, MockEvent};
    use futures::StreamExt;

    fn stream_of(events: Vec<MockEvent>) -> (SentenceStream, MockDeltaSource) {
        let source = MockDeltaSource::new(events);
        let handle = source.clone();
        (
            SentenceStream::new(Box::new(source), CancellationToken::new()),
            handle,
        )
    }

    #[test]
    fn test_sentence_end_detection() {
        assert!(ends_sentence("world."));
        assert!(ends_sentence("world.  \n"));
        assert!(!ends_sentence("Hi. Bye"));
        assert!(!ends_sentence("world!"));
        assert!(!ends_sentence(""));
        assert!(!ends_sentence("   "));
    }

    #[tokio::test]
    async fn test_buffers_until_period() {
        let (mut stream, _) = stream_of(MockEvent::deltas(["Hello", " world."]));

        assert_eq!(stream.next_sentence().await.expect("sentence"), "Hello world.");
        assert!(stream.next_sentence().await.expect_err("end").is_exhausted());
    }

    #[tokio::test]
    async fn test_multiple_sentences_in_one_delta() {
        let (mut stream, _) = stream_of(MockEvent::deltas(["Hi. Bye."]));

        assert_eq!(stream.next_sentence().await.expect("sentence"), "Hi. Bye.");
    }

    #[tokio::test]
    async fn test_period_inside_delta_is_not_a_boundary() {
        let (mut stream, _) = stream_of(MockEvent::deltas(["One. Tw", "o."]));

        assert_eq!(stream.next_sentence().await.expect("sentence"), "One. Two.");
    }

    #[tokio::test]
    async fn test_consecutive_sentences_start_fresh() {
        let (mut stream, _) = stream_of(MockEvent::deltas(["First.", " Second", " one.\n"]));

        assert_eq!(stream.next_sentence().await.expect("first"), "First.");
        assert_eq!(stream.next_sentence().await.expect("second"), " Second one.\n");
    }

    #[tokio::test]
    async fn test_trailing_partial_is_flushed() {
        let (mut stream, source) = stream_of(MockEvent::deltas(["Partial thought"]));

        assert_eq!(stream.next_sentence().await.expect("flush"), "Partial thought");
        assert!(stream.next_sentence().await.expect_err("end").is_exhausted());
        assert!(stream.next_sentence().await.expect_err("still end").is_exhausted());
        assert_eq!(source.recv_count(), 2);
    }

    #[tokio::test]
    async fn test_whitespace_tail_is_not_a_sentence() {
        let (mut stream, _) = stream_of(MockEvent::deltas(["Done.", "  \n"]));

        assert_eq!(stream.next_sentence().await.expect("sentence"), "Done.");
        assert!(stream.next_sentence().await.expect_err("end").is_exhausted());
    }

    #[tokio::test]
    async fn test_empty_stream() {
        let (mut stream, _) = stream_of(Vec::new());

        assert!(stream.next_sentence().await.expect_err("end").is_exhausted());
        assert!(stream.is_terminated());
    }

    #[tokio::test]
    async fn test_failure_discards_partial_text() {
        let (mut stream, _) = stream_of(vec![
            MockEvent::delta("Some tex"),
            MockEvent::Fail(LlmError::stream("connection reset")),
        ]);

        let err = stream.next_sentence().await.expect_err("failure");
        assert!(
            matches!(err, Error::UpstreamStream(LlmError::Stream(ref m)) if m == "connection reset")
        );
        assert!(matches!(stream.next_sentence().await, Err(Error::Terminated)));
    }

    #[tokio::test]
    async fn test_close_releases_source_once() {
        let (mut stream, source) = stream_of(MockEvent::deltas(["A.", "B."]));

        assert_eq!(stream.next_sentence().await.expect("sentence"), "A.");
        stream.close();
        stream.close();
        assert_eq!(source.close_count(), 1);
        assert!(matches!(stream.next_sentence().await, Err(Error::Closed)));

        drop(stream);
        assert_eq!(source.close_count(), 1);
    }

    #[tokio::test]
    async fn test_drop_closes_source() {
        let (stream, source) = stream_of(MockEvent::deltas(["Unread."]));
        drop(stream);
        assert_eq!(source.close_count(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_pull() {
        let source = MockDeltaSource::new(vec![MockEvent::delta("Never"), MockEvent::Hang]);
        let handle = source.clone();
        let cancel = CancellationToken::new();
        let mut stream = SentenceStream::new(Box::new(source), cancel.clone());

        cancel.cancel();
        assert!(stream.next_sentence().await.expect_err("cancel").is_cancelled());
        assert!(matches!(stream.next_sentence().await, Err(Error::Terminated)));
        assert_eq!(handle.recv_count(), 0);

        stream.close();
        assert_eq!(handle.close_count(), 1);
    }

    #[test]
    fn test_cancel_wakes_blocked_pull() {
        use tokio_test::{assert_pending, assert_ready, task};

        let source = MockDeltaSource::new(vec![MockEvent::delta("Waiting"), MockEvent::Hang]);
        let cancel = CancellationToken::new();
        let mut stream = SentenceStream::new(Box::new(source), cancel.clone());

        {
            let mut pull = task::spawn(stream.next_sentence());
            assert_pending!(pull.poll());

            cancel.cancel();
            assert!(pull.is_woken());
            let result = assert_ready!(pull.poll());
            assert!(matches!(result, Err(Error::Cancelled)));
        }
        assert!(stream.is_terminated());
    }

    #[tokio::test]
    async fn test_into_sentences() {
        let (stream, source) = stream_of(MockEvent::deltas(["Hello", " world.", " Bye", "."]));

        let sentences: Vec<String> = stream
            .into_sentences()
            .map(|s| s.expect("sentence"))
            .collect()
            .await;

        assert_eq!(sentences, ["Hello world.", " Bye."]);
        assert_eq!(source.close_count(), 1);
    }

    #[tokio::test]
    async fn test_into_sentences_stops_at_error() {
        let (stream, _) = stream_of(vec![
            MockEvent::delta("Fine."),
            MockEvent::Fail(LlmError::network("boom")),
            MockEvent::delta("Unreachable."),
        ]);

        let results: Vec<Result<String>> = stream.into_sentences().collect().await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().expect("sentence"), "Fine.");
        assert!(matches!(results[1], Err(Error::UpstreamStream(_))));
    }
}
