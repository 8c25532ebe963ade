//! Error types for the lkgpt crate.
//!
//! Two layers, mirroring the boundary between this crate and the upstream service:
//! - [`LlmError`] describes what went wrong while talking to a provider
//!   (authentication, rate limiting, transport, malformed stream data, ...).
//! - [`Error`] is what the public API returns. It says *where* the provider
//!   failed (opening the stream vs. pulling from it) and carries the
//!   non-failure terminal signal [`Error::StreamExhausted`].

/// Result type alias for lkgpt operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The main error type returned by completions and sentence streams.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The provider refused or failed to open the completion stream.
    #[error("failed to open completion stream: {0}")]
    UpstreamOpen(#[source] LlmError),

    /// Pulling the next delta failed for a reason other than end-of-stream.
    ///
    /// Any text accumulated for the sentence in progress is discarded.
    #[error("completion stream failed: {0}")]
    UpstreamStream(#[source] LlmError),

    /// No more sentences are available. Not a failure.
    #[error("completion stream exhausted")]
    StreamExhausted,

    /// The caller's cancellation token fired.
    #[error("completion cancelled")]
    Cancelled,

    /// The stream already failed or was cancelled; it yields nothing further.
    #[error("completion stream already terminated")]
    Terminated,

    /// The stream was closed by its owner.
    #[error("completion stream closed")]
    Closed,

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns `true` for the end-of-stream signal.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self, Self::StreamExhausted)
    }

    /// Returns `true` if the caller cancelled the operation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns the underlying provider error, if any.
    #[must_use]
    pub const fn llm_error(&self) -> Option<&LlmError> {
        match self {
            Self::UpstreamOpen(err) | Self::UpstreamStream(err) => Some(err),
            _ => None,
        }
    }
}

/// Error type for LLM provider operations.
///
/// Each variant represents a distinct failure mode so callers can
/// pattern-match on specific cases.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum LlmError {
    /// Authentication or authorization failure.
    #[error("[{provider}] {message}")]
    Auth {
        /// Provider name (e.g., "openai").
        provider: String,
        /// Error description.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("[{provider}] Rate limit exceeded. Please retry after some time.")]
    RateLimited {
        /// Provider name.
        provider: String,
    },

    /// Response format error.
    #[error("Expected {expected}, got {got}")]
    ResponseFormat {
        /// Expected format description.
        expected: String,
        /// Actual format received.
        got: String,
    },

    /// Network or connection error.
    #[error("{0}")]
    Network(String),

    /// Streaming error.
    #[error("{0}")]
    Stream(String),

    /// HTTP status error.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Provider-specific error.
    #[error("[{provider}] {message}")]
    Provider {
        /// Provider name.
        provider: String,
        /// Error description.
        message: String,
        /// Optional error code from the provider.
        code: Option<String>,
    },

    /// Internal error.
    #[error("{0}")]
    Internal(String),
}

impl LlmError {
    /// Create an authentication error.
    #[must_use]
    pub fn auth(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Auth {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a rate limit error.
    #[must_use]
    pub fn rate_limited(provider: impl Into<String>) -> Self {
        Self::RateLimited {
            provider: provider.into(),
        }
    }

    /// Create a response format error.
    #[must_use]
    pub fn response_format(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::ResponseFormat {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Create a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create a streaming error.
    #[must_use]
    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream(message.into())
    }

    /// Create an HTTP status error.
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a provider error with an error code.
    #[must_use]
    pub fn provider_code(
        provider: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            code: Some(code.into()),
        }
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

#[cfg(feature = "openai")]
impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network("Request timed out")
        } else if err.is_connect() {
            Self::network(format!("Connection failed: {err}"))
        } else {
            Self::network(err.to_string())
        }
    }
}
