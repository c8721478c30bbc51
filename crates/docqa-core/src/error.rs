use thiserror::Error;

use crate::types::SessionState;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing credential or unusable configuration source.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Network, authentication or server-side failure of an external model service.
    /// `transient` marks failures worth retrying (timeouts, 5xx, dropped connections).
    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String, transient: bool },

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Length mismatch: {chunks} chunks but {vectors} vectors")]
    LengthMismatch { chunks: usize, vectors: usize },

    #[error("Build failed: {0}")]
    BuildFailed(#[source] Box<Error>),

    #[error("Query failed: {0}")]
    QueryFailed(#[source] Box<Error>),

    #[error("Session is not ready (state: {0})")]
    NotReady(SessionState),

    #[error("Session already holds a built index")]
    AlreadyBuilt,

    #[error("Session closed")]
    SessionClosed,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn unavailable(message: impl Into<String>, transient: bool) -> Self {
        Error::ServiceUnavailable { message: message.into(), transient }
    }

    pub fn build_failed(cause: Error) -> Self {
        Error::BuildFailed(Box::new(cause))
    }

    pub fn query_failed(cause: Error) -> Self {
        Error::QueryFailed(Box::new(cause))
    }

    /// True for failures a caller may retry with backoff.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::RateLimited(_) => true,
            Error::ServiceUnavailable { transient, .. } => *transient,
            _ => false,
        }
    }

    /// Maps a non-success HTTP status from a model provider to the taxonomy.
    ///
    /// - 400, 413, 422: invalid input
    /// - 401, 403: authentication failure (not retried)
    /// - 429: rate limited
    /// - 408, 5xx: transient service failure
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            400 | 413 | 422 => Error::InvalidInput(format!("HTTP {status}: {body}")),
            401 | 403 => Error::unavailable(format!("authentication failed (HTTP {status}): {body}"), false),
            429 => Error::RateLimited(body),
            408 | 500..=599 => Error::unavailable(format!("HTTP {status}: {body}"), true),
            _ => Error::unavailable(format!("unexpected HTTP {status}: {body}"), false),
        }
    }

    /// Innermost cause, looking through `BuildFailed` / `QueryFailed`.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::BuildFailed(inner) | Error::QueryFailed(inner) => inner.root_cause(),
            other => other,
        }
    }

    /// Failures after which the session cannot usefully continue.
    pub fn is_fatal(&self) -> bool {
        matches!(self.root_cause(), Error::DimensionMismatch { .. } | Error::SessionClosed)
    }
}
