//! Arrival client error types.

use std::fmt;

/// Failure categories reported to consumers.
///
/// `InvalidStop` and `NoActiveService` come from the upstream answer
/// itself; `Transport` covers everything that prevented getting a usable
/// answer at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The stop identifier is not known upstream.
    InvalidStop,
    /// The stop is known but no service is running.
    NoActiveService,
    /// Network failure, timeout, bad status or unparseable body.
    Transport,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidStop => f.write_str("invalid bus stop ID"),
            FailureKind::NoActiveService => f.write_str("no bus service active"),
            FailureKind::Transport => f.write_str("unable to reach arrival service"),
        }
    }
}

/// Errors from a single arrival fetch.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// `services` was null or absent
    #[error("invalid bus stop ID")]
    InvalidStop,

    /// `services` was an empty list
    #[error("zero bus services active")]
    NoActiveService,

    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body was not the expected JSON
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },
}

impl FetchError {
    /// The consumer-facing category of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::InvalidStop => FailureKind::InvalidStop,
            FetchError::NoActiveService => FailureKind::NoActiveService,
            FetchError::Http(_) | FetchError::Api { .. } | FetchError::Json { .. } => {
                FailureKind::Transport
            }
        }
    }

    /// Whether this is a transient transport failure.
    pub fn is_transport(&self) -> bool {
        self.kind() == FailureKind::Transport
    }
}
