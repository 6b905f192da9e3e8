//! Errors surfaced by venue calls.
//!
//! The engine does not distinguish between these when deciding what to
//! do next: every variant is retried after backoff. They stay separate
//! so the log line says what actually went wrong.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VenueError {
    /// Transport failure: connect, timeout, TLS, body read.
    #[error("venue request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The venue answered with a non-success status.
    #[error("venue returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The venue answered 2xx but the body was not what we expected.
    #[error("malformed venue response: {0}")]
    Decode(String),

    /// The venue refused the request outright.
    #[error("venue rejected request: {0}")]
    Rejected(String),
}

impl VenueError {
    /// 5xx, timeouts and connection errors; everything else is a
    /// request the venue understood and refused.
    pub fn is_transient(&self) -> bool {
        match self {
            VenueError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            VenueError::Status { status, .. } => *status >= 500,
            VenueError::Decode(_) | VenueError::Rejected(_) => false,
        }
    }
}

impl From<serde_json::Error> for VenueError {
    fn from(e: serde_json::Error) -> Self {
        VenueError::Decode(e.to_string())
    }
}
