//! Error types for the ContactHub client.
//!
//! # Design
//! Every failure falls into one of three categories. Network problems come
//! from the transport and are never retried. Non-2xx responses carry the
//! status code and the message the server put in its error body. Malformed
//! usage (missing identifiers, turning past the last page) is rejected
//! locally before any request is issued.

use thiserror::Error;

/// Failure reported by a transport backend before a response was received.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Coarse classification of a [`HubError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Transport,
    Server,
    Usage,
}

#[derive(Debug, Error)]
pub enum HubError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    /// The caller supplied missing or mutually exclusive identifiers.
    #[error("invalid usage: {0}")]
    Usage(String),

    #[error("no page after {page} (total pages: {total_pages})")]
    NoNextPage { page: u32, total_pages: u32 },

    #[error("already on the first page")]
    NoPreviousPage,

    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl HubError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            HubError::Transport(_) => ErrorCategory::Transport,
            HubError::Server { .. } | HubError::Deserialization(_) => ErrorCategory::Server,
            HubError::Usage(_)
            | HubError::NoNextPage { .. }
            | HubError::NoPreviousPage
            | HubError::Serialization(_)
            | HubError::Config(_) => ErrorCategory::Usage,
        }
    }

    /// True when the server reported that the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, HubError::Server { status: 404, .. })
    }
}

pub type Result<T> = std::result::Result<T, HubError>;
