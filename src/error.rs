//! Fault taxonomy and classification
//!
//! Collaborators (the scraping backend, the HTML parser) report failures as a
//! [`Fault`]. Before a fault reaches a caller it is reduced to one member of
//! the closed [`ErrorKind`] set, so callers can branch on the category without
//! reading free-text messages.

use serde::{Deserialize, Serialize};
use std::any::Any;
use thiserror::Error;

/// A failure raised while fetching or extracting a single URL
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// The backend answered with a non-success HTTP status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The operation exceeded its deadline
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Connection refused, DNS failure, reset, or a broken response body
    #[error("Network error: {0}")]
    Network(String),

    /// The document could not be traversed by the extractor
    #[error("Failed to parse document: {0}")]
    Parse(String),

    /// Anything not covered above
    #[error("{0}")]
    Other(String),
}

impl Fault {
    /// Build a fault from a caught panic payload
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let detail = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        Fault::Other(format!("Operation panicked: {}", detail))
    }

    /// Category of this fault
    pub fn kind(&self) -> ErrorKind {
        classify(self)
    }
}

/// Closed set of error categories exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ApiError,
    NetworkError,
    TimeoutError,
    NotFoundError,
    ParsingError,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ApiError => write!(f, "API_ERROR"),
            ErrorKind::NetworkError => write!(f, "NETWORK_ERROR"),
            ErrorKind::TimeoutError => write!(f, "TIMEOUT_ERROR"),
            ErrorKind::NotFoundError => write!(f, "NOT_FOUND_ERROR"),
            ErrorKind::ParsingError => write!(f, "PARSING_ERROR"),
        }
    }
}

/// Map a fault to its error category.
///
/// First match wins: 404, other non-timeout statuses, transport failures,
/// deadlines (including 408/504 statuses), parse failures, and finally the
/// `API_ERROR` catch-all.
pub fn classify(fault: &Fault) -> ErrorKind {
    match fault {
        Fault::Status { status: 404, .. } => ErrorKind::NotFoundError,
        Fault::Status { status, .. } if !is_timeout_status(*status) => ErrorKind::ApiError,
        Fault::Network(_) => ErrorKind::NetworkError,
        Fault::Status { .. } | Fault::Timeout(_) => ErrorKind::TimeoutError,
        Fault::Parse(_) => ErrorKind::ParsingError,
        Fault::Other(_) => ErrorKind::ApiError,
    }
}

fn is_timeout_status(status: u16) -> bool {
    matches!(status, 408 | 504)
}
