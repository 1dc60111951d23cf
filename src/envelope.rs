//! Per-URL result envelope
//!
//! Serialized shape:
//! - success: `{"url": "...", "success": true, "data": <value>}`
//! - failure: `{"url": "...", "success": false, "error": {"type": "...", "message": "..."}}`
//!
//! `data` may itself be `null` on success (a page without a `<title>`).

use crate::error::{ErrorKind, Fault};
use serde::Serialize;
use serde_json::Value;

/// Outcome of running one operation on one URL
pub type Outcome = Result<Value, Fault>;

/// Classified error attached to a failed envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
}

/// Uniform success/failure record for a single URL
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEnvelope {
    url: String,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
}

impl ResultEnvelope {
    pub fn success(url: impl Into<String>, data: Value) -> Self {
        Self {
            url: url.into(),
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Classify the fault and wrap it
    pub fn failure(url: impl Into<String>, fault: &Fault) -> Self {
        Self {
            url: url.into(),
            success: false,
            data: None,
            error: Some(ErrorBody {
                kind: fault.kind(),
                message: fault.to_string(),
            }),
        }
    }

    pub fn from_outcome(url: impl Into<String>, outcome: Outcome) -> Self {
        match outcome {
            Ok(data) => Self::success(url, data),
            Err(fault) => Self::failure(url, &fault),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&ErrorBody> {
        self.error.as_ref()
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}
