//! Typed failures of calls to the language-model endpoint.

use axum::http::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    /// Transport failure (connection refused, DNS, body read)
    #[error("failed to reach language model: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx answer from the endpoint
    #[error("language model returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("language model call timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Text that is not JSON or does not match the expected schema.
    /// `raw` keeps the model output for diagnostics.
    #[error("malformed model output: {reason}")]
    MalformedOutput { reason: String, raw: String },

    #[error("unknown LLM provider: {0}")]
    UnknownProvider(String),

    #[error("failed to read image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LlmError {
    pub fn malformed(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        LlmError::MalformedOutput {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, LlmError::MalformedOutput { .. })
    }

    /// HTTP status a handler should answer with when this error ends a request.
    pub fn status_code(&self) -> StatusCode {
        match self {
            LlmError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            LlmError::Request(_) | LlmError::Status { .. } | LlmError::MalformedOutput { .. } => {
                StatusCode::BAD_GATEWAY
            }
            LlmError::Image { .. } => StatusCode::BAD_REQUEST,
            LlmError::UnknownProvider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_keeps_raw_text() {
        let err = LlmError::malformed("expected value", "not json");
        match &err {
            LlmError::MalformedOutput { raw, .. } => assert_eq!(raw, "not json"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(err.is_malformed());
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_timeout_maps_to_gateway_timeout() {
        let err = LlmError::Timeout { secs: 5 };
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.to_string(), "language model call timed out after 5s");
    }
}
