//! Error family raised by operations against the hosted API

use serde_json::Value;

/// Pointer appended to error messages when the service gives no detail.
pub const ERROR_CODES_DOCS: &str =
    "Please refer to `https://platform.openai.com/docs/guides/error-codes` for more information.";

/// Typed failures a request-issuing operation can raise.
///
/// Wrapped operations passed to [`crate::retry::retry_with_backoff`] report
/// failures through this enum; the retrier branches on [`ApiError::kind`]
/// rather than on the variants themselves.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request deadline elapsed before a response arrived.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Transport-level failure before a response was received.
    #[error("connection failed: {0}")]
    Connection(String),

    /// A polled fine-tune job is not ready yet. Raised by callers that poll
    /// job status and want the retrier to keep waiting.
    #[error("fine-tune still pending: {0}")]
    PendingFineTune(String),

    /// The service actively rejected the request with an HTTP error status.
    /// The body, when present, usually carries a `message` field.
    #[error("error status {status} raised by the API")]
    Status { status: u16, body: Option<Value> },

    /// The response arrived but failed schema validation.
    #[error("response validation failed with status {status}")]
    ResponseValidation { status: u16, body: Option<Value> },

    /// A recognized API-family failure that fits no other variant.
    #[error("{0}")]
    Api(String),

    /// Anything outside the API error family. Propagates through the
    /// retrier unchanged.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Classification of an [`ApiError`] at the retry boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Worth retrying after a backoff wait.
    Transient,
    /// Actively refused by the service; retrying cannot help.
    Rejected,
    /// Recognized API failure with no finer category.
    Generic,
    /// Not an API failure at all; pass through untouched.
    Other,
}

impl ApiError {
    /// Classify this failure for the retry loop.
    pub fn kind(&self) -> FailureKind {
        match self {
            ApiError::Timeout(_) | ApiError::Connection(_) | ApiError::PendingFineTune(_) => {
                FailureKind::Transient
            }
            ApiError::Status { .. } | ApiError::ResponseValidation { .. } => FailureKind::Rejected,
            ApiError::Api(_) => FailureKind::Generic,
            ApiError::Other(_) => FailureKind::Other,
        }
    }

    /// Status code and human-readable detail for a rejected request.
    ///
    /// Falls back to the error-codes documentation pointer when the body
    /// carries no `message` field. Returns `None` for non-rejection
    /// variants.
    pub fn rejection(&self) -> Option<(u16, String)> {
        let (status, body) = match self {
            ApiError::Status { status, body } => (*status, body),
            ApiError::ResponseValidation { status, body } => (*status, body),
            _ => return None,
        };
        let message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| ERROR_CODES_DOCS.to_string());
        Some((status, message))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout(e.to_string())
        } else if e.is_connect() {
            ApiError::Connection(e.to_string())
        } else if let Some(status) = e.status() {
            ApiError::Status {
                status: status.as_u16(),
                body: None,
            }
        } else {
            ApiError::Api(e.to_string())
        }
    }
}
