use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Caller-visible outcome codes.
///
/// The three upstream kinds collapse into [`ErrorCode::UpstreamFailed`] on
/// the wire; [`ExtractionErrorKind`] keeps them apart for telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    PayloadTooLarge,
    InvalidRequest,
    InvalidRequestEmptyText,
    RateLimited,
    UpstreamFailed,
    InternalResponseInvalid,
    ServerMisconfigured,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::PayloadTooLarge => "payload_too_large",
            ErrorCode::InvalidRequest => "invalid_request",
            ErrorCode::InvalidRequestEmptyText => "invalid_request_empty_text",
            ErrorCode::RateLimited => "rate_limited",
            ErrorCode::UpstreamFailed => "upstream_failed",
            ErrorCode::InternalResponseInvalid => "internal_response_invalid",
            ErrorCode::ServerMisconfigured => "server_misconfigured",
        }
    }

    /// HTTP status code for this outcome.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::PayloadTooLarge => 413,
            ErrorCode::InvalidRequest | ErrorCode::InvalidRequestEmptyText => 400,
            ErrorCode::RateLimited => 429,
            ErrorCode::UpstreamFailed => 502,
            ErrorCode::InternalResponseInvalid | ErrorCode::ServerMisconfigured => 500,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single schema violation, addressed by a dotted JSON path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaIssue {
    pub path: String,
    pub message: String,
}

impl SchemaIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Rejections produced while validating an inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("ocr_text has {chars} characters, limit is {limit}")]
    PayloadTooLarge { chars: usize, limit: usize },

    #[error("request body exceeds the configured size limit")]
    BodyTooLarge,

    #[error("ocr_text is empty or has no content")]
    EmptyText { issues: Vec<SchemaIssue> },

    #[error("request failed schema validation ({} issue(s))", .issues.len())]
    Invalid { issues: Vec<SchemaIssue> },
}

impl RequestError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RequestError::PayloadTooLarge { .. } | RequestError::BodyTooLarge => {
                ErrorCode::PayloadTooLarge
            }
            RequestError::EmptyText { .. } => ErrorCode::InvalidRequestEmptyText,
            RequestError::Invalid { .. } => ErrorCode::InvalidRequest,
        }
    }

    pub fn issues(&self) -> &[SchemaIssue] {
        match self {
            RequestError::PayloadTooLarge { .. } | RequestError::BodyTooLarge => &[],
            RequestError::EmptyText { issues } | RequestError::Invalid { issues } => issues,
        }
    }
}

/// Failure classes of a single provider extraction attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionErrorKind {
    Timeout,
    Model,
    Decode,
}

impl ExtractionErrorKind {
    /// Internal telemetry name, e.g. `upstream_timeout`.
    pub fn telemetry_code(&self) -> &'static str {
        match self {
            ExtractionErrorKind::Timeout => "upstream_timeout",
            ExtractionErrorKind::Model => "upstream_model_error",
            ExtractionErrorKind::Decode => "upstream_decode_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {message}", .kind.telemetry_code())]
pub struct ExtractionError {
    pub kind: ExtractionErrorKind,
    pub message: String,
}

impl ExtractionError {
    pub fn new(kind: ExtractionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ExtractionErrorKind::Timeout, message)
    }

    pub fn model(message: impl Into<String>) -> Self {
        Self::new(ExtractionErrorKind::Model, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ExtractionErrorKind::Decode, message)
    }
}
