//! Service error taxonomy and its HTTP rendering.

use axum::Json;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ruidai_core::{ErrorCode, ExtractionError, RequestError, SchemaIssue};

use crate::request_id::REQUEST_ID_HEADER;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Upstream(#[from] ExtractionError),

    #[error("assembled response failed schema: {}", join_issues(.0))]
    ResponseInvalid(Vec<SchemaIssue>),

    #[error("server misconfigured: {0}")]
    Misconfigured(&'static str),

    #[error("rate limit exceeded")]
    RateLimited,
}

fn join_issues(issues: &[SchemaIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ServiceError {
    /// Code sent to the caller.
    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::Request(e) => e.code(),
            ServiceError::Upstream(_) => ErrorCode::UpstreamFailed,
            ServiceError::ResponseInvalid(_) => ErrorCode::InternalResponseInvalid,
            ServiceError::Misconfigured(_) => ErrorCode::ServerMisconfigured,
            ServiceError::RateLimited => ErrorCode::RateLimited,
        }
    }

    /// Finer classification kept for telemetry only.
    pub fn telemetry_kind(&self) -> &'static str {
        match self {
            ServiceError::Upstream(e) => e.kind.telemetry_code(),
            other => other.code().as_str(),
        }
    }

    /// Server-side fault rather than a bad request.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            ServiceError::Upstream(_)
                | ServiceError::ResponseInvalid(_)
                | ServiceError::Misconfigured(_)
        )
    }

    pub fn into_api_error(self, request_id: &str) -> ApiError {
        let details = match &self {
            ServiceError::Request(e) if !e.issues().is_empty() => Some(e.issues().to_vec()),
            _ => None,
        };
        ApiError {
            body: ErrorBody {
                error: self.code(),
                request_id: request_id.to_string(),
                details,
            },
        }
    }
}

/// Caller-visible failure body: a code and the correlation id, plus field
/// issues for rejected requests. Never carries upstream or internal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorCode,
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<SchemaIssue>>,
}

#[derive(Debug)]
pub struct ApiError {
    pub body: ErrorBody,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.body.error.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let header = HeaderValue::from_str(&self.body.request_id).ok();
        let mut response = (status, Json(self.body)).into_response();
        if let Some(value) = header {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_errors_are_uniform_on_the_wire() {
        for err in [
            ExtractionError::timeout("t"),
            ExtractionError::model("m"),
            ExtractionError::decode("d"),
        ] {
            let kind = err.kind.telemetry_code();
            let service = ServiceError::from(err);
            assert_eq!(service.code(), ErrorCode::UpstreamFailed);
            assert_eq!(service.telemetry_kind(), kind);

            let api = service.into_api_error("req-1");
            assert!(api.body.details.is_none());
            let json = serde_json::to_string(&api.body).unwrap();
            assert_eq!(json, r#"{"error":"upstream_failed","request_id":"req-1"}"#);
        }
    }

    #[test]
    fn request_errors_carry_details() {
        let err = ServiceError::from(RequestError::Invalid {
            issues: vec![SchemaIssue::new("locale", "expected string")],
        });
        let api = err.into_api_error("req-2");
        assert_eq!(api.body.error, ErrorCode::InvalidRequest);
        assert_eq!(api.body.details.unwrap()[0].path, "locale");
    }

    #[test]
    fn internal_flags() {
        assert!(ServiceError::ResponseInvalid(vec![]).is_internal());
        assert!(!ServiceError::RateLimited.is_internal());
        assert_eq!(
            ServiceError::Misconfigured("x").code().http_status(),
            500
        );
    }
}
