//! `POST /extract` handler.

use std::net::SocketAddr;
use std::time::Instant;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tracing::debug;

use ruidai_core::{RequestError, SchemaIssue};

use crate::error::ServiceError;
use crate::request_id::{REQUEST_ID_HEADER, resolve_request_id};
use crate::server::GatewayState;
use crate::service::record_outcome;

pub async fn extract(
    State(state): State<GatewayState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let request_id = resolve_request_id(&headers);

    let client = connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    if !state.rate_limiter.check_limit(&client).await {
        return reject(&request_id, ServiceError::RateLimited);
    }

    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            debug!(request_id = %request_id, status = %rejection.status(), "Body rejected");
            return reject(&request_id, rejection_error(&rejection));
        }
    };

    match state.service.run(&request_id, &body).await {
        Ok(response) => {
            let mut http = (StatusCode::OK, Json(response)).into_response();
            if let Ok(value) = HeaderValue::from_str(&request_id) {
                http.headers_mut().insert(REQUEST_ID_HEADER, value);
            }
            http
        }
        Err(err) => err.into_api_error(&request_id).into_response(),
    }
}

/// Log and render a failure that happened before the pipeline ran.
fn reject(request_id: &str, err: ServiceError) -> Response {
    record_outcome(request_id, None, Instant::now(), Err(&err));
    err.into_api_error(request_id).into_response()
}

fn rejection_error(rejection: &JsonRejection) -> ServiceError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ServiceError::Request(RequestError::BodyTooLarge);
    }
    let message = match rejection {
        JsonRejection::MissingJsonContentType(_) => "expected content-type application/json",
        JsonRejection::JsonSyntaxError(_) => "body is not valid JSON",
        _ => "body could not be read as JSON",
    };
    ServiceError::Request(RequestError::Invalid {
        issues: vec![SchemaIssue::new("", message)],
    })
}
