//! HTTP boundary tests for `/extract` and `/health`.
//!
//! Drives the router in-process through tower's `oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt; // for oneshot()

use ruidai_config::TemplateContract;
use ruidai_core::{ExtractResponse, GenerativeProvider, NormalizationReason, sha256_hex};
use ruidai_gateway::health_api::HealthReport;
use ruidai_gateway::{ErrorBody, ExtractService, GatewayState, RateLimiter, build_router};
use ruidai_provider::{ExtractionClient, GeminiProvider, MockProvider};

const CONTRACT: &str = r#"{
    "contract_version": "1.0.0",
    "default_template_id": "nencho_count_multi_v1",
    "allowed_template_ids": ["nencho_count_multi_v1", "shogaku_count_table_v1"],
    "prompt_version": "extract-v2"
}"#;

const GOOD_CANDIDATE: &str = r#"{
    "template_id": "not_in_contract",
    "confidence": 0.8,
    "items": [
        {"category": "apple", "count_range": [3, 10]},
        {"slot": "custom", "category": "pear", "count_range": [1, 2]}
    ]
}"#;

fn app_with(provider: Arc<dyn GenerativeProvider>, limiter: RateLimiter) -> Router {
    app_full(provider, limiter, false, 1024 * 1024)
}

fn app_full(
    provider: Arc<dyn GenerativeProvider>,
    limiter: RateLimiter,
    require_credential: bool,
    body_limit: usize,
) -> Router {
    let contract = Arc::new(TemplateContract::from_json(CONTRACT).unwrap());
    let client = ExtractionClient::new(provider, Duration::from_millis(300));
    let service = ExtractService::new(contract, client).with_require_credential(require_credential);
    build_router(GatewayState::new(service, limiter), body_limit)
}

fn mock_app(response: &str) -> Router {
    app_with(
        Arc::new(MockProvider::new("mock").with_model("mock-model").with_response(response)),
        RateLimiter::default(),
    )
}

fn post_extract(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/extract")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, request_id, body.to_vec())
}

fn error_body(bytes: &[u8]) -> ErrorBody {
    serde_json::from_slice(bytes).unwrap()
}

#[tokio::test]
async fn success_is_strict_contract_shape() {
    let raw = "りんご　３こ\n なし ２こ";
    let (status, request_id, body) = send(
        mock_app(GOOD_CANDIDATE),
        post_extract(json!({ "ocr_text": raw }).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(request_id.is_some());

    let response: ExtractResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.template_id, "nencho_count_multi_v1");
    assert_eq!(
        response.debug.normalization_reason,
        NormalizationReason::NotAllowedFallback
    );
    assert_eq!(response.debug.raw_template_id, "not_in_contract");
    assert_eq!(response.debug.raw_ocr_hash, sha256_hex(raw));
    assert_eq!(
        response.debug.normalized_text_hash,
        sha256_hex("りんご 3こ なし 2こ")
    );
    assert_eq!(response.debug.prompt_version, "extract-v2");
    assert_eq!(response.debug.model, "mock-model");
    assert_eq!(response.items[0].slot, "slot_1");
    assert_eq!(response.items[1].slot, "custom");
    assert_eq!(response.scene.categories, vec!["apple", "pear"]);
    assert_eq!(response.scene.total_count_range.min(), 4);
    assert_eq!(response.scene.total_count_range.max(), 12);
}

#[tokio::test]
async fn empty_text_is_rejected_before_provider() {
    let provider = Arc::new(MockProvider::new("mock").with_response(GOOD_CANDIDATE));
    let app = app_with(provider.clone(), RateLimiter::default());
    let (status, _, body) = send(app, post_extract(json!({ "ocr_text": "" }).to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error_body(&body).error.as_str(),
        "invalid_request_empty_text"
    );
    assert!(provider.last_request().is_none());
}

#[tokio::test]
async fn punctuation_only_text_is_rejected() {
    let (status, _, body) = send(
        mock_app(GOOD_CANDIDATE),
        post_extract(json!({ "ocr_text": " ・・・ --- 。。" }).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error_body(&body).error.as_str(),
        "invalid_request_empty_text"
    );
}

#[tokio::test]
async fn size_limit_is_inclusive() {
    let at_limit = "あ".repeat(20_000);
    let (status, _, _) = send(
        mock_app(GOOD_CANDIDATE),
        post_extract(json!({ "ocr_text": at_limit }).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let over = "あ".repeat(20_001);
    let (status, _, body) = send(
        mock_app(GOOD_CANDIDATE),
        post_extract(json!({ "ocr_text": over }).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(error_body(&body).error.as_str(), "payload_too_large");
}

#[tokio::test]
async fn unknown_field_is_invalid_request_with_details() {
    let (status, _, body) = send(
        mock_app(GOOD_CANDIDATE),
        post_extract(json!({ "ocr_text": "abc", "extra": 1 }).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err = error_body(&body);
    assert_eq!(err.error.as_str(), "invalid_request");
    assert!(err.details.unwrap().iter().any(|i| i.path == "extra"));
}

#[tokio::test]
async fn malformed_json_is_invalid_request() {
    let (status, _, body) = send(mock_app(GOOD_CANDIDATE), post_extract("{not json".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_body(&body).error.as_str(), "invalid_request");
}

#[tokio::test]
async fn missing_gemini_key_is_upstream_failed() {
    let app = app_with(
        Arc::new(GeminiProvider::new(None, "gemini-2.0-flash")),
        RateLimiter::default(),
    );
    let (status, header_id, body) =
        send(app, post_extract(json!({ "ocr_text": "abc" }).to_string())).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let err = error_body(&body);
    assert_eq!(err.error.as_str(), "upstream_failed");
    assert!(!err.request_id.is_empty());
    assert_eq!(header_id.as_deref(), Some(err.request_id.as_str()));
    assert!(err.details.is_none());

    let raw: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(raw.as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn required_credential_reports_misconfiguration() {
    let app = app_full(
        Arc::new(GeminiProvider::new(None, "gemini-2.0-flash")),
        RateLimiter::default(),
        true,
        1024 * 1024,
    );
    let (status, _, body) = send(app, post_extract(json!({ "ocr_text": "abc" }).to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_body(&body).error.as_str(), "server_misconfigured");
}

#[tokio::test]
async fn slow_provider_times_out_as_upstream_failed() {
    let app = app_with(
        Arc::new(
            MockProvider::new("mock")
                .with_response(GOOD_CANDIDATE)
                .with_delay(Duration::from_secs(5)),
        ),
        RateLimiter::default(),
    );
    let (status, _, body) = send(app, post_extract(json!({ "ocr_text": "abc" }).to_string())).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(error_body(&body).error.as_str(), "upstream_failed");
}

#[tokio::test]
async fn inverted_count_range_is_internal_error() {
    let (status, _, body) = send(
        mock_app(
            r#"{"template_id":"nencho_count_multi_v1","confidence":0.9,
                "items":[{"category":"apple","count_range":[10,3]}]}"#,
        ),
        post_extract(json!({ "ocr_text": "abc" }).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let err = error_body(&body);
    assert_eq!(err.error.as_str(), "internal_response_invalid");
    assert!(err.details.is_none());
}

#[tokio::test]
async fn non_json_model_output_is_upstream_failed() {
    let (status, _, body) = send(
        mock_app("sorry, I cannot help with that"),
        post_extract(json!({ "ocr_text": "abc" }).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(error_body(&body).error.as_str(), "upstream_failed");
}

#[tokio::test]
async fn inbound_request_id_is_echoed() {
    let mut request = post_extract(json!({ "ocr_text": "" }).to_string());
    request
        .headers_mut()
        .insert("x-request-id", "trace-42".parse().unwrap());
    let (_, header_id, body) = send(mock_app(GOOD_CANDIDATE), request).await;

    assert_eq!(header_id.as_deref(), Some("trace-42"));
    assert_eq!(error_body(&body).request_id, "trace-42");
}

#[tokio::test]
async fn rate_limit_rejects_with_429() {
    let app = app_with(
        Arc::new(MockProvider::new("mock").with_response(GOOD_CANDIDATE)),
        RateLimiter::new(1, Duration::from_secs(60)),
    );
    let body = json!({ "ocr_text": "abc" }).to_string();

    let (status, _, _) = send(app.clone(), post_extract(body.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, bytes) = send(app, post_extract(body)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(error_body(&bytes).error.as_str(), "rate_limited");
}

#[tokio::test]
async fn oversized_body_is_payload_too_large() {
    let app = app_full(
        Arc::new(MockProvider::new("mock").with_response(GOOD_CANDIDATE)),
        RateLimiter::default(),
        false,
        64,
    );
    let body = json!({ "ocr_text": "a".repeat(500) }).to_string();
    let (status, _, bytes) = send(app, post_extract(body)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(error_body(&bytes).error.as_str(), "payload_too_large");
}

#[tokio::test]
async fn health_reports_versions() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(mock_app(GOOD_CANDIDATE), request).await;

    assert_eq!(status, StatusCode::OK);
    let health: HealthReport = serde_json::from_slice(&body).unwrap();
    assert!(health.ok);
    assert_eq!(health.contract_version, "1.0.0");
    assert_eq!(health.prompt_version, "extract-v2");
}
