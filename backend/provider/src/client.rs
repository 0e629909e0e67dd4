//! Provider-agnostic extraction client.
//!
//! One call, one upstream attempt: build the prompt, derive the seed, race
//! the provider against the timeout, then parse and schema-check the output.
//! Failures come back as [`ExtractionError`] tagged `timeout`, `model` or
//! `decode`. Nothing is retried here.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use ruidai_core::schema::validate_candidate;
use ruidai_core::{
    ExtractRequest, ExtractionError, GenerationRequest, GenerativeProvider, ProviderCandidate,
    ProviderError,
};

use crate::prompt::{build_prompt, PROMPT_VERSION, TEMPERATURE};

/// A schema-checked candidate plus the provenance needed downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub candidate: ProviderCandidate,
    pub model: String,
    pub prompt_version: &'static str,
}

pub struct ExtractionClient {
    provider: Arc<dyn GenerativeProvider>,
    timeout: Duration,
}

impl ExtractionClient {
    pub fn new(provider: Arc<dyn GenerativeProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn provider(&self) -> &dyn GenerativeProvider {
        self.provider.as_ref()
    }

    /// Run one extraction for a canonicalized request.
    ///
    /// `content_hash` is the SHA-256 hex of the canonical text; its first
    /// eight hex digits seed the provider.
    pub async fn extract(
        &self,
        request: &ExtractRequest,
        content_hash: &str,
    ) -> Result<Extraction, ExtractionError> {
        let generation = GenerationRequest {
            prompt: build_prompt(request),
            temperature: TEMPERATURE,
            seed: derive_seed(content_hash),
            json_output: true,
        };

        debug!(
            provider = %self.provider.name(),
            seed = generation.seed,
            timeout_ms = self.timeout.as_millis() as u64,
            "Calling provider"
        );

        // Dropping the losing future cancels the in-flight request and the
        // timer on every exit path.
        let output = match tokio::time::timeout(self.timeout, self.provider.generate(&generation)).await
        {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!(provider = %self.provider.name(), error = %e, "Provider failed");
                return Err(classify(e));
            }
            Err(_) => {
                warn!(provider = %self.provider.name(), "Provider timed out");
                return Err(ExtractionError::timeout(format!(
                    "no response within {} ms",
                    self.timeout.as_millis()
                )));
            }
        };

        let candidate = decode_candidate(&output.text)?;
        debug!(
            provider = %self.provider.name(),
            latency_ms = output.latency_ms,
            items = candidate.items.len(),
            "Provider responded"
        );

        Ok(Extraction {
            candidate,
            model: output.model,
            prompt_version: PROMPT_VERSION,
        })
    }
}

/// Seed from the first eight hex digits of a content hash.
///
/// Hashes come from `sha256_hex`, so a short or non-hex input only happens
/// in tests; it seeds with 0.
pub fn derive_seed(content_hash: &str) -> u32 {
    content_hash
        .get(..8)
        .and_then(|prefix| u32::from_str_radix(prefix, 16).ok())
        .unwrap_or(0)
}

fn classify(error: ProviderError) -> ExtractionError {
    match error {
        ProviderError::MissingCredential
        | ProviderError::Status { .. }
        | ProviderError::Transport(_) => ExtractionError::model(error.to_string()),
        ProviderError::Envelope(_) | ProviderError::EmptyResponse => {
            ExtractionError::decode(error.to_string())
        }
    }
}

/// Parse then schema-check raw model text. Both steps fail as `decode`.
fn decode_candidate(text: &str) -> Result<ProviderCandidate, ExtractionError> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| ExtractionError::decode(format!("output is not JSON: {e}")))?;

    validate_candidate(value).map_err(|issues| {
        let joined = issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        ExtractionError::decode(format!("output failed schema: {joined}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{GeminiProvider, MockProvider};
    use ruidai_core::{sha256_hex, ExtractionErrorKind};

    const VALID: &str = r#"{
        "template_id": "nencho_count_multi_v1",
        "confidence": 0.8,
        "items": [{ "category": "fruit", "count_range": [3, 10] }]
    }"#;

    fn request() -> ExtractRequest {
        ExtractRequest {
            ocr_text: "りんご が 3こ".into(),
            locale: "ja-JP".into(),
            hint: None,
        }
    }

    fn client(provider: MockProvider) -> (Arc<MockProvider>, ExtractionClient) {
        let provider = Arc::new(provider);
        let client = ExtractionClient::new(provider.clone(), Duration::from_millis(200));
        (provider, client)
    }

    #[test]
    fn seed_uses_first_eight_hex_digits() {
        assert_eq!(derive_seed("deadbeef0000"), 0xdead_beef);
        assert_eq!(derive_seed("00000010ffff"), 16);
        assert_eq!(derive_seed("xyz"), 0);
    }

    #[tokio::test]
    async fn returns_candidate_with_provenance() {
        let (provider, client) = client(
            MockProvider::new("mock")
                .with_model("gemini-test")
                .with_response(VALID),
        );
        let hash = sha256_hex("りんご が 3こ");

        let extraction = client.extract(&request(), &hash).await.unwrap();
        assert_eq!(extraction.candidate.template_id, "nencho_count_multi_v1");
        assert_eq!(extraction.model, "gemini-test");
        assert_eq!(extraction.prompt_version, PROMPT_VERSION);

        let sent = provider.last_request().unwrap();
        assert_eq!(sent.seed, derive_seed(&hash));
        assert_eq!(sent.temperature, TEMPERATURE);
        assert!(sent.json_output);
        assert!(sent.prompt.contains("ocr_text: りんご が 3こ"));
    }

    #[tokio::test]
    async fn identical_text_sends_identical_generation_requests() {
        let (provider, client) = client(MockProvider::new("mock").with_response(VALID));
        let hash = sha256_hex("same");

        client.extract(&request(), &hash).await.unwrap();
        let first = provider.last_request().unwrap();
        client.extract(&request(), &hash).await.unwrap();
        assert_eq!(provider.last_request().unwrap(), first);
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let (_, client) = client(
            MockProvider::new("mock")
                .with_response(VALID)
                .with_delay(Duration::from_secs(5)),
        );
        let err = client.extract(&request(), &"0".repeat(64)).await.unwrap_err();
        assert_eq!(err.kind, ExtractionErrorKind::Timeout);
    }

    #[tokio::test]
    async fn non_success_status_is_model_error() {
        let (_, client) = client(MockProvider::new("mock").with_status(503));
        let err = client.extract(&request(), &"0".repeat(64)).await.unwrap_err();
        assert_eq!(err.kind, ExtractionErrorKind::Model);
        assert!(err.message.contains("503"));
    }

    #[tokio::test]
    async fn missing_key_is_model_error() {
        let client = ExtractionClient::new(
            Arc::new(GeminiProvider::new(None, "gemini-2.0-flash")),
            Duration::from_secs(1),
        );
        let err = client.extract(&request(), &"0".repeat(64)).await.unwrap_err();
        assert_eq!(err.kind, ExtractionErrorKind::Model);
    }

    #[tokio::test]
    async fn non_json_output_is_decode_error() {
        let (_, client) = client(MockProvider::new("mock").with_response("```json\n{}\n```"));
        let err = client.extract(&request(), &"0".repeat(64)).await.unwrap_err();
        assert_eq!(err.kind, ExtractionErrorKind::Decode);
        assert!(err.message.starts_with("output is not JSON"));
    }

    #[tokio::test]
    async fn schema_invalid_output_is_decode_error() {
        let (_, client) = client(
            MockProvider::new("mock")
                .with_response(r#"{"template_id":"x","confidence":2,"items":[]}"#),
        );
        let err = client.extract(&request(), &"0".repeat(64)).await.unwrap_err();
        assert_eq!(err.kind, ExtractionErrorKind::Decode);
        assert!(err.message.contains("confidence"));
    }
}
