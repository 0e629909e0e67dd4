//! The extraction pipeline behind `POST /extract`.
//!
//! Steps run in a fixed order with the provider call as the only await:
//! size check, shape validation, canonicalization, provider call, assembly,
//! schema re-validation. Exactly one outcome event is logged per request.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use ruidai_config::TemplateContract;
use ruidai_core::schema::{require_content, validate_request, validate_response};
use ruidai_core::{CanonicalText, ExtractRequest, ExtractResponse};
use ruidai_logging::{EventLogEntry, EventLogger, ExtractEvent};
use ruidai_provider::ExtractionClient;

use crate::error::ServiceError;
use crate::response::{Provenance, assemble};

pub struct ExtractService {
    contract: Arc<TemplateContract>,
    client: ExtractionClient,
    require_credential: bool,
}

impl ExtractService {
    pub fn new(contract: Arc<TemplateContract>, client: ExtractionClient) -> Self {
        Self {
            contract,
            client,
            require_credential: false,
        }
    }

    /// Fail with `server_misconfigured` instead of calling upstream without a key.
    pub fn with_require_credential(mut self, require: bool) -> Self {
        self.require_credential = require;
        self
    }

    pub fn contract(&self) -> &TemplateContract {
        &self.contract
    }

    /// Run the pipeline for one request body and log its outcome.
    pub async fn run(&self, request_id: &str, body: &Value) -> Result<ExtractResponse, ServiceError> {
        let started = Instant::now();
        let mut raw_ocr_hash = None;
        let result = self.pipeline(body, &mut raw_ocr_hash).await;
        record_outcome(request_id, raw_ocr_hash, started, result.as_ref());
        result
    }

    async fn pipeline(
        &self,
        body: &Value,
        raw_ocr_hash: &mut Option<String>,
    ) -> Result<ExtractResponse, ServiceError> {
        if self.require_credential && !self.client.provider().has_credential() {
            return Err(ServiceError::Misconfigured("provider credential is not configured"));
        }

        let request = validate_request(body)?;

        let canonical = CanonicalText::from_raw(&request.ocr_text);
        *raw_ocr_hash = Some(canonical.raw_hash.clone());
        require_content(&canonical)?;

        let canonical_request = ExtractRequest {
            ocr_text: canonical.text.clone(),
            ..request
        };
        let extraction = self
            .client
            .extract(&canonical_request, &canonical.normalized_hash)
            .await?;

        let response = assemble(
            &self.contract,
            extraction.candidate,
            Provenance {
                model: &extraction.model,
                raw_ocr_hash: &canonical.raw_hash,
                normalized_text_hash: &canonical.normalized_hash,
            },
        )
        .map_err(ServiceError::ResponseInvalid)?;

        validate_response(&response, |id| self.contract.is_allowed(id))
            .map_err(ServiceError::ResponseInvalid)?;

        Ok(response)
    }
}

/// Emit the single `extract_success` / `extract_error` line for a request.
pub fn record_outcome(
    request_id: &str,
    raw_ocr_hash: Option<String>,
    started: Instant,
    outcome: Result<&ExtractResponse, &ServiceError>,
) {
    let event = match outcome {
        Ok(response) => ExtractEvent::ExtractSuccess {
            template_id: response.template_id.clone(),
            confidence: response.confidence,
            normalization_reason: response.debug.normalization_reason.as_str().to_string(),
        },
        Err(err) => ExtractEvent::ExtractError {
            error_kind: err.telemetry_kind().to_string(),
            message: err.to_string(),
            internal: err.is_internal(),
        },
    };
    let latency_ms = started.elapsed().as_millis() as u64;
    EventLogger::log_event(&EventLogEntry::new(
        request_id,
        raw_ocr_hash,
        latency_ms,
        event,
    ));
}
