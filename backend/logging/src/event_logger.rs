//! Extraction Event Logger
//!
//! One structured line per request outcome on the `extract_events` target.
//! Entries carry hashes and codes only, never OCR text or credentials.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::redact::redact_sensitive_data;

pub const EVENT_TARGET: &str = "extract_events";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ExtractEvent {
    ExtractSuccess {
        template_id: String,
        confidence: f64,
        normalization_reason: String,
    },
    ExtractError {
        /// Internal classification, e.g. `upstream_timeout`.
        error_kind: String,
        message: String,
        /// Server-side fault rather than a bad request.
        internal: bool,
    },
}

impl ExtractEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ExtractEvent::ExtractSuccess { .. } => "extract_success",
            ExtractEvent::ExtractError { .. } => "extract_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventLogEntry {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    /// Absent when the request was rejected before hashing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_ocr_hash: Option<String>,
    pub latency_ms: u64,
    #[serde(flatten)]
    pub event: ExtractEvent,
}

impl EventLogEntry {
    pub fn new(
        request_id: impl Into<String>,
        raw_ocr_hash: Option<String>,
        latency_ms: u64,
        mut event: ExtractEvent,
    ) -> Self {
        if let ExtractEvent::ExtractError { message, .. } = &mut event {
            *message = redact_sensitive_data(message);
        }
        Self {
            request_id: request_id.into(),
            timestamp: Utc::now(),
            raw_ocr_hash,
            latency_ms,
            event,
        }
    }
}

pub struct EventLogger;

impl EventLogger {
    /// Emit one outcome line with flat structured fields.
    pub fn log_event(entry: &EventLogEntry) {
        let raw_ocr_hash = entry.raw_ocr_hash.as_deref();
        match &entry.event {
            ExtractEvent::ExtractSuccess {
                template_id,
                confidence,
                normalization_reason,
            } => {
                info!(
                    target: EVENT_TARGET,
                    event = entry.event.name(),
                    request_id = %entry.request_id,
                    raw_ocr_hash,
                    template_id = %template_id,
                    confidence = *confidence,
                    normalization_reason = %normalization_reason,
                    latency_ms = entry.latency_ms,
                    "Extraction succeeded"
                );
            }
            ExtractEvent::ExtractError {
                error_kind,
                message,
                internal: true,
            } => {
                error!(
                    target: EVENT_TARGET,
                    event = entry.event.name(),
                    request_id = %entry.request_id,
                    raw_ocr_hash,
                    error_kind = %error_kind,
                    message = %message,
                    latency_ms = entry.latency_ms,
                    "Extraction failed"
                );
            }
            ExtractEvent::ExtractError {
                error_kind,
                message,
                internal: false,
            } => {
                warn!(
                    target: EVENT_TARGET,
                    event = entry.event.name(),
                    request_id = %entry.request_id,
                    raw_ocr_hash,
                    error_kind = %error_kind,
                    message = %message,
                    latency_ms = entry.latency_ms,
                    "Extraction failed"
                );
            }
        }
    }
}
