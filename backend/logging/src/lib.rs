//! Telemetry and structured logging for the extraction service.
//!
//! Handles log redaction, JSON output generation, file rotation, and the
//! per-request extraction outcome events.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EVENT_TARGET, EventLogEntry, EventLogger, ExtractEvent};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
