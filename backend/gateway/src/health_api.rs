//! Health API
//!
//! `GET /health` reports liveness plus the versions the process is pinned to.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::server::GatewayState;

pub const SERVICE_NAME: &str = "ruidai-extract";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthReport {
    pub ok: bool,
    pub service: String,
    pub version: String,
    pub contract_version: String,
    pub prompt_version: String,
    pub timestamp: DateTime<Utc>,
}

/// Handler for `GET /health`
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthReport> {
    let contract = state.service.contract();
    Json(HealthReport {
        ok: true,
        service: SERVICE_NAME.into(),
        version: env!("CARGO_PKG_VERSION").into(),
        contract_version: contract.contract_version().to_string(),
        prompt_version: contract.prompt_version().to_string(),
        timestamp: Utc::now(),
    })
}
