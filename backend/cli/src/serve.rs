//! Server bootstrap: contract, provider, service, router.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use ruidai_config::{check_version_sync, load_contract, ServiceConfig};
use ruidai_gateway::{build_router, start_server, ExtractService, GatewayState, RateLimiter};
use ruidai_provider::{ExtractionClient, GeminiProvider, CONTRACT_VERSION, PROMPT_VERSION};

pub async fn run(config: ServiceConfig) -> Result<()> {
    info!(
        port = config.port,
        bind = %config.bind_address,
        contract = %config.contract_path.display(),
        model = %config.gemini_model,
        "Starting extraction service"
    );

    // A bad contract must stop the process before it binds.
    let contract = load_contract(&config.contract_path)
        .await
        .context("template contract could not be loaded")?;
    check_version_sync(&contract, CONTRACT_VERSION, PROMPT_VERSION)?;

    if config.gemini_api_key.is_none() {
        if config.require_credential {
            warn!("GEMINI_API_KEY is not set; /extract will answer server_misconfigured");
        } else {
            warn!("GEMINI_API_KEY is not set; /extract will answer upstream_failed");
        }
    }

    let mut provider = GeminiProvider::new(
        config.gemini_api_key.as_ref().map(|k| k.expose().to_string()),
        config.gemini_model.clone(),
    );
    if let Some(url) = &config.gemini_base_url {
        provider = provider.with_base_url(url.clone());
    }
    let client = ExtractionClient::new(Arc::new(provider), config.gemini_timeout);

    let service = ExtractService::new(Arc::new(contract), client)
        .with_require_credential(config.require_credential);
    let limiter = RateLimiter::new(config.rate_limit_max, config.rate_limit_window);
    let router = build_router(GatewayState::new(service, limiter), config.body_limit_bytes);

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .with_context(|| format!("invalid bind address {}", config.bind_address))?;

    start_server(addr, router).await
}
