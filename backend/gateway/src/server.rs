//! Main HTTP server: routing, layers, and the listener loop.

use anyhow::Result;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::extract;
use crate::health_api;
use crate::rate_limit::RateLimiter;
use crate::service::ExtractService;

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub service: Arc<ExtractService>,
    pub rate_limiter: RateLimiter,
}

impl GatewayState {
    pub fn new(service: ExtractService, rate_limiter: RateLimiter) -> Self {
        Self {
            service: Arc::new(service),
            rate_limiter,
        }
    }
}

/// Build the router with every route and layer attached.
pub fn build_router(state: GatewayState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_api::get_health))
        .route("/extract", post(extract::extract))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr` and serve until ctrl-c.
#[instrument(skip(router))]
pub async fn start_server(addr: SocketAddr, router: Router) -> Result<()> {
    let listener = TcpListener::bind(&addr).await?;
    info!("Extraction server listening on {}", listener.local_addr()?);
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Extraction server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
