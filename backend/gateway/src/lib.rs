//! Ruidai extraction HTTP API
//!
//! Serves `POST /extract` and `GET /health` on top of the template contract
//! and the generative provider client.

pub mod error;
pub mod extract;
pub mod health_api;
pub mod rate_limit;
pub mod request_id;
pub mod response;
pub mod server;
pub mod service;

pub use error::{ApiError, ErrorBody, ServiceError};
pub use rate_limit::RateLimiter;
pub use server::{GatewayState, build_router, start_server};
pub use service::ExtractService;
