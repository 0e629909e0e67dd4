//! Gateway Rate Limiting Module
//!
//! Fixed-window request counter per client key, applied to `/extract`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Entries above this count trigger a sweep of expired windows.
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Clone)]
pub struct RateLimiter {
    // client key -> (request_count, window_start)
    limits: Arc<RwLock<HashMap<String, (u32, Instant)>>>,
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(30, Duration::from_secs(60))
    }
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            limits: Arc::new(RwLock::new(HashMap::new())),
            max_requests,
            window,
        }
    }

    /// Count a request from `key` and report whether it is allowed.
    pub async fn check_limit(&self, key: &str) -> bool {
        let mut limits = self.limits.write().await;
        let now = Instant::now();

        if limits.len() > SWEEP_THRESHOLD {
            let window = self.window;
            limits.retain(|_, (_, start)| now.duration_since(*start) <= window);
        }

        let state = limits.entry(key.to_string()).or_insert((0, now));

        if now.duration_since(state.1) > self.window {
            // Reset window
            state.0 = 1;
            state.1 = now;
            debug!(client = %key, "Rate limit window reset");
            true
        } else {
            state.0 += 1;
            if state.0 > self.max_requests {
                warn!(client = %key, "Rate limit exceeded");
                false
            } else {
                true
            }
        }
    }
}
