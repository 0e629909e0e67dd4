//! Runtime service configuration read from environment variables.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::io::DEFAULT_CONTRACT_PATH;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_TIMEOUT_MS: u64 = 8_000;
pub const DEFAULT_RATE_LIMIT_MAX: u32 = 30;
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value for {key}: {message}")]
pub struct ConfigError {
    pub key: &'static str,
    pub message: String,
}

/// Provider API key. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// Extraction service runtime configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Template contract document
    pub contract_path: PathBuf,
    pub gemini_api_key: Option<ApiKey>,
    pub gemini_model: String,
    /// Overrides the provider's built-in endpoint when set.
    pub gemini_base_url: Option<String>,
    pub gemini_timeout: Duration,
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
    pub body_limit_bytes: usize,
    /// Answer `server_misconfigured` instead of calling upstream without a key.
    pub require_credential: bool,
    pub log_level: String,
    /// Daily-rolling NDJSON log directory; console only when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            contract_path: PathBuf::from(DEFAULT_CONTRACT_PATH),
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            gemini_base_url: None,
            gemini_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            rate_limit_max: DEFAULT_RATE_LIMIT_MAX,
            rate_limit_window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECS),
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
            require_credential: false,
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_kv(&vars)
    }

    /// Build from an explicit key/value map. Empty values count as unset.
    pub fn from_kv(kv: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            kv.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let defaults = Self::default();

        Ok(Self {
            bind_address: get("RUIDAI_BIND").unwrap_or(defaults.bind_address),
            port: parse_or("PORT", get("PORT"), defaults.port)?,
            contract_path: get("RUIDAI_CONTRACT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.contract_path),
            gemini_api_key: get("GEMINI_API_KEY").map(ApiKey::new),
            gemini_model: get("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: get("GEMINI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            gemini_timeout: Duration::from_millis(parse_or(
                "GEMINI_TIMEOUT_MS",
                get("GEMINI_TIMEOUT_MS"),
                DEFAULT_TIMEOUT_MS,
            )?),
            rate_limit_max: parse_or(
                "RUIDAI_RATE_LIMIT_MAX",
                get("RUIDAI_RATE_LIMIT_MAX"),
                defaults.rate_limit_max,
            )?,
            rate_limit_window: Duration::from_secs(parse_or(
                "RUIDAI_RATE_LIMIT_WINDOW_SECS",
                get("RUIDAI_RATE_LIMIT_WINDOW_SECS"),
                DEFAULT_RATE_LIMIT_WINDOW_SECS,
            )?),
            body_limit_bytes: parse_or(
                "RUIDAI_BODY_LIMIT_BYTES",
                get("RUIDAI_BODY_LIMIT_BYTES"),
                defaults.body_limit_bytes,
            )?,
            require_credential: parse_bool(
                "RUIDAI_REQUIRE_CREDENTIAL",
                get("RUIDAI_REQUIRE_CREDENTIAL"),
            )?,
            log_level: get("RUST_LOG").unwrap_or(defaults.log_level),
            log_dir: get("RUIDAI_LOG_DIR").map(PathBuf::from),
        })
    }
}

fn parse_or<T>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError {
            key,
            message: format!("'{raw}': {e}"),
        }),
    }
}

fn parse_bool(key: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(ConfigError {
            key,
            message: format!("'{other}' is not a boolean"),
        }),
    }
}
