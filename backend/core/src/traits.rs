use async_trait::async_trait;
use thiserror::Error;

/// Trait for generative-model backends used by the extraction client.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Provider name (e.g., "gemini", "mock").
    fn name(&self) -> &str;

    /// Model identifier echoed into response provenance.
    fn model(&self) -> &str;

    /// Whether a credential is configured. Providers that need none return `true`.
    fn has_credential(&self) -> bool;

    /// Send one generation request and return the model's raw text output.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutput, ProviderError>;
}

/// Request to a generative provider.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: f32,
    pub seed: u32,
    /// Ask the provider for `application/json` output.
    pub json_output: bool,
}

/// Response from a generative provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutput {
    pub text: String,
    pub model: String,
    pub latency_ms: u64,
}

/// Transport-level failures. Messages never carry the credential.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider credential is not configured")]
    MissingCredential,

    #[error("provider returned HTTP {status}")]
    Status { status: u16 },

    #[error("provider request failed: {0}")]
    Transport(String),

    #[error("provider response envelope was malformed: {0}")]
    Envelope(String),

    #[error("provider returned no text")]
    EmptyResponse,
}
