use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use ruidai_core::{GenerationOutput, GenerationRequest, GenerativeProvider, ProviderError};

/// What the mock answers with.
#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Status(u16),
    MissingCredential,
}

/// A provider that returns canned responses and records what it was sent.
#[derive(Debug)]
pub struct MockProvider {
    name: String,
    model: String,
    reply: MockReply,
    delay: Option<Duration>,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: "mock".to_string(),
            reply: MockReply::Text("{}".to_string()),
            delay: None,
            last_request: Mutex::new(None),
        }
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.reply = MockReply::Text(response.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.reply = MockReply::Status(status);
        self
    }

    pub fn without_credential(mut self) -> Self {
        self.reply = MockReply::MissingCredential;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sleep before answering, to exercise the timeout path.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or(None)
    }
}

#[async_trait]
impl GenerativeProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn has_credential(&self) -> bool {
        !matches!(self.reply, MockReply::MissingCredential)
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutput, ProviderError> {
        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some(request.clone());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.reply {
            MockReply::Text(text) => Ok(GenerationOutput {
                text: text.clone(),
                model: self.model.clone(),
                latency_ms: 0,
            }),
            MockReply::Status(status) => Err(ProviderError::Status { status: *status }),
            MockReply::MissingCredential => Err(ProviderError::MissingCredential),
        }
    }
}
