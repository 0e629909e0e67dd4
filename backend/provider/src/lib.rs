pub mod client;
pub mod prompt;
pub mod providers;

pub use client::{derive_seed, Extraction, ExtractionClient};
pub use prompt::{build_prompt, CONTRACT_VERSION, PROMPT_VERSION, TEMPERATURE};
pub use providers::{GeminiProvider, MockProvider};
