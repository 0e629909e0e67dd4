pub mod canonical;
pub mod error;
pub mod schema;
pub mod traits;
pub mod types;

pub use canonical::{canonicalize, sha256_hex, CanonicalText};
pub use error::{ErrorCode, ExtractionError, ExtractionErrorKind, RequestError, SchemaIssue};
pub use traits::{GenerationOutput, GenerationRequest, GenerativeProvider, ProviderError};
pub use types::{
    CandidateItem, CandidateScene, CountRange, ExtractRequest, ExtractResponse, Grade,
    NormalizationReason, NormalizationResult, ProviderCandidate, RequestHint, ResponseDebug,
    ResponseItem, Scene,
};
