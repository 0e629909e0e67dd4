//! `ruidai-config`: template contract and runtime configuration.
//!
//! Provides:
//! - Contract document parsing and deep validation
//! - Template id normalization against the allow-list
//! - Startup version-sync check against the compiled prompt
//! - Environment-driven service configuration

pub mod contract;
pub mod env;
pub mod io;
pub mod normalize;
pub mod validation;
pub mod version_sync;

pub use contract::{ContractDocument, ContractError, TemplateContract};
pub use env::{ApiKey, ConfigError, ServiceConfig};
pub use io::{contract_path, load_contract, DEFAULT_CONTRACT_PATH};
pub use validation::{validate, ConfigValidationError, ValidationReport};
pub use version_sync::check_version_sync;
