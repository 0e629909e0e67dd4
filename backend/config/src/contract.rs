//! The template contract: allow-list of template ids plus version markers.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::{validate, ConfigValidationError};

/// On-disk shape of `contracts/template_ids.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractDocument {
    pub contract_version: String,
    pub default_template_id: String,
    pub allowed_template_ids: Vec<String>,
    pub prompt_version: String,
}

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("failed to read contract file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse contract JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("contract is invalid: {}", join_errors(.0))]
    Invalid(Vec<ConfigValidationError>),

    #[error("{field}_mismatch: expected={expected} actual={actual}")]
    VersionMismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },
}

fn join_errors(errors: &[ConfigValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.path, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validated, immutable contract snapshot shared for the process lifetime.
///
/// Invariant: `allowed_template_ids` is non-empty and contains
/// `default_template_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateContract {
    contract_version: String,
    default_template_id: String,
    allowed_template_ids: BTreeSet<String>,
    prompt_version: String,
}

impl TemplateContract {
    pub fn from_document(doc: ContractDocument) -> Result<Self, ContractError> {
        let report = validate(&doc);
        for warning in &report.warnings {
            tracing::warn!(path = %warning.path, message = %warning.message, "Contract warning");
        }
        if !report.is_valid() {
            return Err(ContractError::Invalid(report.errors));
        }

        Ok(Self {
            contract_version: doc.contract_version,
            default_template_id: doc.default_template_id,
            allowed_template_ids: doc.allowed_template_ids.into_iter().collect(),
            prompt_version: doc.prompt_version,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, ContractError> {
        let doc: ContractDocument = serde_json::from_str(raw)?;
        Self::from_document(doc)
    }

    pub fn contract_version(&self) -> &str {
        &self.contract_version
    }

    pub fn default_template_id(&self) -> &str {
        &self.default_template_id
    }

    pub fn allowed_template_ids(&self) -> &BTreeSet<String> {
        &self.allowed_template_ids
    }

    pub fn prompt_version(&self) -> &str {
        &self.prompt_version
    }

    pub fn is_allowed(&self, template_id: &str) -> bool {
        self.allowed_template_ids.contains(template_id)
    }
}
