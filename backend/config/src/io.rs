//! Contract file loading.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::info;

use crate::contract::{ContractError, TemplateContract};

/// Contract location relative to the working directory.
pub const DEFAULT_CONTRACT_PATH: &str = "contracts/template_ids.json";

/// Resolve a possibly relative contract path against the working directory.
pub fn contract_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

/// Read, parse and validate the contract document.
///
/// Any failure here means the process must not serve traffic.
pub async fn load_contract(path: &Path) -> Result<TemplateContract, ContractError> {
    let path = contract_path(path);
    let raw = fs::read_to_string(&path)
        .await
        .map_err(|source| ContractError::Read {
            path: path.clone(),
            source,
        })?;

    let contract = TemplateContract::from_json(&raw)?;
    info!(
        path = %path.display(),
        contract_version = %contract.contract_version(),
        prompt_version = %contract.prompt_version(),
        allowed = contract.allowed_template_ids().len(),
        "Loaded template contract"
    );
    Ok(contract)
}
