//! Startup check that the contract and the compiled prompt agree on versions.

use crate::contract::{ContractError, TemplateContract};

/// Compare the contract's declared versions with the ones the provider
/// client was built against. Any mismatch aborts startup.
pub fn check_version_sync(
    contract: &TemplateContract,
    contract_version: &str,
    prompt_version: &str,
) -> Result<(), ContractError> {
    if contract.contract_version() != contract_version {
        return Err(ContractError::VersionMismatch {
            field: "contract_version",
            expected: contract_version.to_string(),
            actual: contract.contract_version().to_string(),
        });
    }

    if contract.prompt_version() != prompt_version {
        return Err(ContractError::VersionMismatch {
            field: "prompt_version",
            expected: prompt_version.to_string(),
            actual: contract.prompt_version().to_string(),
        });
    }

    Ok(())
}
