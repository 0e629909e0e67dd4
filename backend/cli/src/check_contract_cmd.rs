//! CLI Check-Contract Command
//!
//! Loads the contract the way `serve` does and reports whether it would boot.

use std::path::Path;

use anyhow::Result;

use ruidai_config::{check_version_sync, load_contract};
use ruidai_provider::{CONTRACT_VERSION, PROMPT_VERSION};

pub async fn run(path: &Path) -> Result<()> {
    println!("\nChecking template contract at {}\n", path.display());

    let contract = load_contract(path).await?;

    println!("  contract_version:    {}", contract.contract_version());
    println!("  prompt_version:      {}", contract.prompt_version());
    println!("  default_template_id: {}", contract.default_template_id());
    println!("  allowed_template_ids:");
    for id in contract.allowed_template_ids() {
        println!("    - {}", id);
    }

    check_version_sync(&contract, CONTRACT_VERSION, PROMPT_VERSION)?;

    println!("\nContract is valid for prompt {}.", PROMPT_VERSION);
    Ok(())
}
