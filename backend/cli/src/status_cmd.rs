//! CLI Status Command
//!
//! Queries `/health` on a local server and prints the report.

use anyhow::Result;

pub async fn run(port: u16) -> Result<()> {
    let client = reqwest::Client::new();
    match client
        .get(format!("http://localhost:{}/health", port))
        .send()
        .await
    {
        Ok(resp) => {
            let body: serde_json::Value = resp.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Err(_) => {
            println!("Extraction service is not running on port {}", port);
        }
    }
    Ok(())
}
