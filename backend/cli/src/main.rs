mod check_contract_cmd;
mod serve;
mod status_cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use ruidai_config::ServiceConfig;

#[derive(Parser)]
#[command(name = "ruidai")]
#[command(about = "Ruidai worksheet text extraction service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the extraction HTTP server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Validate the template contract against the compiled prompt versions
    CheckContract {
        /// Contract file to check instead of the configured one
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Query a running server's health endpoint
    Status {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ServiceConfig::from_env()?;

    ruidai_logging::init_logger(config.log_dir.as_deref(), &config.log_level);

    match cli.command {
        Commands::Serve { port } => {
            let config = ServiceConfig {
                port: port.unwrap_or(config.port),
                ..config
            };
            serve::run(config).await?;
        }
        Commands::CheckContract { path } => {
            let path = path.unwrap_or_else(|| config.contract_path.clone());
            check_contract_cmd::run(&path).await?;
        }
        Commands::Status { port } => {
            status_cmd::run(port.unwrap_or(config.port)).await?;
        }
    }

    Ok(())
}
