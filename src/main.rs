//! Garland Tools lookup - print database documents or save icons and maps
//!
//! Thin command-line shell over the library client.

use std::process::ExitCode;

use clap::Parser;

use garlandtools::cli::{Cli, Lookup};
use garlandtools::logging::init_logging;
use garlandtools::GarlandClient;

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let client = GarlandClient::with_config(cli.client_config())?;

    match cli.command.execute(&client).await? {
        Lookup::Json(document) => {
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Lookup::Asset { bytes, path } => {
            tokio::fs::write(&path, &bytes).await?;
            tracing::info!(path = %path.display(), size = bytes.len(), "Asset written");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
