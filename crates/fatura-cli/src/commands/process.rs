//! Process command - extract fields from a single invoice document.

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use fatura_core::{GeminiClient, Pipeline, ProcessingStatus};

use super::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input document (UBL XML, PDF, or image)
    #[arg(required = true)]
    input: PathBuf,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    config.ensure_dirs()?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let oracle = GeminiClient::new(&config.oracle);
    let pipeline = Pipeline::new(&config, oracle);

    info!("Processing {}", args.input.display());
    let result = pipeline.process(&args.input).await;

    println!("{}", serde_json::to_string_pretty(&result)?);

    match result.status {
        ProcessingStatus::Completed => Ok(()),
        _ => anyhow::bail!(
            "processing ended with status '{}': {}",
            result.status.as_str(),
            result.error.as_deref().unwrap_or("no reason recorded")
        ),
    }
}
