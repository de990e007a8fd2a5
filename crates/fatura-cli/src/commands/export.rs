//! Export command - write a stored result to a spreadsheet.

use clap::Args;

use fatura_core::{ExportError, ResultStore, export_to_xlsx};

use super::load_config;

/// Arguments for the export command.
#[derive(Args)]
pub struct ExportArgs {
    /// Original filename of the processed document (e.g. "invoice.pdf")
    #[arg(required = true)]
    filename: String,
}

pub async fn run(args: ExportArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = ResultStore::new(&config.storage.upload_dir);

    let result = store
        .load(&args.filename)?
        .ok_or_else(|| ExportError::NotFound(args.filename.clone()))?;

    let path = export_to_xlsx(&result, &config.storage.output_dir)?;
    println!("Spreadsheet written to {}", path.display());

    Ok(())
}
