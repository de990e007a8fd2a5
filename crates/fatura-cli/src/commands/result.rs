//! Result command - read back a stored processing result.

use clap::Args;

use fatura_core::ResultStore;

use super::load_config;

/// Arguments for the result command.
#[derive(Args)]
pub struct ResultArgs {
    /// Original filename of the processed document (e.g. "invoice.pdf")
    #[arg(required = true)]
    filename: String,
}

pub async fn run(args: ResultArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = ResultStore::new(&config.storage.upload_dir);

    match store.load(&args.filename)? {
        Some(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        None => anyhow::bail!("No stored result for '{}'", args.filename),
    }
}
