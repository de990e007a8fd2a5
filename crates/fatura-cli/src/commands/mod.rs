//! CLI subcommands.

pub mod config;
pub mod export;
pub mod process;
pub mod result;

use std::path::Path;

use fatura_core::FaturaConfig;

/// Load configuration from an explicit path or fall back to `fatura.json`
/// in the working directory, then to defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<FaturaConfig> {
    match config_path {
        Some(path) => Ok(FaturaConfig::from_file(Path::new(path))?),
        None => {
            let default = Path::new("fatura.json");
            if default.exists() {
                Ok(FaturaConfig::from_file(default)?)
            } else {
                Ok(FaturaConfig::default())
            }
        }
    }
}
