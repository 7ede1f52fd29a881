use clap::Parser;
use std::path::PathBuf;
use voketag_config::{Config, ConfigLoader, Overrides};
use voketag_core::Result;

use crate::commands::Commands;

#[derive(Debug, Parser)]
#[command(name = "voketag")]
#[command(about = "VokeTag console: batch anchoring, scans and administration", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Read this config file instead of $XDG_CONFIG_HOME/voketag/config.json
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Admin API base URL
    #[arg(long, global = true, value_name = "URL")]
    pub admin_api: Option<String>,

    /// Factory API base URL, version prefix included
    #[arg(long, global = true, value_name = "URL")]
    pub factory_api: Option<String>,

    /// Scan API base URL
    #[arg(long, global = true, value_name = "URL")]
    pub scan_api: Option<String>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Defaults, config file, environment, then these flags
    pub fn load_config(&self) -> Result<Config> {
        let mut loader = ConfigLoader::new().overrides(Overrides {
            admin_api: self.admin_api.clone(),
            factory_api: self.factory_api.clone(),
            scan_api: self.scan_api.clone(),
        });
        if let Some(path) = &self.config {
            loader = loader.file(path);
        }
        loader.load()
    }
}
