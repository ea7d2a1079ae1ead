//! CLI for the gdf Google Drive fetcher.

mod fetch;

use anyhow::Result;
use clap::Parser;
use gdf_core::config;
use std::path::PathBuf;

use fetch::run_fetch;

/// Download a Google Drive file by id, handling the large-file confirmation step.
#[derive(Debug, Parser)]
#[command(name = "gdf", version)]
#[command(about = "Download a Google Drive file by id or share link", long_about = None)]
pub struct Cli {
    /// Drive file id, or a share link containing one.
    pub file_id: String,

    /// Where to write the downloaded bytes (overwritten if it exists).
    pub destination: PathBuf,

    /// Print the SHA-256 of the downloaded file.
    #[arg(long)]
    pub sha256: bool,

    /// Read fetch settings from this TOML file instead of ~/.config/gdf/config.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let cfg = config::load(self.config.as_deref())?;
        tracing::debug!("loaded config: {:?}", cfg);
        run_fetch(&cfg, &self.file_id, &self.destination, self.sha256)
    }
}
