//! `gdf <file_id> <destination>`: run one fetch and report progress on stdout.

use anyhow::{Context, Result};
use gdf_core::checksum;
use gdf_core::config::FetchConfig;
use gdf_core::fetcher::{self, FetchEvent, Session};
use gdf_core::request::{DownloadRequest, FileId};
use std::path::Path;

pub fn run_fetch(cfg: &FetchConfig, file_id: &str, destination: &Path, sha256: bool) -> Result<()> {
    let id = FileId::parse(file_id)?;
    let request = DownloadRequest::new(id, destination);
    let mut session = Session::new(cfg)?;

    let outcome = fetcher::fetch_with(&mut session, &request, |event| match event {
        FetchEvent::Connecting { id } => println!("1. Connecting to Google Drive (ID: {id})..."),
        FetchEvent::TokenFound(token) => println!("   Found confirmation token: {token}"),
        FetchEvent::ConfirmDownload => println!("2. Downloading large file..."),
        FetchEvent::DirectDownload => println!("   Direct download (no confirmation needed)"),
    })
    .with_context(|| format!("download of {} failed", request.id()))?;

    println!(
        "Download complete: {} ({} bytes)",
        destination.display(),
        outcome.bytes
    );

    if sha256 {
        let digest = checksum::sha256_path(destination)?;
        println!("{}  {}", digest, destination.display());
    }
    Ok(())
}
