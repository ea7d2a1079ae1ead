//! What to download and where, plus the two request URLs derived from it.

mod file_id;

pub use file_id::FileId;

use crate::cookie::ConfirmToken;
use std::path::{Path, PathBuf};
use url::Url;

/// One run's input: which file and where its bytes go. Immutable once built.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    id: FileId,
    destination: PathBuf,
}

impl DownloadRequest {
    pub fn new(id: FileId, destination: impl Into<PathBuf>) -> Self {
        Self {
            id,
            destination: destination.into(),
        }
    }

    pub fn id(&self) -> &FileId {
        &self.id
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

/// First request: endpoint plus `id=<id>`. Existing endpoint query pairs
/// (`export=download`) are kept.
pub fn initial_url(endpoint: &Url, id: &FileId) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut().append_pair("id", id.as_str());
    url
}

/// Second request: endpoint plus `id=<id>&confirm=<token>`, form-encoded.
pub fn confirm_url(endpoint: &Url, id: &FileId, token: &ConfirmToken) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("id", id.as_str())
        .append_pair("confirm", token.as_str());
    url
}
