//! File id extraction from a raw id or a Drive share link.

use crate::error::FetchError;

/// Opaque Drive file identifier. Never empty, never contains whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileId(String);

impl FileId {
    /// Accepts either a bare id or an `http(s)` share link of the forms
    /// `.../file/d/<id>/view`, `.../open?id=<id>` or `.../uc?id=<id>`.
    pub fn parse(input: &str) -> Result<Self, FetchError> {
        let input = input.trim();
        let candidate = if input.starts_with("http://") || input.starts_with("https://") {
            id_from_link(input).ok_or_else(|| FetchError::InvalidId(input.to_string()))?
        } else {
            input.to_string()
        };
        if candidate.is_empty() || candidate.chars().any(char::is_whitespace) {
            return Err(FetchError::InvalidId(input.to_string()));
        }
        Ok(FileId(candidate))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn id_from_link(link: &str) -> Option<String> {
    let parsed = url::Url::parse(link).ok()?;
    if let Some((_, id)) = parsed.query_pairs().find(|(k, _)| k == "id") {
        return Some(id.into_owned());
    }
    let segments: Vec<&str> = parsed.path_segments()?.collect();
    segments
        .windows(3)
        .find(|w| w[0] == "file" && w[1] == "d")
        .map(|w| w[2].to_string())
}
