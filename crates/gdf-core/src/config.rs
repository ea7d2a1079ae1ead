use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Drive download endpoint; the file id is appended as `id=<id>`.
pub const DEFAULT_ENDPOINT: &str = "https://docs.google.com/uc?export=download";

/// Fetch settings, optionally read from `~/.config/gdf/config.toml`.
/// Missing fields take the built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Endpoint for both the initial and the confirmation request.
    pub endpoint: String,
    /// `User-Agent` sent on every request.
    pub user_agent: String,
    /// Receive buffer and file write buffer size in bytes.
    pub chunk_size: usize,
    /// TCP/TLS connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Abort when throughput stays below this many bytes/sec ...
    pub low_speed_limit: u32,
    /// ... for this many seconds.
    pub low_speed_time_secs: u64,
    /// Redirect hops followed per request.
    pub max_redirections: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            chunk_size: 32 * 1024,
            connect_timeout_secs: 30,
            low_speed_limit: 1024,
            low_speed_time_secs: 60,
            max_redirections: 10,
        }
    }
}

/// Existing config file under the XDG config dir, if there is one.
pub fn config_path() -> Result<Option<PathBuf>> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("gdf")?;
    Ok(xdg_dirs.find_config_file("config.toml"))
}

/// Load from `explicit` if given, else from the XDG config file if it exists,
/// else defaults. Never creates a file.
pub fn load(explicit: Option<&Path>) -> Result<FetchConfig> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => config_path()?,
    };
    match path {
        Some(p) => load_from(&p),
        None => Ok(FetchConfig::default()),
    }
}

pub fn load_from(path: &Path) -> Result<FetchConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: FetchConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(cfg)
}
