use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Global configuration loaded from `~/.config/curlnode/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurlnodeConfig {
    /// Directory holding the provisioned curl binaries (one file per
    /// architecture). Defaults to `<XDG data dir>/curlnode/bin`.
    #[serde(default)]
    pub bin_dir: Option<PathBuf>,
    /// Base URL for the gzip-compressed binary assets; the architecture
    /// asset name plus `.gz` is appended. Override for mirrors or tests.
    #[serde(default)]
    pub asset_base_url: Option<String>,
    /// Connect timeout for the one-time asset fetch, in seconds.
    pub fetch_connect_timeout_secs: u64,
    /// Total transfer timeout for the asset fetch, in seconds.
    pub fetch_timeout_secs: u64,
}

impl Default for CurlnodeConfig {
    fn default() -> Self {
        Self {
            bin_dir: None,
            asset_base_url: None,
            fetch_connect_timeout_secs: 30,
            fetch_timeout_secs: 300,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("curlnode")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<CurlnodeConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = CurlnodeConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: CurlnodeConfig = toml::from_str(&data)?;
    Ok(cfg)
}
