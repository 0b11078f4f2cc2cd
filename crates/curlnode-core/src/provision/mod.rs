//! Binary provisioning: fetch a platform-specific static curl build once,
//! keep it executable under the local bin dir.

mod fetch;

pub use fetch::FetchError;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::config::CurlnodeConfig;

/// Upstream location of the gzip-compressed static curl builds, keyed by
/// architecture asset name.
pub const DEFAULT_ASSET_BASE_URL: &str =
    "https://github.com/n-octo-n/n8n-nodes-curl/raw/static-curl/bin/curl";

/// Maps the compile-time CPU architecture to its remote asset name.
pub fn default_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "x64",
        "aarch64" => "arm64",
        "x86" => "ia32",
        other => other,
    }
}

/// Ensures a platform-specific curl binary exists locally and is executable.
///
/// The binary for each architecture lives at `<bin_dir>/<arch>`, written
/// once via temp-file-then-rename and re-permissioned on every call.
pub struct BinaryProvisioner {
    bin_dir: PathBuf,
    asset_base_url: String,
    connect_timeout: Duration,
    timeout: Duration,
}

impl BinaryProvisioner {
    pub fn new(bin_dir: impl Into<PathBuf>, asset_base_url: impl Into<String>) -> Self {
        Self {
            bin_dir: bin_dir.into(),
            asset_base_url: asset_base_url.into(),
            connect_timeout: Duration::from_secs(30),
            timeout: Duration::from_secs(300),
        }
    }

    /// Build from config; the bin dir defaults to `<XDG data dir>/curlnode/bin`.
    pub fn from_config(cfg: &CurlnodeConfig) -> Result<Self> {
        let bin_dir = match &cfg.bin_dir {
            Some(dir) => dir.clone(),
            None => {
                let xdg_dirs = xdg::BaseDirectories::with_prefix("curlnode")?;
                xdg_dirs.get_data_home().join("bin")
            }
        };
        let asset_base_url = cfg
            .asset_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_ASSET_BASE_URL.to_string());
        Ok(Self {
            bin_dir,
            asset_base_url,
            connect_timeout: Duration::from_secs(cfg.fetch_connect_timeout_secs),
            timeout: Duration::from_secs(cfg.fetch_timeout_secs),
        })
    }

    /// Deterministic local path for an architecture's binary.
    pub fn binary_path(&self, arch: &str) -> PathBuf {
        self.bin_dir.join(arch)
    }

    fn asset_url(&self, arch: &str) -> Result<String> {
        let base = Url::parse(&self.asset_base_url)
            .with_context(|| format!("invalid asset base URL: {}", self.asset_base_url))?;
        // Url::join would drop the last path segment of a base without a
        // trailing slash, so append manually.
        Ok(format!("{}/{arch}.gz", base.as_str().trim_end_matches('/')))
    }

    /// Returns the path to the binary for `arch`, fetching it on first use.
    ///
    /// The permission mode is forced to 775 on every call, cached or not,
    /// so drift from manual copying heals itself.
    pub async fn ensure_binary(&self, arch: &str) -> Result<PathBuf> {
        let path = self.binary_path(arch);
        if !path.exists() {
            tokio::fs::create_dir_all(&self.bin_dir)
                .await
                .with_context(|| {
                    format!("failed to create binary directory: {}", self.bin_dir.display())
                })?;

            let url = self.asset_url(arch)?;
            tracing::info!(arch, url = %url, "fetching curl binary");
            let bin_dir = self.bin_dir.clone();
            let dest = path.clone();
            let connect_timeout = self.connect_timeout;
            let timeout = self.timeout;
            tokio::task::spawn_blocking(move || {
                fetch::fetch_gzipped(&url, &bin_dir, &dest, connect_timeout, timeout)
            })
            .await?
            .with_context(|| format!("failed to fetch curl binary for {arch}"))?;
            tracing::info!(arch, path = %path.display(), "curl binary provisioned");
        }

        set_executable(&path)
            .await
            .with_context(|| format!("failed to mark {} executable", path.display()))?;
        Ok(path)
    }
}

/// Force mode 775 (owner rwx, group rwx, other rx). Unix only; a no-op elsewhere.
async fn set_executable(path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o775)).await?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}
