//! `curlnode provision` – ensure the curl binary exists and print its path.

use anyhow::Result;
use curlnode_core::config::CurlnodeConfig;
use curlnode_core::provision::{self, BinaryProvisioner};

pub async fn run_provision(cfg: &CurlnodeConfig, arch: Option<&str>) -> Result<()> {
    let provisioner = BinaryProvisioner::from_config(cfg)?;
    let arch = arch.unwrap_or_else(|| provision::default_arch());
    let path = provisioner.ensure_binary(arch).await?;
    println!("{}", path.display());
    Ok(())
}
