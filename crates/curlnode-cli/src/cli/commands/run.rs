//! `curlnode run` – process work items through provision→execute→parse.

use anyhow::{Context, Result};
use curlnode_core::config::CurlnodeConfig;
use curlnode_core::node::{CurlNode, WorkItem};
use curlnode_core::provision::BinaryProvisioner;
use std::io::Read;
use std::path::Path;

pub async fn run_node(
    cfg: &CurlnodeConfig,
    cmdline: Option<String>,
    items_path: Option<&Path>,
    continue_on_fail: bool,
) -> Result<()> {
    let items = load_items(cmdline, items_path)?;
    if items.is_empty() {
        println!("[]");
        return Ok(());
    }

    let node = CurlNode::new(BinaryProvisioner::from_config(cfg)?);
    let records = node.run_items(&items, continue_on_fail).await?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

/// One inline item, or a JSON array of items from a file or stdin.
fn load_items(cmdline: Option<String>, items_path: Option<&Path>) -> Result<Vec<WorkItem>> {
    if let Some(cmdline) = cmdline {
        return Ok(vec![WorkItem { cmdline }]);
    }
    let data = match items_path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read items file: {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read items from stdin")?;
            buf
        }
    };
    serde_json::from_str(&data).context("items must be a JSON array of {\"cmdline\": ...} objects")
}
