//! `curlnode parse` – structured JSON from raw response text.

use anyhow::{Context, Result};
use curlnode_core::response;
use std::io::Read;
use std::path::Path;

pub fn run_parse(path: Option<&Path>) -> Result<()> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read response file: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read response from stdin")?;
            buf
        }
    };
    let parsed = response::parse(&raw);
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}
