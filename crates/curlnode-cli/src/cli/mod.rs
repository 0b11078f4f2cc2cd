//! CLI for the curlnode workflow node.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use curlnode_core::config;
use std::path::PathBuf;

use commands::{run_node, run_parse, run_provision};

/// Top-level CLI for the curlnode workflow node.
#[derive(Debug, Parser)]
#[command(name = "curlnode")]
#[command(about = "curlnode: run curl per work item and parse the raw HTTP response", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the node over work items and print one JSON record per item.
    Run {
        /// Command-line arguments for a single work item
        /// (e.g. "'https://example.com' -H 'Cookie: Yummy=1'").
        cmdline: Option<String>,

        /// Path to a JSON array of {"cmdline": ...} items; "-" reads stdin.
        #[arg(long, value_name = "FILE", conflicts_with = "cmdline")]
        items: Option<PathBuf>,

        /// Emit an {"error": ...} record for a failing item instead of
        /// aborting the whole batch.
        #[arg(long)]
        continue_on_fail: bool,
    },

    /// Ensure the curl binary for an architecture is provisioned and print its path.
    Provision {
        /// Architecture asset name (defaults to the current machine).
        #[arg(long)]
        arch: Option<String>,
    },

    /// Parse raw HTTP response text from a file (or stdin) and print the structured JSON.
    Parse {
        /// Path to the raw response text; omit to read stdin.
        path: Option<PathBuf>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                cmdline,
                items,
                continue_on_fail,
            } => run_node(&cfg, cmdline, items.as_deref(), continue_on_fail).await?,
            CliCommand::Provision { arch } => run_provision(&cfg, arch.as_deref()).await?,
            CliCommand::Parse { path } => run_parse(path.as_deref())?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
