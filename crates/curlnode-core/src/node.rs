//! Per-item orchestration: normalize the cmdline, provision, execute, parse.

use serde::{Deserialize, Serialize};

use crate::exec;
use crate::provision::{self, BinaryProvisioner};
use crate::response::{self, ParsedResponse};

/// One unit of input flowing through the node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    /// Free-text command-line arguments to pass to curl.
    pub cmdline: String,
}

/// Structured failure for one item.
#[derive(Debug, thiserror::Error)]
#[error("item {item}: {message}")]
pub struct NodeError {
    /// Index of the originating work item.
    pub item: usize,
    pub message: String,
}

/// Output payload for one item: the parsed response, or the failure text
/// when the run is configured to continue past failures.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RecordPayload {
    Response(ParsedResponse),
    Failure { error: String },
}

/// One output record, tagged with its source item index.
#[derive(Debug, Serialize)]
pub struct OutputRecord {
    pub item: usize,
    #[serde(flatten)]
    pub payload: RecordPayload,
}

/// Strips a leading literal `curl` token (case-insensitive, the whole token
/// only). The provisioned binary is invoked directly, not through a shell
/// alias, so the token would otherwise become curl's first URL argument.
pub fn normalize_cmdline(cmdline: &str) -> &str {
    let trimmed = cmdline.trim();
    match trimmed.get(..4) {
        Some(token) if token.eq_ignore_ascii_case("curl") => {
            let rest = &trimmed[4..];
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                rest.trim_start()
            } else {
                trimmed
            }
        }
        _ => trimmed,
    }
}

/// The node: per item, ensure the binary (cached on disk after the first
/// run), execute `<binary> --include <args>`, parse the captured stdout,
/// and only then surface any captured execution failure.
pub struct CurlNode {
    provisioner: BinaryProvisioner,
    arch: String,
}

impl CurlNode {
    pub fn new(provisioner: BinaryProvisioner) -> Self {
        Self::with_arch(provisioner, provision::default_arch())
    }

    pub fn with_arch(provisioner: BinaryProvisioner, arch: impl Into<String>) -> Self {
        Self {
            provisioner,
            arch: arch.into(),
        }
    }

    /// Processes `items` sequentially, one record per item. With
    /// `continue_on_fail`, a failing item contributes an error record and
    /// later items still run; otherwise the first failure aborts the batch,
    /// leaving later items unprocessed.
    pub async fn run_items(
        &self,
        items: &[WorkItem],
        continue_on_fail: bool,
    ) -> Result<Vec<OutputRecord>, NodeError> {
        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match self.run_item(index, item).await {
                Ok(parsed) => records.push(OutputRecord {
                    item: index,
                    payload: RecordPayload::Response(parsed),
                }),
                Err(err) if continue_on_fail => {
                    tracing::warn!(item = index, "item failed: {}", err.message);
                    records.push(OutputRecord {
                        item: index,
                        payload: RecordPayload::Failure { error: err.message },
                    });
                }
                Err(err) => return Err(err),
            }
        }
        Ok(records)
    }

    async fn run_item(&self, index: usize, item: &WorkItem) -> Result<ParsedResponse, NodeError> {
        let args = normalize_cmdline(&item.cmdline);
        let binary = self
            .provisioner
            .ensure_binary(&self.arch)
            .await
            .map_err(|err| NodeError {
                item: index,
                message: format!("{err:#}"),
            })?;

        // --include is always forced so the status line and headers are parseable.
        let command_line = format!("{} --include {}", binary.display(), args);
        tracing::debug!(item = index, command = %command_line, "executing");
        let result = exec::run_command(&command_line).await;

        // Parse first; a captured failure is surfaced only afterwards.
        let parsed = response::parse(&result.stdout);
        if let Some(failure) = result.failure {
            return Err(NodeError {
                item: index,
                message: failure.message,
            });
        }
        Ok(parsed)
    }
}
