//! Subprocess execution for one composed command line.

use tokio::process::Command;

/// Failure captured from a run: non-zero exit or a spawn error.
#[derive(Debug, Clone)]
pub struct ExecFailure {
    /// Exit code, if the process ran and exited on its own.
    pub exit_code: Option<i32>,
    /// Human-readable description (first non-empty stderr line, or the status).
    pub message: String,
}

/// Captured output of one run. `stdout` is kept even when a failure was
/// captured; the caller decides whether partial output is usable.
#[derive(Debug, Clone)]
pub struct ExecResult {
    pub stdout: String,
    pub failure: Option<ExecFailure>,
}

/// Runs `command_line` through the host shell, inheriting the working
/// directory and environment. Never returns Err: spawn failures and
/// non-zero exits are captured in the result next to whatever stdout the
/// process produced. No timeout is enforced.
pub async fn run_command(command_line: &str) -> ExecResult {
    match shell_command(command_line).output().await {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            let failure = if output.status.success() {
                None
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Some(ExecFailure {
                    exit_code: output.status.code(),
                    message: failure_message(output.status.code(), &stderr),
                })
            };
            ExecResult { stdout, failure }
        }
        Err(err) => ExecResult {
            stdout: String::new(),
            failure: Some(ExecFailure {
                exit_code: None,
                message: format!("failed to spawn command: {err}"),
            }),
        },
    }
}

#[cfg(unix)]
fn shell_command(command_line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command_line);
    cmd
}

#[cfg(not(unix))]
fn shell_command(command_line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command_line);
    cmd
}

fn failure_message(exit_code: Option<i32>, stderr: &str) -> String {
    let detail = stderr.lines().map(str::trim).find(|line| !line.is_empty());
    match (exit_code, detail) {
        (Some(code), Some(detail)) => format!("command exited with status {code}: {detail}"),
        (Some(code), None) => format!("command exited with status {code}"),
        (None, Some(detail)) => format!("command terminated by signal: {detail}"),
        (None, None) => "command terminated by signal".to_string(),
    }
}
