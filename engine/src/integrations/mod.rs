//! External capabilities
//!
//! ESLint and the TypeScript compiler run as subprocesses with a timeout;
//! SerpAPI is reached over HTTP. Each adapter turns the raw output into the
//! typed report of its tool and reports failures as `Capability` errors.

pub mod eslint;
pub mod serpapi;
pub mod tsc;

use sdk::errors::EngineError;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Captured output of a finished subprocess
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// The most useful text to show when the tool itself failed
    pub fn failure_text(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

/// Run `command` (program followed by base arguments) plus `args` in `cwd`
///
/// A non-zero exit is not an error here: linters and compilers exit non-zero
/// when they find problems. Failing to start and timing out are.
pub async fn run_command(
    capability: &str,
    command: &[String],
    args: &[String],
    cwd: &Path,
    timeout: Duration,
) -> Result<CommandOutput, EngineError> {
    let (program, base_args) = command
        .split_first()
        .ok_or_else(|| EngineError::Config(format!("{} command is empty", capability)))?;

    info!("Running {}: {} {:?} {:?}", capability, program, base_args, args);

    let child = Command::new(program)
        .args(base_args)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| EngineError::capability(capability, format!("Failed to start {}: {}", program, e)))?;

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => {
            let result = CommandOutput {
                exit_code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            };
            debug!("{} exited with {:?}", capability, result.exit_code);
            Ok(result)
        }
        Ok(Err(e)) => {
            warn!("{} failed while running: {}", capability, e);
            Err(EngineError::capability(capability, e.to_string()))
        }
        Err(_) => {
            let err_msg = format!("timed out after {} seconds", timeout.as_secs());
            warn!("{} {}", capability, err_msg);
            Err(EngineError::capability(capability, err_msg))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cmd(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_captures_output_and_exit_code() {
        let temp = TempDir::new().unwrap();
        let output = run_command(
            "shell",
            &cmd(&["sh", "-c"]),
            &cmd(&["echo out; echo err >&2; exit 3"]),
            temp.path(),
            Duration::from_secs(10),
        )
        .await
        .unwrap();

        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.failure_text(), "err");
        assert!(!output.success());
    }

    #[tokio::test]
    async fn test_missing_program_is_capability_error() {
        let temp = TempDir::new().unwrap();
        let err = run_command(
            "eslint",
            &cmd(&["definitely-not-a-real-binary-4821"]),
            &[],
            temp.path(),
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, EngineError::Capability { .. }));
        assert!(err.to_string().starts_with("eslint failed: Failed to start"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_is_capability_error() {
        let temp = TempDir::new().unwrap();
        let err = run_command(
            "tsc",
            &cmd(&["sleep", "5"]),
            &[],
            temp.path(),
            Duration::from_millis(100),
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_empty_command_is_config_error() {
        let temp = TempDir::new().unwrap();
        let err = run_command("eslint", &[], &[], temp.path(), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }
}
