//! Command execution abstraction for testability.
//!
//! Every external command runs with a timeout; a child that outlives it is
//! killed and the call fails.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

#[cfg(test)]
use mockall::automock;

/// Output from command execution
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Whether the command succeeded (exit code 0)
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Short description of a failure for user-facing messages.
    ///
    /// Uses stderr, or stdout when the command wrote nothing to stderr.
    pub fn failure_summary(&self, cmd: &str) -> String {
        let detail = match self.stderr.trim() {
            "" => self.stdout.trim(),
            stderr => stderr,
        };
        let status = match self.code {
            Some(code) => format!("exit code {}", code),
            None => "killed by signal".to_string(),
        };
        if detail.is_empty() {
            format!("{} failed ({})", cmd, status)
        } else {
            format!("{} failed ({}): {}", cmd, status, detail)
        }
    }
}

/// Trait for command execution, allowing dependency injection for testing.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `cmd` with `args`, failing if it has not exited within `timeout`.
    async fn execute(&self, cmd: &str, args: &[String], timeout: Duration)
        -> Result<CommandOutput>;
}

/// Real implementation of CommandExecutor that runs actual system commands.
#[derive(Debug, Clone, Default)]
pub struct RealCommandExecutor;

impl RealCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandExecutor for RealCommandExecutor {
    async fn execute(
        &self,
        cmd: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput> {
        let child = Command::new(cmd)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to execute {}", cmd))?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| anyhow::anyhow!("{} timed out after {:?}", cmd, timeout))?
            .with_context(|| format!("Failed to wait for {}", cmd))?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Helper function to convert a slice of &str to Vec<String>.
///
/// mockall has issues with lifetimes in `&[&str]`, so the trait takes
/// `&[String]`.
pub fn args_to_strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}
