// file: src/system/runner.rs
// version: 1.2.0
// guid: 6e8a24f9-1d35-4b70-8c2e-93d5a7f41b68

//! Command execution trait and the local shell-backed implementation

use crate::Result;
use tracing::{debug, error, info};

/// Trait for executing shell commands against the machine being provisioned
#[async_trait::async_trait]
pub trait CommandRunner: Send {
    /// Execute a command, succeeding only on exit code zero
    async fn execute(&mut self, command: &str) -> Result<()>;

    /// Execute a command, reporting exit code, stdout and stderr without
    /// treating a nonzero exit as an error
    async fn execute_reporting(
        &mut self,
        command: &str,
        description: &str,
    ) -> Result<(i32, String, String)>;
}

/// Runs commands on the local machine through `bash -c`
pub struct LocalRunner;

impl LocalRunner {
    /// Create a new local runner
    pub fn new() -> Self {
        Self
    }

    async fn shell(&self, command: &str) -> Result<std::process::Output> {
        tokio::process::Command::new("bash")
            .arg("-c")
            .arg(command)
            .output()
            .await
            .map_err(|e| crate::error::ProvisionError::ProcessError {
                command: command.to_string(),
                exit_code: None,
                stderr: format!("Failed to spawn command: {}", e),
            })
    }
}

#[async_trait::async_trait]
impl CommandRunner for LocalRunner {
    async fn execute(&mut self, command: &str) -> Result<()> {
        debug!("Executing: {}", command);

        let output = self.shell(command).await?;

        if !output.status.success() {
            let exit_code = output.status.code();
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);

            error!("Command failed with exit code {:?}", exit_code);
            if !stdout.trim().is_empty() {
                error!("STDOUT: {}", stdout);
            }
            if !stderr.trim().is_empty() {
                error!("STDERR: {}", stderr);
            }

            return Err(crate::error::ProvisionError::ProcessError {
                command: command.to_string(),
                exit_code,
                stderr: if stderr.is_empty() {
                    stdout.to_string()
                } else {
                    stderr.to_string()
                },
            });
        }

        debug!("Command executed successfully");
        Ok(())
    }

    async fn execute_reporting(
        &mut self,
        command: &str,
        description: &str,
    ) -> Result<(i32, String, String)> {
        info!("Executing: {} -> {}", description, command);

        let output = self.shell(command).await?;

        let exit_status = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if exit_status != 0 {
            debug!(
                "Command '{}' exited with code {}: {}",
                description, exit_status, stderr
            );
        } else {
            debug!("Command '{}' completed successfully", description);
        }

        Ok((exit_status, stdout, stderr))
    }
}

impl Default for LocalRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Scripted runner for tests: records every command and fails or answers
/// according to substring rules
#[cfg(test)]
#[derive(Default)]
pub struct ScriptedRunner {
    pub commands: Vec<String>,
    fail_on: Vec<String>,
    outputs: Vec<(String, String)>,
}

#[cfg(test)]
impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any command containing the given substring
    pub fn fail_matching(mut self, needle: &str) -> Self {
        self.fail_on.push(needle.to_string());
        self
    }

    /// Answer any command containing the given substring with this stdout
    pub fn respond(mut self, needle: &str, stdout: &str) -> Self {
        self.outputs.push((needle.to_string(), stdout.to_string()));
        self
    }

    fn should_fail(&self, command: &str) -> bool {
        self.fail_on.iter().any(|n| command.contains(n))
    }

    fn stdout_for(&self, command: &str) -> String {
        self.outputs
            .iter()
            .find(|(n, _)| command.contains(n))
            .map(|(_, out)| out.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl CommandRunner for ScriptedRunner {
    async fn execute(&mut self, command: &str) -> Result<()> {
        self.commands.push(command.to_string());
        if self.should_fail(command) {
            return Err(crate::error::ProvisionError::ProcessError {
                command: command.to_string(),
                exit_code: Some(1),
                stderr: "scripted failure".to_string(),
            });
        }
        Ok(())
    }

    async fn execute_reporting(
        &mut self,
        command: &str,
        _description: &str,
    ) -> Result<(i32, String, String)> {
        let stdout = self.stdout_for(command);
        let failed = self.should_fail(command);
        self.commands.push(command.to_string());
        if failed {
            Ok((1, stdout, "scripted failure".to_string()))
        } else {
            Ok((0, stdout, String::new()))
        }
    }
}
