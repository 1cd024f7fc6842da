// file: src/system/services.rs
// version: 1.0.0
// guid: 8a3c67e2-9f14-4d58-a7b3-04e92c5d81f6

//! systemd service control through the command runner

use super::runner::CommandRunner;
use crate::Result;
use tracing::info;

/// Post-restart state of one unit, reported to the operator
#[derive(Debug, Clone)]
pub struct ServiceHealth {
    pub label: String,
    pub state: String,
}

impl ServiceHealth {
    pub fn is_active(&self) -> bool {
        self.state == "active"
    }
}

impl std::fmt::Display for ServiceHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.label, self.state)
    }
}

pub struct ServiceManager<'a, R: CommandRunner> {
    runner: &'a mut R,
}

impl<'a, R: CommandRunner> ServiceManager<'a, R> {
    pub fn new(runner: &'a mut R) -> Self {
        Self { runner }
    }

    /// Restart a unit; a failed restart is an error
    pub async fn restart(&mut self, unit: &str) -> Result<()> {
        info!("Restarting {}", unit);
        self.runner
            .execute(&format!("systemctl restart {}", unit))
            .await
    }

    /// Query a unit's active state without failing on inactive units.
    ///
    /// `systemctl is-active` exits nonzero for anything but "active", so the
    /// answer is read from stdout regardless of exit code.
    pub async fn active_state(&mut self, unit: &str) -> Result<String> {
        let (_, stdout, _) = self
            .runner
            .execute_reporting(
                &format!("systemctl is-active {}", unit),
                &format!("query {} state", unit),
            )
            .await?;

        let state = stdout.trim();
        if state.is_empty() {
            Ok("unknown".to_string())
        } else {
            Ok(state.to_string())
        }
    }

    /// Restart-time health line for the summary
    pub async fn health(&mut self, label: &str, unit: &str) -> Result<ServiceHealth> {
        let state = self.active_state(unit).await?;
        Ok(ServiceHealth {
            label: label.to_string(),
            state,
        })
    }
}
