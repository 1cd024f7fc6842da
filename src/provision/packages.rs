// file: src/provision/packages.rs
// version: 1.1.0
// guid: 1a8d42f7-9c35-4e60-b1d8-72e05c3a94f6

//! Best-effort package provisioning through apt

use crate::config::{ContainerRuntimeSpec, ShellFrameworkSpec};
use crate::system::{CommandRunner, ScriptFetcher};
use crate::Result;
use std::path::Path;
use tracing::{info, warn};

/// Outcome of one pass over the package list
#[derive(Debug, Default)]
pub struct InstallSummary {
    pub attempted: usize,
    pub installed: Vec<String>,
    pub failed: Vec<String>,
}

impl InstallSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct PackageInstaller<'a, R: CommandRunner> {
    runner: &'a mut R,
    fetcher: ScriptFetcher,
}

impl<'a, R: CommandRunner> PackageInstaller<'a, R> {
    pub fn new(runner: &'a mut R) -> Self {
        Self {
            runner,
            fetcher: ScriptFetcher::new(),
        }
    }

    /// Refresh and upgrade the package index.
    ///
    /// Callers treat a failure here as non-fatal; a stale index degrades the
    /// install loop but does not invalidate it.
    pub async fn refresh_index(&mut self) -> Result<()> {
        info!("Updating package index");
        self.runner.execute("apt-get update -y -qq").await?;
        self.runner
            .execute("DEBIAN_FRONTEND=noninteractive apt-get upgrade -y -qq")
            .await?;
        Ok(())
    }

    /// Install every package in order, isolating failures per package.
    ///
    /// One broken package never blocks the rest of the list; the summary
    /// carries the names that failed.
    pub async fn install_all(&mut self, packages: &[String]) -> InstallSummary {
        let mut summary = InstallSummary::default();

        for pkg in packages {
            summary.attempted += 1;
            info!("Installing {}", pkg);
            let command = format!(
                "DEBIAN_FRONTEND=noninteractive apt-get install -y -qq {}",
                pkg
            );
            match self.runner.execute(&command).await {
                Ok(_) => summary.installed.push(pkg.clone()),
                Err(e) => {
                    warn!("Failed to install {}: {}", pkg, e);
                    summary.failed.push(pkg.clone());
                }
            }
        }

        summary
    }

    /// Install the container runtime via its vendor script, unless the binary
    /// already resolves on PATH
    pub async fn install_container_runtime(
        &mut self,
        spec: &ContainerRuntimeSpec,
    ) -> Result<bool> {
        if which::which(&spec.binary).is_ok() {
            info!("{} already present, skipping installer", spec.binary);
            return Ok(false);
        }

        info!("Installing {} from {}", spec.binary, spec.installer_url);
        let script = self.fetcher.fetch_to_temp(&spec.installer_url).await?;
        self.runner
            .execute(&format!("bash {}", script.path().display()))
            .await?;
        Ok(true)
    }

    /// Bootstrap the interactive shell framework for the invoking superuser,
    /// unless its home artifact already exists
    pub async fn install_shell_framework(
        &mut self,
        spec: &ShellFrameworkSpec,
        superuser_home: &Path,
    ) -> Result<bool> {
        let artifact = superuser_home.join(&spec.home_artifact);
        if artifact.exists() {
            info!("{} already bootstrapped, skipping installer", spec.name);
            return Ok(false);
        }

        info!("Installing {} from {}", spec.name, spec.installer_url);
        let script = self.fetcher.fetch_to_temp(&spec.installer_url).await?;
        self.runner
            .execute(&format!("sh {} --unattended", script.path().display()))
            .await?;
        Ok(true)
    }
}
