// file: src/provision/pipeline.rs
// version: 1.3.0
// guid: 5e2b86f1-3a79-42a4-9d1c-b6c49a7de830

//! The provisioning pipeline: fixed stage order, declared failure policy per
//! stage, and a final summary for the operator.
//!
//! Package provisioning is best-effort; configuration hardening, user setup
//! and key enrollment are fatal. The asymmetry is deliberate: cosmetics may
//! degrade, security state must not silently half-apply.

use crate::config::ProvisionProfile;
use crate::prompt::Prompter;
use crate::provision::hardening::SystemHardener;
use crate::provision::packages::PackageInstaller;
use crate::provision::ssh_keys::KeyEnrollment;
use crate::provision::users::UserProvisioner;
use crate::system::CommandRunner;
use crate::Result;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// Failure policy a stage declares up front
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagePolicy {
    /// Failure aborts the run
    Fatal,
    /// Failure is recorded and the run continues
    BestEffort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Completed,
    Failed,
}

/// One stage's entry in the run ledger
#[derive(Debug, Clone)]
pub struct StageReport {
    pub name: &'static str,
    pub policy: StagePolicy,
    pub status: StageStatus,
    pub detail: Option<String>,
}

/// What a completed run did
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub username: Option<String>,
    pub keys_enrolled: usize,
    pub stages: Vec<StageReport>,
}

impl PipelineSummary {
    /// The closing reminder; the new account's password equals its username
    /// until the operator rotates it
    pub fn password_reminder(&self) -> Option<String> {
        self.username
            .as_ref()
            .map(|u| format!("All done! Make sure to update the password for {}", u))
    }
}

/// Sequences the provisioning stages over one runner and one prompter
pub struct ProvisionPipeline<R: CommandRunner, P: Prompter> {
    runner: R,
    prompter: P,
    profile: ProvisionProfile,
    home_root: PathBuf,
    superuser_home: PathBuf,
    sshd_config: PathBuf,
    jail_conf: PathBuf,
    jail_local: PathBuf,
    stages: Vec<StageReport>,
}

impl<R: CommandRunner, P: Prompter> ProvisionPipeline<R, P> {
    pub fn new(profile: ProvisionProfile, runner: R, prompter: P) -> Self {
        Self {
            runner,
            prompter,
            profile,
            home_root: PathBuf::from("/home"),
            superuser_home: dirs::home_dir().unwrap_or_else(|| PathBuf::from("/root")),
            sshd_config: PathBuf::from("/etc/ssh/sshd_config"),
            jail_conf: PathBuf::from("/etc/fail2ban/jail.conf"),
            jail_local: PathBuf::from("/etc/fail2ban/jail.local"),
            stages: Vec::new(),
        }
    }

    /// Override where user homes live
    pub fn with_home_root<Q: AsRef<Path>>(mut self, root: Q) -> Self {
        self.home_root = root.as_ref().to_path_buf();
        self
    }

    /// Override the superuser home used for shell cosmetics
    pub fn with_superuser_home<Q: AsRef<Path>>(mut self, home: Q) -> Self {
        self.superuser_home = home.as_ref().to_path_buf();
        self
    }

    /// Override the hardened config file locations
    pub fn with_config_paths<Q: AsRef<Path>>(mut self, sshd: Q, jail_conf: Q, jail_local: Q) -> Self {
        self.sshd_config = sshd.as_ref().to_path_buf();
        self.jail_conf = jail_conf.as_ref().to_path_buf();
        self.jail_local = jail_local.as_ref().to_path_buf();
        self
    }

    /// Run every stage in order and log the summary.
    ///
    /// The caller has already verified superuser privileges; nothing here
    /// re-checks identity.
    pub async fn run(&mut self) -> Result<PipelineSummary> {
        let session_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!("Starting hardening run {}", session_id);

        info!("Installing packages...");
        let outcome = self.stage_packages().await;
        self.finish_stage("package installation", StagePolicy::BestEffort, outcome)?;

        info!("Setting up ssh and other configs...");
        let outcome = self.stage_hardening().await;
        self.finish_stage("system configuration", StagePolicy::Fatal, outcome)?;

        info!("Adding new user...");
        let username = match self.stage_user().await {
            Ok(name) => {
                self.finish_stage(
                    "user setup",
                    StagePolicy::Fatal,
                    Ok(Some(format!("created {}", name))),
                )?;
                Some(name)
            }
            Err(e) => {
                self.finish_stage("user setup", StagePolicy::Fatal, Err(e))?;
                None
            }
        };

        let mut keys_enrolled = 0;
        if let Some(name) = username.clone() {
            info!("Adding ssh public keys to authorized list...");
            match self.stage_keys(&name).await {
                Ok(count) => {
                    keys_enrolled = count;
                    self.finish_stage(
                        "ssh key enrollment",
                        StagePolicy::Fatal,
                        Ok(Some(format!("{} key(s) enrolled", count))),
                    )?;
                }
                Err(e) => {
                    self.finish_stage("ssh key enrollment", StagePolicy::Fatal, Err(e))?;
                }
            }
        }

        let summary = PipelineSummary {
            session_id,
            started_at,
            username,
            keys_enrolled,
            stages: std::mem::take(&mut self.stages),
        };
        self.log_summary(&summary);
        Ok(summary)
    }

    async fn stage_packages(&mut self) -> Result<Option<String>> {
        let mut installer = PackageInstaller::new(&mut self.runner);

        if let Err(e) = installer.refresh_index().await {
            warn!("Package index refresh failed, continuing: {}", e);
        }

        let summary = installer.install_all(&self.profile.packages).await;

        if let Some(runtime) = &self.profile.container_runtime {
            if let Err(e) = installer.install_container_runtime(runtime).await {
                warn!("Failed to install {}: {}", runtime.binary, e);
            }
        }

        if let Some(framework) = &self.profile.shell_framework {
            if let Err(e) = installer
                .install_shell_framework(framework, &self.superuser_home)
                .await
            {
                warn!("Failed to install {}: {}", framework.name, e);
            }
        }

        let detail = if summary.all_succeeded() {
            format!("{} package(s) installed", summary.installed.len())
        } else {
            format!(
                "{}/{} packages installed, failed: {}",
                summary.installed.len(),
                summary.attempted,
                summary.failed.join(", ")
            )
        };
        Ok(Some(detail))
    }

    async fn stage_hardening(&mut self) -> Result<Option<String>> {
        let mut hardener = SystemHardener::with_paths(
            &mut self.runner,
            &self.sshd_config,
            &self.jail_conf,
            &self.jail_local,
        );
        let health = hardener.apply(&self.profile).await?;

        let detail = health
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Ok(Some(detail))
    }

    async fn stage_user(&mut self) -> Result<String> {
        let mut users = UserProvisioner::new(&mut self.runner, &mut self.prompter)
            .with_home_root(&self.home_root)
            .with_superuser_home(&self.superuser_home);
        users.create_user(&self.profile).await
    }

    async fn stage_keys(&mut self, username: &str) -> Result<usize> {
        let mut enrollment = KeyEnrollment::new(&mut self.runner, &mut self.prompter)
            .with_home_root(&self.home_root);
        enrollment.enroll_keys(username).await
    }

    fn finish_stage(
        &mut self,
        name: &'static str,
        policy: StagePolicy,
        result: Result<Option<String>>,
    ) -> Result<()> {
        match result {
            Ok(detail) => {
                self.stages.push(StageReport {
                    name,
                    policy,
                    status: StageStatus::Completed,
                    detail,
                });
                Ok(())
            }
            Err(e) => {
                self.stages.push(StageReport {
                    name,
                    policy,
                    status: StageStatus::Failed,
                    detail: Some(e.to_string()),
                });
                match policy {
                    StagePolicy::BestEffort => {
                        warn!("{} failed, continuing: {}", name, e);
                        Ok(())
                    }
                    StagePolicy::Fatal => Err(e),
                }
            }
        }
    }

    fn log_summary(&self, summary: &PipelineSummary) {
        let elapsed = (Utc::now() - summary.started_at).num_seconds();
        info!(
            "Hardening run {} finished in {}s",
            summary.session_id, elapsed
        );
        for stage in &summary.stages {
            let mark = match stage.status {
                StageStatus::Completed => "✓",
                StageStatus::Failed => "✗",
            };
            match &stage.detail {
                Some(detail) => info!("  {} {}: {}", mark, stage.name, detail),
                None => info!("  {} {}", mark, stage.name),
            }
        }
        if let Some(reminder) = summary.password_reminder() {
            info!("{}", reminder);
        }
    }

    #[cfg(test)]
    pub fn runner_ref(&self) -> &R {
        &self.runner
    }

    #[cfg(test)]
    pub fn stage_reports(&self) -> &[StageReport] {
        &self.stages
    }
}
