// file: src/provision/hardening.rs
// version: 1.2.0
// guid: 2b9e53c8-0d46-4f71-a2e9-83f16d4ba507

//! Security-critical system configuration: sshd lockdown, fail2ban jail,
//! service restarts, root shell and timezone.
//!
//! Unlike package provisioning, every operation here is fatal on failure. A
//! half-applied ssh configuration is worse than a visibly failed run.

use crate::config::ProvisionProfile;
use crate::patch::{ConfigPatcher, DirectiveSyntax};
use crate::system::{CommandRunner, ServiceHealth, ServiceManager};
use crate::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SSHD_CONFIG: &str = "/etc/ssh/sshd_config";
const JAIL_CONF: &str = "/etc/fail2ban/jail.conf";
const JAIL_LOCAL: &str = "/etc/fail2ban/jail.local";

pub struct SystemHardener<'a, R: CommandRunner> {
    runner: &'a mut R,
    sshd_config: PathBuf,
    jail_conf: PathBuf,
    jail_local: PathBuf,
}

impl<'a, R: CommandRunner> SystemHardener<'a, R> {
    pub fn new(runner: &'a mut R) -> Self {
        Self {
            runner,
            sshd_config: PathBuf::from(SSHD_CONFIG),
            jail_conf: PathBuf::from(JAIL_CONF),
            jail_local: PathBuf::from(JAIL_LOCAL),
        }
    }

    /// Override the config file locations
    pub fn with_paths<P: AsRef<Path>>(runner: &'a mut R, sshd: P, jail_conf: P, jail_local: P) -> Self {
        Self {
            runner,
            sshd_config: sshd.as_ref().to_path_buf(),
            jail_conf: jail_conf.as_ref().to_path_buf(),
            jail_local: jail_local.as_ref().to_path_buf(),
        }
    }

    /// Apply the full hardening sequence in fixed order
    pub async fn apply(&mut self, profile: &ProvisionProfile) -> Result<Vec<ServiceHealth>> {
        self.harden_sshd(profile.ssh_port)?;
        self.rebuild_fail2ban_jail()?;
        let health = self.restart_services().await?;
        self.set_superuser_shell(&profile.login_shell).await?;
        self.set_timezone(&profile.timezone).await?;
        Ok(health)
    }

    /// Lock down sshd: no root login, no password auth, non-default port
    fn harden_sshd(&mut self, ssh_port: u16) -> Result<()> {
        info!("Hardening {}", self.sshd_config.display());

        let mut patcher = ConfigPatcher::load(DirectiveSyntax::Spaced, &self.sshd_config)?;
        let outcomes = [
            ("PermitRootLogin", patcher.set("PermitRootLogin", "no")),
            (
                "PasswordAuthentication",
                patcher.set("PasswordAuthentication", "no"),
            ),
            ("Port", patcher.set("Port", &ssh_port.to_string())),
        ];
        for (key, outcome) in outcomes {
            debug!("{}: {:?}", key, outcome);
        }
        patcher.save()
    }

    /// Recreate jail.local from the packaged jail.conf, then pin the ssh jail
    /// to the journal backend and tighten the ban policy
    fn rebuild_fail2ban_jail(&mut self) -> Result<()> {
        info!("Rebuilding {}", self.jail_local.display());

        if self.jail_local.exists() {
            std::fs::remove_file(&self.jail_local)?;
        }
        std::fs::copy(&self.jail_conf, &self.jail_local).map_err(|e| {
            crate::error::ProvisionError::PatchError(format!(
                "Failed to recreate {} from {}: {}",
                self.jail_local.display(),
                self.jail_conf.display(),
                e
            ))
        })?;

        let mut patcher = ConfigPatcher::load(DirectiveSyntax::KeyValue, &self.jail_local)?;
        patcher.set_in_section("sshd", "backend", "systemd");
        patcher.set_in_section("DEFAULT", "bantime", "60m");
        patcher.set_in_section("DEFAULT", "findtime", "60m");
        patcher.set_in_section("DEFAULT", "maxretry", "3");
        patcher.save()
    }

    /// Restart both hardened services and collect their post-restart state
    async fn restart_services(&mut self) -> Result<Vec<ServiceHealth>> {
        let mut services = ServiceManager::new(self.runner);
        services.restart("ssh").await?;
        services.restart("fail2ban").await?;

        let ssh = services.health("SSH daemon", "ssh").await?;
        info!("{}", ssh);
        let fail2ban = services.health("Fail2ban", "fail2ban").await?;
        info!("{}", fail2ban);

        Ok(vec![ssh, fail2ban])
    }

    async fn set_superuser_shell(&mut self, shell: &str) -> Result<()> {
        info!("Setting superuser shell to {}", shell);
        self.runner.execute(&format!("chsh -s {}", shell)).await
    }

    async fn set_timezone(&mut self, timezone: &str) -> Result<()> {
        info!("Setting timezone to {}", timezone);
        self.runner
            .execute(&format!("timedatectl set-timezone {}", timezone))
            .await
    }
}
