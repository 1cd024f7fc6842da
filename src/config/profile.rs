// file: src/config/profile.rs
// version: 1.1.0
// guid: e94a07c6-2b58-4d13-9f67-84c1d52a0e79

//! Provisioning profile structures
//!
//! One pipeline, many profiles: the built-in default reproduces the
//! hand-maintained setup script this agent replaces, and a YAML profile can
//! swap the package list, ssh port or shell framework without touching code.

use serde::{Deserialize, Serialize};

/// Everything the pipeline needs to know about the machine's desired state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionProfile {
    /// Packages installed one at a time, in order
    #[serde(default = "default_packages")]
    pub packages: Vec<String>,
    /// Port sshd listens on after hardening; must not stay on 22
    #[serde(default = "default_ssh_port")]
    pub ssh_port: u16,
    /// System timezone handed to timedatectl
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Login shell for the superuser and the new admin user
    #[serde(default = "default_login_shell")]
    pub login_shell: String,
    /// Supplementary groups for the new admin user
    #[serde(default = "default_admin_groups")]
    pub admin_groups: Vec<String>,
    /// Interactive shell framework bootstrapped for root and the new user
    #[serde(default = "default_shell_framework")]
    pub shell_framework: Option<ShellFrameworkSpec>,
    /// Container runtime installed when its binary is missing from PATH
    #[serde(default = "default_container_runtime")]
    pub container_runtime: Option<ContainerRuntimeSpec>,
    /// Toolchain installer run under the new user's identity
    #[serde(default = "default_toolchain_installer")]
    pub toolchain_installer: Option<String>,
    /// Username prompt attempts before the run is aborted
    #[serde(default = "default_max_username_attempts")]
    pub max_username_attempts: u32,
}

/// Third-party shell enhancement (oh-my-zsh by default)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellFrameworkSpec {
    pub name: String,
    /// Installer script fetched and run unattended
    pub installer_url: String,
    /// Home-relative directory the installer leaves behind; its presence
    /// makes the install step a no-op
    pub home_artifact: String,
    /// Home-relative rc file replicated into new user homes
    pub rc_file: String,
}

/// Container runtime bootstrapped via its vendor script
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerRuntimeSpec {
    /// Binary probed on PATH to decide whether installation is needed
    pub binary: String,
    pub installer_url: String,
}

fn default_packages() -> Vec<String> {
    [
        "sudo",
        "ufw",
        "fail2ban",
        "htop",
        "curl",
        "nginx",
        "tmux",
        "git",
        "certbot",
        "python3-certbot-dns-cloudflare",
        "autojump",
        "zsh",
        "nmap",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_ssh_port() -> u16 {
    2222
}

fn default_timezone() -> String {
    "America/Phoenix".to_string()
}

fn default_login_shell() -> String {
    "/usr/bin/zsh".to_string()
}

fn default_admin_groups() -> Vec<String> {
    vec!["sudo".to_string(), "docker".to_string()]
}

fn default_shell_framework() -> Option<ShellFrameworkSpec> {
    Some(ShellFrameworkSpec {
        name: "oh-my-zsh".to_string(),
        installer_url: "https://raw.github.com/ohmyzsh/ohmyzsh/master/tools/install.sh"
            .to_string(),
        home_artifact: ".oh-my-zsh".to_string(),
        rc_file: ".zshrc".to_string(),
    })
}

fn default_container_runtime() -> Option<ContainerRuntimeSpec> {
    Some(ContainerRuntimeSpec {
        binary: "docker".to_string(),
        installer_url: "https://get.docker.com".to_string(),
    })
}

fn default_toolchain_installer() -> Option<String> {
    Some("https://sh.rustup.rs".to_string())
}

fn default_max_username_attempts() -> u32 {
    10
}

impl Default for ProvisionProfile {
    fn default() -> Self {
        Self {
            packages: default_packages(),
            ssh_port: default_ssh_port(),
            timezone: default_timezone(),
            login_shell: default_login_shell(),
            admin_groups: default_admin_groups(),
            shell_framework: default_shell_framework(),
            container_runtime: default_container_runtime(),
            toolchain_installer: default_toolchain_installer(),
            max_username_attempts: default_max_username_attempts(),
        }
    }
}

impl ProvisionProfile {
    /// Validate the profile
    pub fn validate(&self) -> crate::Result<()> {
        if self.packages.is_empty() {
            return Err(crate::error::ProvisionError::ValidationError(
                "Package list cannot be empty".to_string(),
            ));
        }

        if self.ssh_port == 0 {
            return Err(crate::error::ProvisionError::ValidationError(
                "ssh_port cannot be 0".to_string(),
            ));
        }
        if self.ssh_port == 22 {
            return Err(crate::error::ProvisionError::ValidationError(
                "ssh_port must be moved off the default port 22".to_string(),
            ));
        }

        if self.timezone.is_empty() {
            return Err(crate::error::ProvisionError::ValidationError(
                "Timezone cannot be empty".to_string(),
            ));
        }

        if !self.login_shell.starts_with('/') {
            return Err(crate::error::ProvisionError::ValidationError(format!(
                "Login shell must be an absolute path: {}",
                self.login_shell
            )));
        }

        if self.admin_groups.is_empty() {
            return Err(crate::error::ProvisionError::ValidationError(
                "At least one admin group is required".to_string(),
            ));
        }

        if self.max_username_attempts == 0 {
            return Err(crate::error::ProvisionError::ValidationError(
                "max_username_attempts must be at least 1".to_string(),
            ));
        }

        if let Some(framework) = &self.shell_framework {
            validate_installer_url("shell_framework", &framework.installer_url)?;
            if framework.home_artifact.is_empty() || framework.rc_file.is_empty() {
                return Err(crate::error::ProvisionError::ValidationError(
                    "Shell framework artifact and rc file cannot be empty".to_string(),
                ));
            }
        }

        if let Some(runtime) = &self.container_runtime {
            validate_installer_url("container_runtime", &runtime.installer_url)?;
            if runtime.binary.is_empty() {
                return Err(crate::error::ProvisionError::ValidationError(
                    "Container runtime binary cannot be empty".to_string(),
                ));
            }
        }

        if let Some(url) = &self.toolchain_installer {
            validate_installer_url("toolchain_installer", url)?;
        }

        Ok(())
    }
}

fn validate_installer_url(field: &str, raw: &str) -> crate::Result<()> {
    let parsed = url::Url::parse(raw).map_err(|e| {
        crate::error::ProvisionError::ValidationError(format!(
            "{} installer URL is invalid ({}): {}",
            field, raw, e
        ))
    })?;
    if parsed.scheme() != "https" && parsed.scheme() != "http" {
        return Err(crate::error::ProvisionError::ValidationError(format!(
            "{} installer URL must be http(s): {}",
            field, raw
        )));
    }
    Ok(())
}
