// file: src/cli/commands.rs
// version: 1.2.0
// guid: 7fd0a3b8-c94e-4e61-a2d7-f85b31c6e902

//! Command implementations for the CLI

use crate::{
    config::{loader::ConfigLoader, ProvisionProfile},
    prompt::StdinPrompter,
    provision::ProvisionPipeline,
    system::{identity, LocalRunner},
    Result,
};
use tracing::info;

/// Run the full hardening pipeline on the local machine
pub async fn provision_command(config_path: Option<String>) -> Result<()> {
    // Everything downstream assumes root: apt, useradd, chpasswd, systemctl
    identity::require_superuser()?;

    let profile = load_profile(config_path)?;
    info!(
        "Provisioning with {} packages, ssh port {}",
        profile.packages.len(),
        profile.ssh_port
    );

    let mut pipeline = ProvisionPipeline::new(profile, LocalRunner::new(), StdinPrompter::new());
    pipeline.run().await?;

    Ok(())
}

/// Print the effective profile so operators can review it before running
pub async fn show_profile_command(config_path: Option<String>) -> Result<()> {
    let profile = load_profile(config_path)?;
    let yaml = serde_yaml::to_string(&profile)?;
    println!("{}", yaml);
    Ok(())
}

fn load_profile(config_path: Option<String>) -> Result<ProvisionProfile> {
    match config_path {
        Some(path) => {
            let loader = ConfigLoader::new();
            loader.load_profile(&path)
        }
        None => {
            let profile = ProvisionProfile::default();
            profile.validate()?;
            Ok(profile)
        }
    }
}
