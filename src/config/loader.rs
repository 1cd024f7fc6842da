// file: src/config/loader.rs
// version: 1.0.0
// guid: f25c81d4-693a-4e07-b8f2-05a7d34c96e1

//! Profile loading and environment variable substitution

use super::ProvisionProfile;
use crate::Result;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Profile loader with `${VAR}` environment substitution
pub struct ConfigLoader {
    env_vars: HashMap<String, String>,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self {
            env_vars: std::env::vars().collect(),
        }
    }

    /// Load a provisioning profile from a YAML file
    pub fn load_profile<P: AsRef<Path>>(&self, path: P) -> Result<ProvisionProfile> {
        let content = fs::read_to_string(&path).map_err(|e| {
            crate::error::ProvisionError::ConfigError(format!(
                "Failed to read profile {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let expanded = self.expand_env_vars(&content)?;
        let profile: ProvisionProfile = serde_yaml::from_str(&expanded)?;

        profile.validate()?;

        Ok(profile)
    }

    /// Expand environment variables in profile content
    fn expand_env_vars(&self, content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
            crate::error::ProvisionError::ConfigError(format!("Invalid regex pattern: {}", e))
        })?;

        let mut result = content.to_string();
        let mut missing_vars = Vec::new();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];

            if let Some(value) = self.env_vars.get(var_name) {
                result = result.replace(placeholder, value);
            } else {
                missing_vars.push(var_name.to_string());
            }
        }

        if !missing_vars.is_empty() {
            return Err(crate::error::ProvisionError::ConfigError(format!(
                "Missing environment variables: {}",
                missing_vars.join(", ")
            )));
        }

        Ok(result)
    }

    /// Set an environment variable for substitution
    pub fn set_env_var(&mut self, key: String, value: String) {
        self.env_vars.insert(key, value);
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_env_var_expansion() {
        let mut loader = ConfigLoader::new();
        loader.set_env_var("HARDEN_PORT".to_string(), "2200".to_string());

        let content = "ssh_port: ${HARDEN_PORT}";
        let result = loader.expand_env_vars(content).unwrap();
        assert_eq!(result, "ssh_port: 2200");
    }

    #[test]
    fn test_missing_env_var() {
        let loader = ConfigLoader::new();
        let content = "timezone: ${NO_SUCH_VAR_SET}";

        let result = loader.expand_env_vars(content);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Missing environment variables"));
    }

    #[test]
    fn test_load_profile() -> Result<()> {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
packages:
  - fail2ban
  - nginx
ssh_port: 2200
timezone: UTC
login_shell: /bin/bash
shell_framework: null
container_runtime: null
toolchain_installer: null
"#
        )
        .unwrap();

        let loader = ConfigLoader::new();
        let profile = loader.load_profile(file.path())?;

        assert_eq!(profile.packages, vec!["fail2ban", "nginx"]);
        assert_eq!(profile.ssh_port, 2200);
        assert_eq!(profile.timezone, "UTC");
        assert!(profile.shell_framework.is_none());

        Ok(())
    }

    #[test]
    fn test_load_profile_rejects_invalid_values() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "ssh_port: 22").unwrap();

        let loader = ConfigLoader::new();
        let result = loader.load_profile(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_profile_missing_file() {
        let loader = ConfigLoader::new();
        let result = loader.load_profile("/nonexistent/profile.yaml");
        assert!(result.is_err());
    }
}
