// file: src/provision/users.rs
// version: 1.1.1
// guid: 3c0f64d9-1e57-4082-b3fa-94a27e5cb618

//! Administrative user provisioning

use crate::config::ProvisionProfile;
use crate::prompt::Prompter;
use crate::system::CommandRunner;
use crate::Result;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const USERNAME_PATTERN: &str = r"^[A-Za-z0-9_]+$";

pub struct UserProvisioner<'a, R: CommandRunner, P: Prompter> {
    runner: &'a mut R,
    prompter: &'a mut P,
    home_root: PathBuf,
    superuser_home: PathBuf,
}

impl<'a, R: CommandRunner, P: Prompter> UserProvisioner<'a, R, P> {
    pub fn new(runner: &'a mut R, prompter: &'a mut P) -> Self {
        Self {
            runner,
            prompter,
            home_root: PathBuf::from("/home"),
            superuser_home: dirs::home_dir().unwrap_or_else(|| PathBuf::from("/root")),
        }
    }

    /// Override where user homes live
    pub fn with_home_root<Q: AsRef<Path>>(mut self, root: Q) -> Self {
        self.home_root = root.as_ref().to_path_buf();
        self
    }

    /// Override the superuser home the shell cosmetics are copied from
    pub fn with_superuser_home<Q: AsRef<Path>>(mut self, home: Q) -> Self {
        self.superuser_home = home.as_ref().to_path_buf();
        self
    }

    /// Prompt for a username, create the account with its groups and shell,
    /// set the initial password and replicate the shell environment.
    ///
    /// Account creation and password are fatal; everything after is cosmetic
    /// and best-effort.
    pub async fn create_user(&mut self, profile: &ProvisionProfile) -> Result<String> {
        let username = self.ask_username(profile.max_username_attempts).await?;

        self.create_account(&username, profile).await?;
        self.set_initial_password(&username).await?;
        self.replicate_shell_environment(&username, profile).await;

        info!("User {} created", username);
        Ok(username)
    }

    /// Ask until the answer is ASCII letters, digits and underscores only,
    /// bounded by `max_attempts`.
    ///
    /// A closed input stream aborts the run instead of looping forever.
    async fn ask_username(&mut self, max_attempts: u32) -> Result<String> {
        let pattern = Regex::new(USERNAME_PATTERN).map_err(|e| {
            crate::error::ProvisionError::ValidationError(format!(
                "Invalid username pattern: {}",
                e
            ))
        })?;

        for _ in 0..max_attempts {
            match self.prompter.ask("Username: ").await? {
                None => {
                    return Err(crate::error::ProvisionError::PromptError(
                        "Input closed before a username was provided".to_string(),
                    ))
                }
                Some(answer) if pattern.is_match(&answer) => return Ok(answer),
                Some(answer) => {
                    warn!(
                        "Invalid username {:?}; letters, digits and underscores only",
                        answer
                    );
                }
            }
        }

        Err(crate::error::ProvisionError::PromptError(format!(
            "No valid username after {} attempts",
            max_attempts
        )))
    }

    async fn create_account(&mut self, username: &str, profile: &ProvisionProfile) -> Result<()> {
        let command = format!(
            "useradd -m -G {} -s {} {}",
            profile.admin_groups.join(","),
            profile.login_shell,
            username
        );
        self.runner.execute(&command).await
    }

    /// Initial password equals the username. Deliberately weak; the summary
    /// tells the operator to rotate it.
    async fn set_initial_password(&mut self, username: &str) -> Result<()> {
        self.runner
            .execute(&format!("echo '{0}:{0}' | chpasswd", username))
            .await
    }

    /// Copy the superuser's shell setup into the new home, fix ownership and
    /// kick off the toolchain installer as the new user. Failures are logged
    /// and swallowed; the account is already usable.
    async fn replicate_shell_environment(&mut self, username: &str, profile: &ProvisionProfile) {
        let home = self.home_root.join(username);

        if let Some(framework) = &profile.shell_framework {
            for artifact in [&framework.rc_file, &framework.home_artifact] {
                let source = self.superuser_home.join(artifact);
                let command = format!("cp -a {} {}", source.display(), home.display());
                if let Err(e) = self.runner.execute(&command).await {
                    warn!("Could not copy {} for {}: {}", artifact, username, e);
                }
            }
        }

        let chown = format!("chown -R {0}:{0} {1}", username, home.display());
        if let Err(e) = self.runner.execute(&chown).await {
            warn!("Could not fix ownership of {}: {}", home.display(), e);
        }

        if let Some(url) = &profile.toolchain_installer {
            let command = format!("su - {} -c 'curl -fsSL {} | sh -s -- -y'", username, url);
            if let Err(e) = self.runner.execute(&command).await {
                warn!("Toolchain install failed for {}: {}", username, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use crate::system::runner::ScriptedRunner;

    fn profile() -> ProvisionProfile {
        ProvisionProfile {
            shell_framework: None,
            container_runtime: None,
            toolchain_installer: None,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_simple_username_accepted() {
        let mut runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(["bob"]);
        let mut users = UserProvisioner::new(&mut runner, &mut prompter);

        let name = users.create_user(&profile()).await.unwrap();

        assert_eq!(name, "bob");
        assert!(runner
            .commands
            .contains(&"useradd -m -G sudo,docker -s /usr/bin/zsh bob".to_string()));
        assert!(runner
            .commands
            .contains(&"echo 'bob:bob' | chpasswd".to_string()));
    }

    #[tokio::test]
    async fn test_underscored_username_accepted() {
        let mut runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(["bob_2"]);
        let mut users = UserProvisioner::new(&mut runner, &mut prompter);

        let name = users.create_user(&profile()).await.unwrap();
        assert_eq!(name, "bob_2");
    }

    #[tokio::test]
    async fn test_invalid_usernames_are_reprompted() {
        let mut runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(["", "bob!", "bob 2", "alice"]);
        let mut users = UserProvisioner::new(&mut runner, &mut prompter);

        let name = users.create_user(&profile()).await.unwrap();

        assert_eq!(name, "alice");
        assert_eq!(prompter.questions.len(), 4);
        assert!(prompter.questions.iter().all(|q| q == "Username: "));
    }

    #[tokio::test]
    async fn test_accented_username_is_reprompted() {
        // useradd would reject it anyway; keep the check to ASCII word chars
        let mut runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(["müller", "muller"]);
        let mut users = UserProvisioner::new(&mut runner, &mut prompter);

        let name = users.create_user(&profile()).await.unwrap();

        assert_eq!(name, "muller");
        assert_eq!(prompter.questions.len(), 2);
        assert!(runner.commands.iter().all(|c| !c.contains("müller")));
    }

    #[tokio::test]
    async fn test_attempts_are_bounded() {
        let mut runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(["!", "@", "#"]);
        let mut users = UserProvisioner::new(&mut runner, &mut prompter);

        let p = ProvisionProfile {
            max_username_attempts: 2,
            ..profile()
        };
        let err = users.create_user(&p).await.unwrap_err();

        assert!(err.to_string().contains("after 2 attempts"));
        assert!(runner.commands.is_empty());
    }

    #[tokio::test]
    async fn test_closed_input_aborts() {
        let mut runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
        let mut users = UserProvisioner::new(&mut runner, &mut prompter);

        let err = users.create_user(&profile()).await.unwrap_err();
        assert!(err.to_string().contains("Input closed"));
    }

    #[tokio::test]
    async fn test_failed_useradd_is_fatal() {
        let mut runner = ScriptedRunner::new().fail_matching("useradd");
        let mut prompter = ScriptedPrompter::new(["bob"]);
        let mut users = UserProvisioner::new(&mut runner, &mut prompter);

        assert!(users.create_user(&profile()).await.is_err());
    }

    #[tokio::test]
    async fn test_cosmetic_failures_are_swallowed() {
        let mut runner = ScriptedRunner::new().fail_matching("chown");
        let mut prompter = ScriptedPrompter::new(["bob"]);
        let mut users = UserProvisioner::new(&mut runner, &mut prompter)
            .with_home_root("/tmp/homes")
            .with_superuser_home("/tmp/root-home");

        let p = ProvisionProfile {
            toolchain_installer: Some("https://sh.rustup.rs".to_string()),
            ..ProvisionProfile::default()
        };
        let name = users.create_user(&p).await.unwrap();

        assert_eq!(name, "bob");
        // rc file and framework artifact both copied before the chown
        assert!(runner
            .commands
            .iter()
            .any(|c| c.starts_with("cp -a /tmp/root-home/.zshrc")));
        assert!(runner
            .commands
            .iter()
            .any(|c| c.starts_with("cp -a /tmp/root-home/.oh-my-zsh")));
        assert!(runner
            .commands
            .contains(&"su - bob -c 'curl -fsSL https://sh.rustup.rs | sh -s -- -y'".to_string()));
    }
}
