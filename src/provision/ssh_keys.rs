// file: src/provision/ssh_keys.rs
// version: 1.0.0
// guid: 4d1a75e0-2f68-4193-8c0b-a5b38f6dc729

//! SSH public key enrollment for the new administrative user

use crate::prompt::Prompter;
use crate::system::CommandRunner;
use crate::Result;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::info;

pub struct KeyEnrollment<'a, R: CommandRunner, P: Prompter> {
    runner: &'a mut R,
    prompter: &'a mut P,
    home_root: PathBuf,
}

impl<'a, R: CommandRunner, P: Prompter> KeyEnrollment<'a, R, P> {
    pub fn new(runner: &'a mut R, prompter: &'a mut P) -> Self {
        Self {
            runner,
            prompter,
            home_root: PathBuf::from("/home"),
        }
    }

    /// Override where user homes live
    pub fn with_home_root<Q: AsRef<Path>>(mut self, root: Q) -> Self {
        self.home_root = root.as_ref().to_path_buf();
        self
    }

    /// Prompt for public keys until an empty line, appending each one verbatim
    /// to the user's authorized_keys.
    ///
    /// Keys are not validated; sshd ignores lines it cannot parse. A closed
    /// input stream terminates the loop like an empty line does.
    pub async fn enroll_keys(&mut self, username: &str) -> Result<usize> {
        let ssh_dir = self.home_root.join(username).join(".ssh");
        if !ssh_dir.exists() {
            tokio::fs::create_dir_all(&ssh_dir).await?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                tokio::fs::set_permissions(&ssh_dir, std::fs::Permissions::from_mode(0o700))
                    .await?;
            }
        }

        let key_file = ssh_dir.join("authorized_keys");
        let mut enrolled = 0usize;

        loop {
            match self.prompter.ask("Enter ssh public key: ").await? {
                None => break,
                Some(line) if line.is_empty() => break,
                Some(line) => {
                    self.append_key(&key_file, &line).await?;
                    enrolled += 1;
                }
            }
        }

        if enrolled > 0 {
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                tokio::fs::set_permissions(&key_file, std::fs::Permissions::from_mode(0o600))
                    .await?;
            }
        }

        // the directory was created by root; hand it to its owner
        self.runner
            .execute(&format!(
                "chown -R {0}:{0} {1}",
                username,
                ssh_dir.display()
            ))
            .await?;

        info!("Enrolled {} ssh key(s) for {}", enrolled, username);
        Ok(enrolled)
    }

    async fn append_key(&mut self, key_file: &Path, key: &str) -> Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(key_file)
            .await?;
        file.write_all(format!("{}\n", key).as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
