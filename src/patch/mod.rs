// file: src/patch/mod.rs
// version: 1.2.1
// guid: 0c5e83a7-46d1-4b29-9e70-f82a61c94d35

//! Declarative, idempotent edits to line-oriented config files.
//!
//! A directive is a key and a desired value. Instead of enumerating every
//! literal prior form of a line (`#Port 22`, `Port 22`, `Port 2200`, ...), the
//! patcher locates the key itself and rewrites the whole line to the rendered
//! form. Directives that match nothing are appended, never dropped, so an
//! unexpected base image cannot cause a silent no-op.
//!
//! Matching order per directive:
//! 1. the first live (uncommented) line whose key matches;
//! 2. otherwise the first commented-out line that parses as exactly that
//!    directive (prose comments that merely mention the key are left alone);
//! 3. otherwise append.

use crate::Result;
use std::path::{Path, PathBuf};

/// How directives are written in the target file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveSyntax {
    /// `Key value`, keys case-insensitive (sshd_config)
    Spaced,
    /// `key = value` under `[section]` headers (fail2ban jails)
    KeyValue,
}

/// What applying one directive did to the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The rendered line was already present
    Unchanged,
    /// An existing line (live or commented) was rewritten
    Replaced,
    /// No prior form existed; the directive was appended
    Appended,
}

/// Line-oriented config file editor
#[derive(Debug)]
pub struct ConfigPatcher {
    syntax: DirectiveSyntax,
    lines: Vec<String>,
    path: Option<PathBuf>,
    dirty: bool,
}

impl ConfigPatcher {
    /// Load a config file for patching
    pub fn load<P: AsRef<Path>>(syntax: DirectiveSyntax, path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            crate::error::ProvisionError::PatchError(format!(
                "Failed to read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let mut patcher = Self::from_content(syntax, &content);
        patcher.path = Some(path.as_ref().to_path_buf());
        Ok(patcher)
    }

    /// Build a patcher over in-memory content
    pub fn from_content(syntax: DirectiveSyntax, content: &str) -> Self {
        Self {
            syntax,
            lines: content.lines().map(|l| l.to_string()).collect(),
            path: None,
            dirty: false,
        }
    }

    /// Apply one directive anywhere in the file
    pub fn set(&mut self, key: &str, value: &str) -> PatchOutcome {
        self.apply_in_range(0, self.lines.len(), key, value, None)
    }

    /// Apply one directive inside the named `[section]`, creating the section
    /// at the end of the file when absent
    pub fn set_in_section(&mut self, section: &str, key: &str, value: &str) -> PatchOutcome {
        let header = format!("[{}]", section);
        let start = match self.lines.iter().position(|l| l.trim() == header) {
            Some(i) => i + 1,
            None => {
                if !self.lines.is_empty() {
                    self.lines.push(String::new());
                }
                self.lines.push(header);
                self.lines.push(self.render(key, value));
                self.dirty = true;
                return PatchOutcome::Appended;
            }
        };
        let end = self.lines[start..]
            .iter()
            .position(|l| is_section_header(l))
            .map(|off| start + off)
            .unwrap_or(self.lines.len());

        self.apply_in_range(start, end, key, value, Some(start))
    }

    /// Rendered file content
    pub fn content(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    /// Whether any directive changed the file
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the file back if anything changed
    pub fn save(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let path = self.path.clone().ok_or_else(|| {
            crate::error::ProvisionError::PatchError(
                "No backing file to save to".to_string(),
            )
        })?;
        std::fs::write(&path, self.content()).map_err(|e| {
            crate::error::ProvisionError::PatchError(format!(
                "Failed to write {}: {}",
                path.display(),
                e
            ))
        })?;
        self.dirty = false;
        Ok(())
    }

    fn apply_in_range(
        &mut self,
        start: usize,
        end: usize,
        key: &str,
        value: &str,
        insert_at: Option<usize>,
    ) -> PatchOutcome {
        let rendered = self.render(key, value);

        let live = (start..end).find(|&i| self.matches_live(&self.lines[i], key));
        if let Some(i) = live {
            if self.lines[i].trim() == rendered {
                return PatchOutcome::Unchanged;
            }
            self.lines[i] = rendered;
            self.dirty = true;
            return PatchOutcome::Replaced;
        }

        let commented = (start..end).find(|&i| self.matches_commented(&self.lines[i], key));
        if let Some(i) = commented {
            self.lines[i] = rendered;
            self.dirty = true;
            return PatchOutcome::Replaced;
        }

        match insert_at {
            Some(i) => self.lines.insert(i, rendered),
            None => self.lines.push(rendered),
        }
        self.dirty = true;
        PatchOutcome::Appended
    }

    fn render(&self, key: &str, value: &str) -> String {
        match self.syntax {
            DirectiveSyntax::Spaced => format!("{} {}", key, value),
            DirectiveSyntax::KeyValue => format!("{} = {}", key, value),
        }
    }

    fn matches_live(&self, line: &str, key: &str) -> bool {
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') {
            return false;
        }
        match self.syntax {
            DirectiveSyntax::Spaced => trimmed
                .split_whitespace()
                .next()
                .is_some_and(|tok| tok.eq_ignore_ascii_case(key)),
            DirectiveSyntax::KeyValue => trimmed
                .split_once('=')
                .is_some_and(|(lhs, _)| lhs.trim() == key),
        }
    }

    fn matches_commented(&self, line: &str, key: &str) -> bool {
        let trimmed = line.trim_start();
        let Some(rest) = trimmed.strip_prefix('#') else {
            return false;
        };
        let rest = rest.trim_start();
        match self.syntax {
            DirectiveSyntax::Spaced => {
                // only `#Key value` counts as a disabled directive
                let tokens: Vec<&str> = rest.split_whitespace().collect();
                tokens.len() == 2 && tokens[0].eq_ignore_ascii_case(key)
            }
            DirectiveSyntax::KeyValue => rest
                .split_once('=')
                .is_some_and(|(lhs, rhs)| lhs.trim() == key && !rhs.trim().is_empty()),
        }
    }
}

fn is_section_header(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('[') && trimmed.ends_with(']')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sshd(content: &str) -> ConfigPatcher {
        ConfigPatcher::from_content(DirectiveSyntax::Spaced, content)
    }

    fn ini(content: &str) -> ConfigPatcher {
        ConfigPatcher::from_content(DirectiveSyntax::KeyValue, content)
    }

    #[test]
    fn test_rewrites_live_directive() {
        let mut p = sshd("PermitRootLogin yes\nPasswordAuthentication yes\n");
        assert_eq!(p.set("PermitRootLogin", "no"), PatchOutcome::Replaced);
        assert_eq!(p.set("PasswordAuthentication", "no"), PatchOutcome::Replaced);
        assert_eq!(
            p.content(),
            "PermitRootLogin no\nPasswordAuthentication no\n"
        );
    }

    #[test]
    fn test_rescues_commented_directive() {
        let mut p = sshd("#Port 22\n");
        assert_eq!(p.set("Port", "2222"), PatchOutcome::Replaced);
        assert_eq!(p.content(), "Port 2222\n");
    }

    #[test]
    fn test_port_priors_all_converge() {
        // the three prior forms a port line can arrive in
        for prior in ["#Port 22", "Port 22", "Port 2200"] {
            let mut p = sshd(&format!("{}\n", prior));
            p.set("Port", "2222");
            assert_eq!(p.content(), "Port 2222\n", "prior form: {}", prior);
        }
    }

    #[test]
    fn test_double_apply_is_idempotent() {
        for prior in ["#Port 22", "Port 22", "Port 2200"] {
            let mut p = sshd(&format!("{}\nPermitRootLogin yes\n", prior));
            p.set("Port", "2222");
            p.set("PermitRootLogin", "no");
            let once = p.content();

            let mut again = sshd(&once);
            assert_eq!(again.set("Port", "2222"), PatchOutcome::Unchanged);
            assert_eq!(again.set("PermitRootLogin", "no"), PatchOutcome::Unchanged);
            assert_eq!(again.content(), once);
            assert!(!again.is_dirty());
        }
    }

    #[test]
    fn test_appends_when_directive_absent() {
        let mut p = sshd("X11Forwarding yes\n");
        assert_eq!(p.set("PasswordAuthentication", "no"), PatchOutcome::Appended);
        assert_eq!(
            p.content(),
            "X11Forwarding yes\nPasswordAuthentication no\n"
        );
    }

    #[test]
    fn test_prose_comments_survive() {
        let mut p = sshd("# Port numbers below 1024 need privileges\n#Port 22\n");
        p.set("Port", "2222");
        assert_eq!(
            p.content(),
            "# Port numbers below 1024 need privileges\nPort 2222\n"
        );
    }

    #[test]
    fn test_live_line_beats_commented_line() {
        let mut p = sshd("#Port 22\nPort 2200\n");
        p.set("Port", "2222");
        // the active directive is rewritten, the disabled one left alone
        assert_eq!(p.content(), "#Port 22\nPort 2222\n");
    }

    #[test]
    fn test_key_match_is_case_insensitive() {
        let mut p = sshd("permitrootlogin yes\n");
        assert_eq!(p.set("PermitRootLogin", "no"), PatchOutcome::Replaced);
        assert_eq!(p.content(), "PermitRootLogin no\n");
    }

    #[test]
    fn test_prefix_keys_do_not_collide() {
        let mut p = sshd("PermitRootLoginGrace yes\n");
        assert_eq!(p.set("PermitRootLogin", "no"), PatchOutcome::Appended);
    }

    #[test]
    fn test_section_scoped_replace() {
        let mut p = ini("[DEFAULT]\nbantime  = 10m\n\n[sshd]\nbantime = 5m\n");
        assert_eq!(
            p.set_in_section("DEFAULT", "bantime", "60m"),
            PatchOutcome::Replaced
        );
        assert_eq!(
            p.content(),
            "[DEFAULT]\nbantime = 60m\n\n[sshd]\nbantime = 5m\n"
        );
    }

    #[test]
    fn test_section_insert_when_key_missing() {
        let mut p = ini("[sshd]\nport = ssh\n");
        assert_eq!(
            p.set_in_section("sshd", "backend", "systemd"),
            PatchOutcome::Appended
        );
        assert_eq!(p.content(), "[sshd]\nbackend = systemd\nport = ssh\n");
    }

    #[test]
    fn test_section_created_when_absent() {
        let mut p = ini("[DEFAULT]\nmaxretry = 5\n");
        assert_eq!(
            p.set_in_section("sshd", "backend", "systemd"),
            PatchOutcome::Appended
        );
        assert_eq!(
            p.content(),
            "[DEFAULT]\nmaxretry = 5\n\n[sshd]\nbackend = systemd\n"
        );
    }

    #[test]
    fn test_ini_interpolated_value_is_replaced() {
        let mut p = ini("[sshd]\nbackend = %(sshd_backend)s\n");
        assert_eq!(
            p.set_in_section("sshd", "backend", "systemd"),
            PatchOutcome::Replaced
        );
        assert_eq!(p.content(), "[sshd]\nbackend = systemd\n");
    }

    #[test]
    fn test_jail_overrides_double_apply() {
        let base = "[DEFAULT]\nbantime  = 10m\nfindtime  = 10m\nmaxretry = 5\n\n[sshd]\nport    = ssh\n";
        let apply = |content: &str| {
            let mut p = ini(content);
            p.set_in_section("sshd", "backend", "systemd");
            p.set_in_section("DEFAULT", "bantime", "60m");
            p.set_in_section("DEFAULT", "findtime", "60m");
            p.set_in_section("DEFAULT", "maxretry", "3");
            p.content()
        };
        let once = apply(base);
        let twice = apply(&once);
        assert_eq!(once, twice);
        assert!(once.contains("bantime = 60m"));
        assert!(once.contains("findtime = 60m"));
        assert!(once.contains("maxretry = 3"));
        assert!(once.contains("backend = systemd"));
    }

    #[test]
    fn test_save_roundtrip() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sshd_config");
        std::fs::write(&path, "#Port 22\nPermitRootLogin yes\n")?;

        let mut p = ConfigPatcher::load(DirectiveSyntax::Spaced, &path)?;
        p.set("Port", "2222");
        p.set("PermitRootLogin", "no");
        p.save()?;

        let written = std::fs::read_to_string(&path)?;
        assert_eq!(written, "Port 2222\nPermitRootLogin no\n");
        Ok(())
    }

    #[test]
    fn test_save_without_changes_is_noop() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sshd_config");
        std::fs::write(&path, "Port 2222\n")?;

        let mut p = ConfigPatcher::load(DirectiveSyntax::Spaced, &path)?;
        assert_eq!(p.set("Port", "2222"), PatchOutcome::Unchanged);
        assert!(!p.is_dirty());
        p.save()?;

        assert_eq!(std::fs::read_to_string(&path)?, "Port 2222\n");
        Ok(())
    }

    #[test]
    fn test_load_missing_file_is_patch_error() {
        let err = ConfigPatcher::load(DirectiveSyntax::Spaced, "/nonexistent/sshd_config")
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
