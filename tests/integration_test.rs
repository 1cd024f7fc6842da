// file: tests/integration_test.rs
// version: 1.2.0
// guid: 3f7c5a92-d816-44be-9c03-6b2e84d71f55

//! Integration tests exercising the public API and the compiled binary

use assert_cmd::Command;
use predicates::prelude::*;
use server_hardening_agent::config::{ConfigLoader, ProvisionProfile};
use server_hardening_agent::patch::{ConfigPatcher, DirectiveSyntax, PatchOutcome};
use server_hardening_agent::system::identity;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_provision_refuses_to_run_without_root() {
    if identity::is_superuser() {
        return; // the guard cannot be observed when the suite runs as root
    }

    Command::cargo_bin("server-hardening-agent")
        .unwrap()
        .arg("provision")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("superuser"))
        // no stage may start before the privilege check passes
        .stdout(predicate::str::contains("Installing packages").not());
}

#[test]
fn test_show_profile_prints_builtin_defaults() {
    Command::cargo_bin("server-hardening-agent")
        .unwrap()
        .arg("show-profile")
        .assert()
        .success()
        .stdout(predicate::str::contains("ssh_port: 2222"))
        .stdout(predicate::str::contains("fail2ban"))
        .stdout(predicate::str::contains("timezone: America/Phoenix"));
}

#[test]
fn test_show_profile_reads_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "ssh_port: 2200\ntimezone: UTC").unwrap();

    Command::cargo_bin("server-hardening-agent")
        .unwrap()
        .arg("show-profile")
        .arg("--config")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ssh_port: 2200"))
        .stdout(predicate::str::contains("timezone: UTC"));
}

#[test]
fn test_show_profile_rejects_invalid_config() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "ssh_port: 22").unwrap();

    Command::cargo_bin("server-hardening-agent")
        .unwrap()
        .arg("show-profile")
        .arg("--config")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("port 22"));
}

#[test]
fn test_show_profile_expands_environment_variables() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "timezone: ${{HARDEN_TZ}}").unwrap();

    Command::cargo_bin("server-hardening-agent")
        .unwrap()
        .arg("show-profile")
        .arg("--config")
        .arg(file.path())
        .env("HARDEN_TZ", "Europe/Berlin")
        .assert()
        .success()
        .stdout(predicate::str::contains("timezone: Europe/Berlin"));
}

#[test]
fn test_patcher_converges_on_second_pass() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "#Port 22\nPermitRootLogin yes\n").unwrap();

    let mut patcher = ConfigPatcher::load(DirectiveSyntax::Spaced, file.path()).unwrap();
    assert_eq!(
        patcher.set("Port", "2222"),
        PatchOutcome::Replaced
    );
    assert_eq!(
        patcher.set("PermitRootLogin", "no"),
        PatchOutcome::Replaced
    );
    patcher.save().unwrap();

    let first = std::fs::read_to_string(file.path()).unwrap();

    let mut again = ConfigPatcher::load(DirectiveSyntax::Spaced, file.path()).unwrap();
    assert_eq!(again.set("Port", "2222"), PatchOutcome::Unchanged);
    assert_eq!(again.set("PermitRootLogin", "no"), PatchOutcome::Unchanged);
    again.save().unwrap();

    let second = std::fs::read_to_string(file.path()).unwrap();
    assert_eq!(first, second);
    assert!(first.contains("Port 2222"));
    assert!(first.contains("PermitRootLogin no"));
}

#[test]
fn test_profile_loader_round_trip() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "packages:\n  - fail2ban\n  - nginx\nssh_port: 2201\nadmin_groups:\n  - sudo"
    )
    .unwrap();

    let loader = ConfigLoader::new();
    let profile = loader.load_profile(file.path()).unwrap();

    assert_eq!(profile.packages, vec!["fail2ban", "nginx"]);
    assert_eq!(profile.ssh_port, 2201);
    assert_eq!(profile.admin_groups, vec!["sudo"]);
    // unspecified fields fall back to the built-in defaults
    assert_eq!(profile.login_shell, "/usr/bin/zsh");
}

#[test]
fn test_default_profile_matches_documented_baseline() {
    let profile = ProvisionProfile::default();
    assert!(profile.validate().is_ok());
    assert_eq!(profile.packages.len(), 13);
    assert_eq!(profile.max_username_attempts, 10);
    let runtime = profile.container_runtime.unwrap();
    assert_eq!(runtime.binary, "docker");
}
