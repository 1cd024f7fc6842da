// file: src/config/mod.rs
// version: 1.0.0
// guid: c18f53b2-7a64-4d90-8e21-b6f40a93d5c7

//! Configuration module for the server hardening agent
//!
//! Handles the provisioning profile: built-in defaults plus optional YAML
//! overrides with environment variable substitution.

pub mod loader;
pub mod profile;

pub use loader::ConfigLoader;
pub use profile::{ContainerRuntimeSpec, ProvisionProfile, ShellFrameworkSpec};
