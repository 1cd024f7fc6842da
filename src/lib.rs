// file: src/lib.rs
// version: 1.0.0
// guid: a1d94c27-6b3e-4f82-b5d0-19c7e84f62a3

//! # Server Hardening Agent
//!
//! Root-run interactive provisioning pipeline that hardens a freshly created
//! Ubuntu server: installs a package set, locks down sshd and fail2ban with
//! idempotent config edits, restarts the affected services, provisions one
//! administrative user and enrolls that user's ssh public keys.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod patch;
pub mod prompt;
pub mod provision;
pub mod system;

pub use error::{ProvisionError, Result};

/// Version information for the agent
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
