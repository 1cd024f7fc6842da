// file: src/system/mod.rs
// version: 1.0.0
// guid: 5b9d3e71-8c24-4f06-9a5d-2e7b41c8f093

//! OS-facing plumbing: command execution, identity, services, script fetching

pub mod download;
pub mod identity;
pub mod runner;
pub mod services;

pub use download::ScriptFetcher;
pub use runner::{CommandRunner, LocalRunner};
pub use services::{ServiceHealth, ServiceManager};
