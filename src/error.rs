// file: src/error.rs
// version: 1.1.0
// guid: 3f8c2a91-5d47-4b1e-9c06-8a2e5f71d3b4

use thiserror::Error;

/// Result type alias for the agent
pub type Result<T> = std::result::Result<T, ProvisionError>;

/// Error types for the server hardening agent
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Privilege error: {0}")]
    PrivilegeError(String),

    #[error("Command '{command}' failed (exit code: {exit_code:?}): {stderr}")]
    ProcessError {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Config patch error: {0}")]
    PatchError(String),

    #[error("Prompt error: {0}")]
    PromptError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
