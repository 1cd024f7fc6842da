// file: src/logging/mod.rs
// version: 1.0.0
// guid: 7c4e19a5-2f8b-4d63-a1e9-5b08c3d7f246

//! Logging system for the server hardening agent

pub mod logger;

pub use logger::init_logger;
