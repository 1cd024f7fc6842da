// file: src/cli/mod.rs
// version: 1.2.0
// guid: 2a85e7d1-40cb-49f3-bc68-91d4f27a50e3

//! Command line interface

pub mod args;
pub mod commands;
