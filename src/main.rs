// file: src/main.rs
// version: 1.2.0
// guid: 8c1f5d27-9ab4-4e08-b6f3-d09e72c81a46

//! Server Hardening Agent - Main entry point

use clap::Parser;
use server_hardening_agent::{
    cli::{args::Cli, commands::*},
    logging::logger,
};
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if let Err(e) = logger::init_logger(cli.verbose, cli.quiet) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Set up signal handling for graceful shutdown
    let shutdown_signal = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        warn!("Received Ctrl+C, initiating graceful shutdown...");
        cleanup_on_exit().await;
    };

    // Execute command with signal handling
    let command_future = async {
        match cli.command {
            server_hardening_agent::cli::args::Commands::Provision { config } => {
                provision_command(config).await
            }
            server_hardening_agent::cli::args::Commands::ShowProfile { config } => {
                show_profile_command(config).await
            }
        }
    };

    // Run command with signal handling
    let result = tokio::select! {
        result = command_future => result,
        _ = shutdown_signal => {
            warn!("Application interrupted by user");
            std::process::exit(130); // Standard exit code for Ctrl+C
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Cleanup function called on exit. Provisioning applies changes in place
/// and keeps no intermediate artifacts, so there is nothing to remove.
async fn cleanup_on_exit() {
    info!("Cleanup completed");
}
