// file: src/cli/args.rs
// version: 1.2.0
// guid: 4b93f8c2-16da-4e55-8b0f-7d2a90c35e14

//! Command line argument definitions

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "server-hardening-agent")]
#[command(about = "Interactive hardening and provisioning for fresh Ubuntu servers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full hardening pipeline on this machine (requires root)
    Provision {
        #[arg(short, long, help = "Path to a YAML provisioning profile")]
        config: Option<String>,
    },

    /// Print the effective provisioning profile as YAML
    ShowProfile {
        #[arg(short, long, help = "Path to a YAML provisioning profile")]
        config: Option<String>,
    },
}
