// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Claimflow - customer support claim tracking service.
//!
//! This is the binary entry point for the Claimflow server.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod serve;

/// Claimflow - customer support claim tracking service.
#[derive(Parser, Debug)]
#[command(name = "claimflow", version, about, long_about = None)]
struct Cli {
    /// Path to a configuration file (overrides the standard hierarchy).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Claimflow HTTP/WebSocket server.
    Serve,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match cli.config {
        Some(ref path) => claimflow_config::load_config_from_path(path),
        None => claimflow_config::load_config(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("claimflow: invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("claimflow serve failed: {e}");
                std::process::exit(1);
            }
        }
        None => {
            println!("claimflow: use --help for available commands");
        }
    }
}
