// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tiergate - tier-escalating chat gateway.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod config_cmd;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tiergate_config::{ConfigError, TiergateConfig};

/// Tiergate - tier-escalating chat gateway.
#[derive(Parser, Debug)]
#[command(name = "tiergate", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the XDG hierarchy.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate configuration and report tier bindings.
    Check,
    /// Print the effective configuration with secrets masked.
    Show,
}

fn load(path: Option<&PathBuf>) -> Result<TiergateConfig, Vec<ConfigError>> {
    match path {
        Some(path) => tiergate_config::load_and_validate_path(path),
        None => tiergate_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            tiergate_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Config {
            action: ConfigCommand::Check,
        }) => {
            config_cmd::run_check(&config);
            Ok(())
        }
        Some(Commands::Config {
            action: ConfigCommand::Show,
        }) => config_cmd::run_show(&config),
        None => {
            println!("tiergate: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
