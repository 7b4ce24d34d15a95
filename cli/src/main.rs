// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Schoolhouse
//!
//! The `schoolhouse` binary runs the HTTP server and a few operator commands.
//!
//! ## Commands
//!
//! - `schoolhouse serve` - Connect to the store and serve the REST API
//! - `schoolhouse config show|validate|generate` - Configuration management
//! - `schoolhouse db check` - One connection attempt with a classified result
//! - `schoolhouse admin init` - Create the admin account if none exists

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use schoolhouse_core::domain::config::ServerConfig;

mod commands;

use commands::{AdminCommand, ConfigCommand, DbCommand};

/// Schoolhouse - school-management backend
#[derive(Parser)]
#[command(name = "schoolhouse")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "SCHOOLHOUSE_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); defaults to observability.log_level
    #[arg(long, global = true, env = "SCHOOLHOUSE_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    #[command(name = "serve")]
    Serve {
        /// Bind address (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Store connectivity
    #[command(name = "db")]
    Db {
        #[command(subcommand)]
        command: DbCommand,
    },

    /// Account administration
    #[command(name = "admin")]
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal outside development.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let log_level = match cli.log_level.clone() {
        Some(level) => level,
        None => ServerConfig::load_or_default(cli.config.clone())
            .map(|config| config.observability.log_level)
            .unwrap_or_else(|_| "info".to_string()),
    };
    init_tracing(&log_level)?;

    match cli.command {
        Some(Commands::Serve { host, port }) => commands::serve::run(cli.config, host, port).await,
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        Some(Commands::Db { command }) => commands::db::handle_command(command, cli.config).await,
        Some(Commands::Admin { command }) => {
            commands::admin::handle_command(command, cli.config).await
        }
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// `RUST_LOG` wins over `--log-level`.
fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level '{}'", level))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
