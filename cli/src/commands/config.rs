// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};

use schoolhouse_core::domain::config::{ServerConfig, CONFIG_ENV_VAR};
use schoolhouse_core::domain::connection::{redact_uri, UriType};

const MINIMAL_TEMPLATE: &str = include_str!("../../templates/config-minimal.yaml");
const EXAMPLES_TEMPLATE: &str = include_str!("../../templates/config-with-examples.yaml");

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path
        #[arg(short, long, default_value = "./schoolhouse.yaml")]
        output: PathBuf,

        /// Include every section with comments
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths),
        ConfigCommand::Validate { file } => validate(file.or(config_override)),
        ConfigCommand::Generate { output, examples } => generate(&output, examples),
    }
}

fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = ServerConfig::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        match &config_override {
            Some(path) => println!("  1. --config flag: {}", path.display()),
            None => println!("  1. --config flag: {}", "(not set)".dimmed()),
        }
        println!(
            "  2. {}: {}",
            CONFIG_ENV_VAR,
            std::env::var(CONFIG_ENV_VAR)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./schoolhouse.yaml");
        println!("  4. ~/.schoolhouse/config.yaml");
        println!("  5. /etc/schoolhouse/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Server:".bold());
    println!("  Address: {}:{}", config.server.host, config.server.port);
    println!("  Environment: {}", config.server.environment.as_str());
    println!();

    println!("{}", "Database:".bold());
    println!("  Backend: {:?}", config.database.backend);
    match config.database.uri.as_deref() {
        Some(uri) => println!("  URI: {}", redact_uri(uri)),
        None => println!("  URI: {}", "(not set)".yellow()),
    }
    println!("  Target: {}", UriType::of(config.database.uri.as_deref()));
    println!();

    println!("{}", "Connection policy:".bold());
    println!("  Startup attempts: {}", config.connection.startup_attempts);
    println!("  Backoff increment: {}s", config.connection.backoff_increment_secs);
    println!("  Wait timeout: {}s", config.connection.wait_timeout_secs);
    println!("  Reconnect delay: {}s", config.connection.reconnect_delay_secs);
    println!("  Health interval: {}s", config.connection.health_interval_secs);
    println!();

    println!("{}", "Auth:".bold());
    println!("  Token lifetime: {}h", config.auth.token_ttl_hours);
    println!();

    println!("{}", "CORS:".bold());
    for origin in &config.cors.allowed_origins {
        println!("  - {}", origin);
    }
    for suffix in &config.cors.allowed_suffixes {
        println!("  - *{}", suffix);
    }
    println!();

    if let Some(port) = config.observability.metrics_port {
        println!("{}", "Metrics:".bold());
        println!("  Prometheus port: {}", port);
        println!();
    }

    Ok(())
}

fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config =
        ServerConfig::load_or_default(config_path).context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

fn generate(output: &Path, with_examples: bool) -> Result<()> {
    let sample = if with_examples {
        EXAMPLES_TEMPLATE
    } else {
        MINIMAL_TEMPLATE
    };

    std::fs::write(output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_parse_and_validate() {
        for template in [MINIMAL_TEMPLATE, EXAMPLES_TEMPLATE] {
            let config = ServerConfig::from_yaml_str(template).unwrap();
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_generate_writes_loadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schoolhouse.yaml");
        generate(&path, true).unwrap();

        let config = ServerConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.connection.startup_attempts, 3);
        assert_eq!(config.observability.metrics_port, Some(9090));
    }
}
