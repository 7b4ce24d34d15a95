// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Account administration commands

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use schoolhouse_core::presentation::api::AppState;

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Create the admin account unless one already exists
    Init {
        #[arg(long, env = "SCHOOLHOUSE_ADMIN_USERNAME", default_value = "admin")]
        username: String,

        #[arg(long, env = "SCHOOLHOUSE_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long, env = "SCHOOLHOUSE_ADMIN_EMAIL", default_value = "admin@school.local")]
        email: String,
    },
}

pub async fn handle_command(command: AdminCommand, config_override: Option<PathBuf>) -> Result<()> {
    match command {
        AdminCommand::Init {
            username,
            password,
            email,
        } => init(config_override, &username, &password, &email).await,
    }
}

async fn init(
    config_override: Option<PathBuf>,
    username: &str,
    password: &str,
    email: &str,
) -> Result<()> {
    let config = super::load_config(config_override)?;
    let attempts = config.connection.startup_attempts;
    let state = AppState::from_config(config);

    if !state.supervisor.connect(attempts).await {
        anyhow::bail!("store unavailable; run `schoolhouse db check` for details");
    }

    let created = state
        .services
        .users
        .ensure_admin(username, password, email)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))
        .context("Failed to create admin account");
    state.supervisor.shutdown().await;

    match created? {
        Some(profile) => println!(
            "{}",
            format!("✓ Admin account created: {}", profile.username).green()
        ),
        None => println!("{}", "An admin account already exists. Nothing to do.".yellow()),
    }
    Ok(())
}
