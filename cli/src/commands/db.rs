// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Store connectivity commands

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use schoolhouse_core::domain::connection::{redact_uri, ConnectionEvent, UriType};
use schoolhouse_core::presentation::api::AppState;

#[derive(Subcommand)]
pub enum DbCommand {
    /// Make one connection attempt and report the outcome
    Check,
}

pub async fn handle_command(command: DbCommand, config_override: Option<PathBuf>) -> Result<()> {
    match command {
        DbCommand::Check => check(config_override).await,
    }
}

async fn check(config_override: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config_override)?;
    let backend = config.database.backend;
    let state = AppState::from_config(config);
    let supervisor = state.supervisor;

    let uri = supervisor.uri().map(redact_uri);
    println!("{}", "Store:".bold());
    println!("  Backend: {:?}", backend);
    println!("  URI: {}", uri.as_deref().unwrap_or("(not set)"));
    println!("  Target: {}", UriType::of(supervisor.uri()));
    println!();

    let mut events = supervisor.events().subscribe();
    let connected = supervisor.connect(1).await;
    println!("  State: {}", supervisor.state());

    if connected {
        println!("{}", "✓ Connection established".green());
        supervisor.shutdown().await;
        return Ok(());
    }

    while let Ok(event) = events.try_recv() {
        if let ConnectionEvent::Error { kind, message, .. } = event {
            println!("  Failure: {} ({})", kind, message);
            println!("  Hint: {}", kind.hint());
        }
    }
    anyhow::bail!("store connection failed")
}
