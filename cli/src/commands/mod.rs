// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the schoolhouse CLI

pub mod admin;
pub mod config;
pub mod db;
pub mod serve;

pub use self::admin::AdminCommand;
pub use self::config::ConfigCommand;
pub use self::db::DbCommand;

use anyhow::{Context, Result};
use schoolhouse_core::domain::config::ServerConfig;
use std::path::PathBuf;

/// Loads, env-patches and validates the configuration.
pub(crate) fn load_config(path: Option<PathBuf>) -> Result<ServerConfig> {
    let config = ServerConfig::load_or_default(path).context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;
    Ok(config)
}
