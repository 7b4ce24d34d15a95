// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL store driver
//!
//! Owns the `sqlx` pool behind the connection supervisor. The pool slot is
//! empty until a connect succeeds and is emptied again on disconnect, so
//! repositories that reach for it while the store is down get
//! `RepositoryError::Unavailable` instead of blocking on a dead pool.

use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::debug;

use crate::domain::repository::RepositoryError;
use crate::domain::store::{ConnectOptions, StoreDriver, StoreError};

const MIGRATIONS: &[&str] = &[include_str!("../../migrations/001_document_collections.sql")];

#[derive(Default)]
pub struct PostgresDriver {
    pool: RwLock<Option<PgPool>>,
}

impl PostgresDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the live pool, or `Unavailable` when not connected.
    pub fn pool(&self) -> Result<PgPool, RepositoryError> {
        self.pool
            .read()
            .clone()
            .ok_or_else(|| RepositoryError::Unavailable("database not connected".to_string()))
    }

    async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        for migration_sql in MIGRATIONS {
            for statement in migration_sql.split(';') {
                let trimmed = statement.trim();
                let is_comment_only = trimmed.lines().all(|l| l.trim_start().starts_with("--"));
                if trimmed.is_empty() || is_comment_only {
                    continue;
                }
                sqlx::query(trimmed).execute(pool).await?;
            }
        }
        debug!("Document collections are up to date");
        Ok(())
    }
}

#[async_trait]
impl StoreDriver for PostgresDriver {
    async fn connect(&self, uri: &str, options: &ConnectOptions) -> Result<(), StoreError> {
        let pool = PgPoolOptions::new()
            .min_connections(options.min_pool_size)
            .max_connections(options.max_pool_size)
            .acquire_timeout(options.connect_timeout)
            .idle_timeout(options.socket_idle_timeout)
            .connect(uri)
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;

        Self::run_migrations(&pool)
            .await
            .map_err(|e| StoreError::Connect(format!("migration failed: {}", e)))?;

        let previous = self.pool.write().replace(pool);
        if let Some(previous) = previous {
            previous.close().await;
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let pool = self.pool.read().clone().ok_or(StoreError::NotConnected)?;
        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map_err(|e| StoreError::Ping(e.to_string()))?;
        Ok(())
    }

    async fn disconnect(&self) {
        let pool = self.pool.write().take();
        if let Some(pool) = pool {
            pool.close().await;
        }
    }
}
