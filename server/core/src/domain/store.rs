// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Store driver contract used by the connection supervisor.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Fixed driver options applied to every connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Upper bound on a whole attempt, including server selection.
    pub server_selection_timeout: Duration,
    /// Pooled connections idle longer than this are closed.
    pub socket_idle_timeout: Duration,
    pub connect_timeout: Duration,
    pub min_pool_size: u32,
    pub max_pool_size: u32,
}

impl ConnectOptions {
    pub const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(10);
    pub const SOCKET_IDLE_TIMEOUT: Duration = Duration::from_secs(45);
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const MIN_POOL_SIZE: u32 = 2;
    pub const MAX_POOL_SIZE: u32 = 10;
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            server_selection_timeout: Self::SERVER_SELECTION_TIMEOUT,
            socket_idle_timeout: Self::SOCKET_IDLE_TIMEOUT,
            connect_timeout: Self::CONNECT_TIMEOUT,
            min_pool_size: Self::MIN_POOL_SIZE,
            max_pool_size: Self::MAX_POOL_SIZE,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("ping failed: {0}")]
    Ping(String),

    #[error("not connected")]
    NotConnected,
}

/// A backing store that can be connected, probed and released.
///
/// Implementations own the connection handle; the supervisor owns the
/// lifecycle and never touches the handle directly.
#[async_trait]
pub trait StoreDriver: Send + Sync {
    async fn connect(&self, uri: &str, options: &ConnectOptions) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    async fn disconnect(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_match_constants() {
        let opts = ConnectOptions::default();
        assert_eq!(opts.server_selection_timeout, Duration::from_secs(10));
        assert_eq!(opts.socket_idle_timeout, Duration::from_secs(45));
        assert_eq!(opts.connect_timeout, Duration::from_secs(10));
        assert_eq!((opts.min_pool_size, opts.max_pool_size), (2, 10));
    }
}
