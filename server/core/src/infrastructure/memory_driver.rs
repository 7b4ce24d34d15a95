// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Store driver for the in-memory backend. Connecting always succeeds.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::store::{ConnectOptions, StoreDriver, StoreError};

#[derive(Debug, Default)]
pub struct InMemoryDriver {
    connected: AtomicBool,
}

impl InMemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoreDriver for InMemoryDriver {
    async fn connect(&self, _uri: &str, _options: &ConnectOptions) -> Result<(), StoreError> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::NotConnected)
        }
    }

    async fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }
}
