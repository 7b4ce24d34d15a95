// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Decides whether a data-accessing request may reach the store.

use serde::Serialize;
use std::sync::Arc;

use crate::application::connection_supervisor::ConnectionSupervisor;
use crate::domain::connection::{ConnectionState, UriType};

/// Snapshot returned to clients when the store is unusable.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub uri_configured: bool,
    pub uri_type: UriType,
    pub connection_state: ConnectionState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuardOutcome {
    Ok,
    Unavailable(Diagnostic),
}

#[derive(Clone)]
pub struct RequestGuard {
    supervisor: Arc<ConnectionSupervisor>,
}

impl RequestGuard {
    pub fn new(supervisor: Arc<ConnectionSupervisor>) -> Self {
        Self { supervisor }
    }

    pub async fn check(&self) -> GuardOutcome {
        if self.supervisor.ensure_connection().await {
            return GuardOutcome::Ok;
        }
        GuardOutcome::Unavailable(self.diagnostic())
    }

    pub fn diagnostic(&self) -> Diagnostic {
        let uri = self.supervisor.uri();
        Diagnostic {
            uri_configured: uri.is_some_and(|u| !u.trim().is_empty()),
            uri_type: UriType::of(uri),
            connection_state: self.supervisor.state(),
        }
    }
}
