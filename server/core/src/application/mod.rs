// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod connection_supervisor;
pub mod guard;
pub mod auth;
pub mod error;
pub mod repository_factory;

pub mod users;
pub mod fees;
pub mod results;
pub mod reports;
pub mod announcements;
pub mod attendance;
pub mod homework;
pub mod services;

pub use connection_supervisor::{ConnectionSupervisor, SupervisorSettings};
pub use guard::{Diagnostic, GuardOutcome, RequestGuard};
pub use services::Services;
