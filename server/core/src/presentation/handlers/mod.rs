// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Route handlers, one module per resource. Each exposes `routes()` with
//! absolute paths; [`crate::presentation::api::app`] decides which
//! middleware wraps which group.

pub mod announcements;
pub mod attendance;
pub mod auth;
pub mod dashboard;
pub mod fees;
pub mod homework;
pub mod reports;
pub mod results;
pub mod system;
