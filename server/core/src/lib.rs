// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Schoolhouse Core
//!
//! School-management backend: user accounts with roles, attendance, homework,
//! fees, exam results, monthly reports and announcements.
//!
//! # Architecture
//!
//! - **Domain:** records, derivation rules, repository contracts, configuration
//! - **Application:** connection supervision, request guard, record services
//! - **Infrastructure:** store drivers, repositories, event bus
//! - **Presentation:** axum router, authentication, error mapping

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
