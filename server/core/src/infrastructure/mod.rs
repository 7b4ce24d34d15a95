// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Infrastructure
//!
//! Store drivers, repository implementations and the connection event bus.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Adapters behind the domain traits

pub mod db;
pub mod event_bus;
pub mod memory_driver;
pub mod repositories;
