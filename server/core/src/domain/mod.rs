// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Mod
//!
//! Domain records, derivation rules and persistence contracts.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Pure types and rules, no I/O

pub mod common;
pub mod user;
pub mod fee;
pub mod exam_result;
pub mod report;
pub mod attendance;
pub mod homework;
pub mod announcement;
pub mod derivation;
pub mod connection;
pub mod store;
pub mod repository;
pub mod config;
