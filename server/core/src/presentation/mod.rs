// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`schoolhouse-core`)
//!
//! HTTP surface that translates requests into application service calls.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Router, shared state, CORS and tracing layers |
//! | [`middleware`] | Store guard, token authentication, role checks |
//! | [`handlers`] | One module per resource |
//! | [`error`] | `ApiError` to HTTP response mapping |
//! | [`extract`] | JSON-rejecting extractors |

pub mod api;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
