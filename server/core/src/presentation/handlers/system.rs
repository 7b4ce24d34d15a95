// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::presentation::api::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
}

async fn banner() -> Json<Value> {
    Json(json!({
        "message": "Schoolhouse API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": "/auth",
            "attendance": "/api/attendance",
            "homework": "/api/homework",
            "fees": "/api/fees",
            "results": "/api/results",
            "reports": "/api/reports",
            "updates": "/api/updates",
            "health": "/health",
        },
    }))
}

/// Liveness plus the store state. Never triggers a connection attempt.
async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339(),
        "uptime": state.started_at.elapsed().as_secs_f64(),
        "database": state.supervisor.state(),
        "environment": state.config.server.environment.as_str(),
    }))
}

pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Route not found",
            "requestedUrl": uri.to_string(),
        })),
    )
}
