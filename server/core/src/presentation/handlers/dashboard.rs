// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Role dashboards. The welcome routes never touch the store.

use axum::extract::State;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::{json, Value};

use crate::application::auth::AuthUser;
use crate::domain::user::Role;
use crate::presentation::api::AppState;
use crate::presentation::error::ApiResult;
use crate::presentation::middleware::{require_role, ADMIN};

/// Welcome routes, mounted outside the store guard.
pub fn welcome_routes() -> Router<AppState> {
    Router::new()
        .route("/api/student", get(student_dashboard))
        .route("/api/admin", get(admin_dashboard))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/students/count", get(student_count))
}

async fn student_dashboard(Extension(caller): Extension<AuthUser>) -> ApiResult<Json<Value>> {
    require_role(&caller, &[Role::Student, Role::Admin])?;
    Ok(Json(json!({
        "message": format!("Welcome to the student dashboard, {}", caller.username),
        "user": { "id": caller.id, "username": caller.username, "role": caller.role },
    })))
}

async fn admin_dashboard(Extension(caller): Extension<AuthUser>) -> ApiResult<Json<Value>> {
    require_role(&caller, ADMIN)?;
    Ok(Json(json!({
        "message": format!("Welcome to the admin dashboard, {}", caller.username),
        "user": { "id": caller.id, "username": caller.username, "role": caller.role },
    })))
}

async fn student_count(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<Json<Value>> {
    require_role(&caller, ADMIN)?;
    let count = state.services.users.count_students().await?;
    Ok(Json(json!({ "count": count })))
}
