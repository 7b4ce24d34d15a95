// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::application::auth::AuthUser;
use crate::application::users::{ProfileUpdate, RegisterRequest};
use crate::presentation::api::AppState;
use crate::presentation::error::ApiResult;
use crate::presentation::extract::ApiJson;

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// Routes reachable without a token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/profile", get(profile).put(update_profile))
}

async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let user = state.services.users.register(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully", "user": user })),
    ))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<Value>> {
    let (token, user) = state
        .services
        .users
        .login(&request.username, &request.password)
        .await?;
    Ok(Json(json!({ "message": "Login successful", "token": token, "user": user })))
}

async fn profile(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<Json<Value>> {
    let user = state.services.users.profile(caller.id).await?;
    Ok(Json(json!({ "user": user })))
}

async fn update_profile(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> ApiResult<Json<Value>> {
    let user = state.services.users.update_profile(&caller, update).await?;
    Ok(Json(json!({ "message": "Profile updated successfully", "user": user })))
}
