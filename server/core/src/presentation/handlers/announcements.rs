// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Announcements, served under `/api/updates`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::{json, Value};

use crate::application::announcements::{AnnouncementQuery, AnnouncementRequest, AnnouncementView};
use crate::application::auth::AuthUser;
use crate::domain::common::AnnouncementId;
use crate::presentation::api::AppState;
use crate::presentation::error::ApiResult;
use crate::presentation::extract::{ApiJson, ApiPath, ApiQuery};
use crate::presentation::middleware::{require_role, STAFF};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/updates", get(list_updates).post(create_update))
        .route(
            "/api/updates/{id}",
            get(get_update).put(update_update).delete(delete_update),
        )
}

async fn create_update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiJson(request): ApiJson<AnnouncementRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    require_role(&caller, STAFF)?;
    let update = state.services.announcements.create(&caller, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Update created successfully", "update": update })),
    ))
}

async fn list_updates(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiQuery(query): ApiQuery<AnnouncementQuery>,
) -> ApiResult<Json<Vec<AnnouncementView>>> {
    Ok(Json(state.services.announcements.list(&caller, query).await?))
}

async fn get_update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AnnouncementId>,
) -> ApiResult<Json<AnnouncementView>> {
    Ok(Json(state.services.announcements.get(id).await?))
}

async fn update_update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiPath(id): ApiPath<AnnouncementId>,
    ApiJson(request): ApiJson<AnnouncementRequest>,
) -> ApiResult<Json<Value>> {
    require_role(&caller, STAFF)?;
    let update = state.services.announcements.update(id, request).await?;
    Ok(Json(json!({ "message": "Update updated successfully", "update": update })))
}

async fn delete_update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiPath(id): ApiPath<AnnouncementId>,
) -> ApiResult<Json<Value>> {
    require_role(&caller, STAFF)?;
    state.services.announcements.deactivate(id).await?;
    Ok(Json(json!({ "message": "Update deleted successfully" })))
}
