// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::application::auth::AuthUser;
use crate::application::homework::{HomeworkPage, HomeworkQuery, HomeworkRequest, HomeworkView};
use crate::domain::common::HomeworkId;
use crate::domain::user::Role;
use crate::presentation::api::AppState;
use crate::presentation::error::ApiResult;
use crate::presentation::extract::{ApiJson, ApiPath, ApiQuery};
use crate::presentation::middleware::{require_role, STAFF};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest {
    submission_text: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/homework", get(list_homework).post(create_homework))
        .route(
            "/api/homework/{id}",
            get(get_homework).put(update_homework).delete(delete_homework),
        )
        .route("/api/homework/{id}/submit", post(submit_homework))
}

async fn create_homework(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiJson(request): ApiJson<HomeworkRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    require_role(&caller, STAFF)?;
    let homework = state.services.homework.create(&caller, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Homework created successfully", "homework": homework })),
    ))
}

async fn list_homework(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiQuery(query): ApiQuery<HomeworkQuery>,
) -> ApiResult<Json<HomeworkPage>> {
    Ok(Json(state.services.homework.list(&caller, query).await?))
}

async fn get_homework(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiPath(id): ApiPath<HomeworkId>,
) -> ApiResult<Json<HomeworkView>> {
    Ok(Json(state.services.homework.get(&caller, id).await?))
}

async fn update_homework(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiPath(id): ApiPath<HomeworkId>,
    ApiJson(request): ApiJson<HomeworkRequest>,
) -> ApiResult<Json<Value>> {
    require_role(&caller, STAFF)?;
    let homework = state.services.homework.update(id, request).await?;
    Ok(Json(json!({ "message": "Homework updated successfully", "homework": homework })))
}

async fn delete_homework(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiPath(id): ApiPath<HomeworkId>,
) -> ApiResult<Json<Value>> {
    require_role(&caller, STAFF)?;
    state.services.homework.deactivate(id).await?;
    Ok(Json(json!({ "message": "Homework deleted successfully" })))
}

async fn submit_homework(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiPath(id): ApiPath<HomeworkId>,
    ApiJson(request): ApiJson<SubmitRequest>,
) -> ApiResult<Json<Value>> {
    require_role(&caller, &[Role::Student])?;
    let submission = state
        .services
        .homework
        .submit(&caller, id, request.submission_text)
        .await?;
    Ok(Json(json!({ "message": "Homework submitted successfully", "submission": submission })))
}
