// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::{json, Value};

use crate::application::auth::AuthUser;
use crate::application::results::{ResultQuery, ResultRequest, ResultView};
use crate::domain::common::ExamResultId;
use crate::presentation::api::AppState;
use crate::presentation::error::ApiResult;
use crate::presentation::extract::{ApiJson, ApiPath, ApiQuery};
use crate::presentation::middleware::{require_role, ADMIN, STAFF};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/results", get(list_results).post(create_result))
        .route(
            "/api/results/{id}",
            get(get_result).put(update_result).delete(delete_result),
        )
}

async fn create_result(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiJson(request): ApiJson<ResultRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    require_role(&caller, STAFF)?;
    let result = state.services.results.create(&caller, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Result added successfully", "result": result })),
    ))
}

async fn list_results(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiQuery(query): ApiQuery<ResultQuery>,
) -> ApiResult<Json<Vec<ResultView>>> {
    Ok(Json(state.services.results.list(&caller, query).await?))
}

async fn get_result(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiPath(id): ApiPath<ExamResultId>,
) -> ApiResult<Json<ResultView>> {
    Ok(Json(state.services.results.get(&caller, id).await?))
}

async fn update_result(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiPath(id): ApiPath<ExamResultId>,
    ApiJson(request): ApiJson<ResultRequest>,
) -> ApiResult<Json<Value>> {
    require_role(&caller, STAFF)?;
    let result = state.services.results.update(id, request).await?;
    Ok(Json(json!({ "message": "Result updated successfully", "result": result })))
}

async fn delete_result(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiPath(id): ApiPath<ExamResultId>,
) -> ApiResult<Json<Value>> {
    require_role(&caller, ADMIN)?;
    state.services.results.delete(id).await?;
    Ok(Json(json!({ "message": "Result deleted successfully" })))
}
