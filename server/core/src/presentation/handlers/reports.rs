// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::{json, Value};

use crate::application::auth::AuthUser;
use crate::application::reports::{GenerateReportRequest, ReportQuery, ReportView};
use crate::domain::common::ReportId;
use crate::presentation::api::AppState;
use crate::presentation::error::ApiResult;
use crate::presentation::extract::{ApiJson, ApiPath, ApiQuery};
use crate::presentation::middleware::{require_role, ADMIN, STAFF};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/reports", get(list_reports).post(generate_report))
        .route("/api/reports/{id}", get(get_report).delete(delete_report))
}

async fn generate_report(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiJson(request): ApiJson<GenerateReportRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    require_role(&caller, STAFF)?;
    let report = state.services.reports.generate(&caller, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Report generated successfully", "report": report })),
    ))
}

async fn list_reports(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiQuery(query): ApiQuery<ReportQuery>,
) -> ApiResult<Json<Vec<ReportView>>> {
    Ok(Json(state.services.reports.list(&caller, query).await?))
}

async fn get_report(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiPath(id): ApiPath<ReportId>,
) -> ApiResult<Json<ReportView>> {
    Ok(Json(state.services.reports.get(&caller, id).await?))
}

async fn delete_report(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiPath(id): ApiPath<ReportId>,
) -> ApiResult<Json<Value>> {
    require_role(&caller, ADMIN)?;
    state.services.reports.delete(id).await?;
    Ok(Json(json!({ "message": "Report deleted successfully" })))
}
