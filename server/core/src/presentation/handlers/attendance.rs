// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde_json::{json, Value};

use crate::application::attendance::{AttendanceQuery, MarkAttendanceRequest};
use crate::application::auth::AuthUser;
use crate::domain::attendance::AttendanceRecord;
use crate::domain::common::UserId;
use crate::presentation::api::AppState;
use crate::presentation::error::ApiResult;
use crate::presentation::extract::{ApiJson, ApiPath, ApiQuery};
use crate::presentation::middleware::{require_role, STAFF};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/attendance/mark", post(mark_attendance))
        .route("/api/attendance/student/{student_id}", get(student_attendance))
}

async fn mark_attendance(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiJson(request): ApiJson<MarkAttendanceRequest>,
) -> ApiResult<Json<Value>> {
    require_role(&caller, STAFF)?;
    let record = state.services.attendance.mark(&caller, request).await?;
    Ok(Json(json!({ "message": "Attendance marked successfully", "attendance": record })))
}

async fn student_attendance(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiPath(student_id): ApiPath<UserId>,
    ApiQuery(query): ApiQuery<AttendanceQuery>,
) -> ApiResult<Json<Vec<AttendanceRecord>>> {
    Ok(Json(
        state
            .services
            .attendance
            .for_student(&caller, student_id, query)
            .await?,
    ))
}
