// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde_json::{json, Value};

use crate::application::auth::AuthUser;
use crate::application::fees::{FeeRequest, FeeView, PaymentRequest};
use crate::domain::common::{FeeId, UserId};
use crate::domain::fee::Fee;
use crate::presentation::api::AppState;
use crate::presentation::error::ApiResult;
use crate::presentation::extract::{ApiJson, ApiPath};
use crate::presentation::middleware::{require_role, ADMIN};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/fees", get(list_fees).post(create_or_update_fee))
        .route("/api/fees/total", get(total_collected))
        .route("/api/fees/student/{student_id}", get(student_fees))
        .route("/api/fees/{fee_id}/payment", post(record_payment))
}

async fn list_fees(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<Json<Vec<FeeView>>> {
    require_role(&caller, ADMIN)?;
    Ok(Json(state.services.fees.list_all().await?))
}

async fn total_collected(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<Json<Value>> {
    require_role(&caller, ADMIN)?;
    let total = state.services.fees.total_paid().await?;
    Ok(Json(json!({ "total": total })))
}

async fn student_fees(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiPath(student_id): ApiPath<UserId>,
) -> ApiResult<Json<Vec<Fee>>> {
    Ok(Json(state.services.fees.by_student(&caller, student_id).await?))
}

async fn create_or_update_fee(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiJson(request): ApiJson<FeeRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    require_role(&caller, ADMIN)?;
    let fee = state.services.fees.create_or_update(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Fee record saved successfully", "fee": fee })),
    ))
}

async fn record_payment(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiPath(fee_id): ApiPath<FeeId>,
    ApiJson(request): ApiJson<PaymentRequest>,
) -> ApiResult<Json<Value>> {
    require_role(&caller, ADMIN)?;
    let fee = state.services.fees.record_payment(fee_id, request).await?;
    Ok(Json(json!({ "message": "Payment recorded successfully", "fee": fee })))
}
