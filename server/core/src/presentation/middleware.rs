// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::application::auth::AuthUser;
use crate::application::guard::GuardOutcome;
use crate::domain::user::Role;
use crate::presentation::api::AppState;
use crate::presentation::error::{ApiError, StoreUnreachable};

/// Refuses the request with a 503 and a diagnostic unless the store is usable.
pub async fn require_store(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match state.guard.check().await {
        GuardOutcome::Ok => {
            let response = next.run(request).await;
            if response.extensions().get::<StoreUnreachable>().is_some() {
                // Verify off the request path; a dead socket schedules the reconnect.
                let supervisor = state.supervisor.clone();
                tokio::spawn(async move {
                    supervisor.check_health().await;
                });
            }
            Ok(response)
        }
        GuardOutcome::Unavailable(diagnostic) => {
            metrics::counter!("schoolhouse_requests_refused_total").increment(1);
            Err(ApiError::StoreUnavailable(diagnostic))
        }
    }
}

/// Verifies the bearer token and attaches the caller as an [`AuthUser`] extension.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Access denied. No token provided.".to_string()))?;

    let claims = state.tokens.verify(token)?;
    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

pub fn require_role(user: &AuthUser, allowed: &[Role]) -> Result<(), ApiError> {
    if user.has_role(allowed) {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "Access denied. Requires role: {}",
            allowed
                .iter()
                .map(|role| role.as_str())
                .collect::<Vec<_>>()
                .join(" or ")
        )))
    }
}

pub const STAFF: &[Role] = &[Role::Admin, Role::Teacher];
pub const ADMIN: &[Role] = &[Role::Admin];
