// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # HTTP error mapping
//!
//! | Source | Status | Body |
//! |--------|--------|------|
//! | guard refused the request | 503 | `error`, `message`, `diagnostic` |
//! | store unreachable mid-request | 503 | `{"error":"Database unavailable"}` |
//! | duplicate unique key | 400 | `error: "Duplicate Entry"`, `field` |
//! | validation | 400 | `error`, `message` |
//! | missing/invalid token | 401 | `error`, `message` |
//! | expired token | 401 | `error: "Token Expired"` |
//! | wrong role | 403 | `error`, `message` |
//! | unknown record | 404 | `error`, `message` |
//! | anything else | 500 | detail only in development |
//!
//! A 500 never carries its cause in the body written here. The cause rides
//! along as an [`InternalDetail`] response extension and
//! [`crate::presentation::api::expose_internal_detail`] copies it into the
//! body when the server runs in development.
//!
//! A 503 caused by the store failing mid-request carries a [`StoreUnreachable`]
//! extension so the store guard can have the supervisor verify the connection.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

use crate::application::auth::AuthError;
use crate::application::error::ServiceError;
use crate::application::guard::Diagnostic;
use crate::domain::repository::RepositoryError;

/// Cause of a 500, attached to the response for the development-mode rewrite.
#[derive(Debug, Clone)]
pub struct InternalDetail(pub String);

/// Marks a response produced by a store failure inside a handler.
#[derive(Debug, Clone, Copy)]
pub struct StoreUnreachable;

#[derive(Debug)]
pub enum ApiError {
    StoreUnavailable(Diagnostic),
    BadRequest(String),
    Unauthorized(String),
    TokenExpired,
    Forbidden(String),
    NotFound(String),
    Service(ServiceError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::Service(ServiceError::Repository(err))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Expired => ApiError::TokenExpired,
            AuthError::Invalid(_) => ApiError::Unauthorized("Please provide a valid token".to_string()),
            other => ApiError::Service(ServiceError::Auth(other)),
        }
    }
}

fn body(status: StatusCode, error: &str, message: &str) -> Response {
    (status, Json(json!({ "error": error, "message": message }))).into_response()
}

fn internal(cause: String) -> Response {
    error!(error = %cause, "Request failed");
    let mut response = (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "Internal Server Error",
            "message": "Something went wrong!",
        })),
    )
        .into_response();
    response.extensions_mut().insert(InternalDetail(cause));
    response
}

fn repository_response(err: RepositoryError) -> Response {
    match err {
        RepositoryError::Unavailable(ref cause) | RepositoryError::Timeout(ref cause) => {
            warn!(error = %cause, "Store unreachable during request");
            let mut response = (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "Database unavailable" })),
            )
                .into_response();
            response.extensions_mut().insert(StoreUnreachable);
            response
        }
        RepositoryError::Duplicate(field) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Duplicate Entry",
                "message": "This record already exists",
                "field": field,
            })),
        )
            .into_response(),
        RepositoryError::NotFound(what) => body(StatusCode::NOT_FOUND, "Not Found", &what),
        other => internal(other.to_string()),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::StoreUnavailable(diagnostic) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": "Service unavailable",
                    "message": "Database connection not available. Please try again later.",
                    "diagnostic": diagnostic,
                })),
            )
                .into_response(),
            ApiError::BadRequest(message) => body(StatusCode::BAD_REQUEST, "Bad Request", &message),
            ApiError::Unauthorized(message) => {
                body(StatusCode::UNAUTHORIZED, "Unauthorized", &message)
            }
            ApiError::TokenExpired => {
                body(StatusCode::UNAUTHORIZED, "Token Expired", "Please login again")
            }
            ApiError::Forbidden(message) => body(StatusCode::FORBIDDEN, "Forbidden", &message),
            ApiError::NotFound(message) => body(StatusCode::NOT_FOUND, "Not Found", &message),
            ApiError::Service(err) => match err {
                ServiceError::Validation(message) => {
                    body(StatusCode::BAD_REQUEST, "Bad Request", &message)
                }
                ServiceError::Unauthorized(message) => {
                    body(StatusCode::UNAUTHORIZED, "Unauthorized", &message)
                }
                ServiceError::Forbidden(message) => {
                    body(StatusCode::FORBIDDEN, "Forbidden", &message)
                }
                ServiceError::NotFound(what) => body(
                    StatusCode::NOT_FOUND,
                    "Not Found",
                    &format!("{} not found", what),
                ),
                ServiceError::Repository(err) => repository_response(err),
                ServiceError::Auth(AuthError::Expired) => ApiError::TokenExpired.into_response(),
                ServiceError::Auth(AuthError::Invalid(_)) => body(
                    StatusCode::UNAUTHORIZED,
                    "Invalid Token",
                    "Please provide a valid token",
                ),
                ServiceError::Auth(other) => internal(other.to_string()),
            },
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::connection::{ConnectionState, UriType};

    #[test]
    fn test_status_codes() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (
                ApiError::StoreUnavailable(Diagnostic {
                    uri_configured: false,
                    uri_type: UriType::NotSet,
                    connection_state: ConnectionState::Disconnected,
                }),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                RepositoryError::Timeout("pool timed out".into()).into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                RepositoryError::Duplicate("username".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::validation("bad").into(),
                StatusCode::BAD_REQUEST,
            ),
            (AuthError::Expired.into(), StatusCode::UNAUTHORIZED),
            (
                ServiceError::forbidden("no").into(),
                StatusCode::FORBIDDEN,
            ),
            (
                ServiceError::NotFound("Fee").into(),
                StatusCode::NOT_FOUND,
            ),
            (
                RepositoryError::Database("syntax error".into()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_internal_detail_kept_out_of_body() {
        let response = ApiError::from(RepositoryError::Database("relation missing".into()))
            .into_response();
        let detail = response.extensions().get::<InternalDetail>().cloned();
        assert_eq!(detail.map(|d| d.0).as_deref(), Some("Database error: relation missing"));
        assert!(response.extensions().get::<StoreUnreachable>().is_none());
    }

    #[test]
    fn test_store_failure_marks_response() {
        let response = ApiError::from(RepositoryError::Unavailable("connection reset".into()))
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(response.extensions().get::<StoreUnreachable>().is_some());
    }
}
