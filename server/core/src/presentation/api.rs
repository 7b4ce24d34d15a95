// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # HTTP API
//!
//! | Group | Store guard | Token |
//! |-------|-------------|-------|
//! | `/`, `/health` | no | no |
//! | `/auth/register`, `/auth/login` | yes | no |
//! | `/auth/profile`, `/api/...` data routes | yes | yes |
//! | `/api/student`, `/api/admin` welcome routes | no | yes |
//!
//! Guard and authentication are attached with `route_layer`, so unknown paths
//! fall through to the JSON 404 instead of being refused with a 503.

use axum::extract::State;
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::{from_fn_with_state, map_response_with_state};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::application::auth::TokenService;
use crate::application::connection_supervisor::{ConnectionSupervisor, SupervisorSettings};
use crate::application::guard::RequestGuard;
use crate::application::repository_factory::{create_store, Repositories};
use crate::application::services::Services;
use crate::domain::config::ServerConfig;
use crate::infrastructure::event_bus::EventBus;
use crate::presentation::error::InternalDetail;
use crate::presentation::handlers;
use crate::presentation::middleware::{authenticate, require_store};

#[derive(Clone)]
pub struct AppState {
    pub supervisor: Arc<ConnectionSupervisor>,
    pub guard: RequestGuard,
    pub tokens: TokenService,
    pub services: Services,
    pub config: Arc<ServerConfig>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        supervisor: Arc<ConnectionSupervisor>,
        repositories: &Repositories,
    ) -> Self {
        let tokens = TokenService::new(&config.auth.jwt_secret, config.auth.token_ttl_hours);
        Self {
            guard: RequestGuard::new(supervisor.clone()),
            services: Services::new(repositories, tokens.clone()),
            tokens,
            supervisor,
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }

    /// Wires driver, supervisor, repositories and services for the configured backend.
    /// Nothing connects yet; call [`ConnectionSupervisor::connect`] before serving.
    pub fn from_config(config: ServerConfig) -> Self {
        let store = create_store(&config.database);
        let settings = SupervisorSettings::from_config(&config, store.uri.clone());
        let supervisor = Arc::new(ConnectionSupervisor::new(
            store.driver.clone(),
            settings,
            EventBus::with_default_capacity(),
        ));
        Self::new(config, supervisor, &store.repositories)
    }
}

pub fn app(state: AppState) -> Router {
    let authenticated = Router::new()
        .merge(handlers::auth::routes())
        .merge(handlers::fees::routes())
        .merge(handlers::results::routes())
        .merge(handlers::reports::routes())
        .merge(handlers::announcements::routes())
        .merge(handlers::attendance::routes())
        .merge(handlers::homework::routes())
        .merge(handlers::dashboard::routes())
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    let guarded = Router::new()
        .merge(handlers::auth::public_routes())
        .merge(authenticated)
        .route_layer(from_fn_with_state(state.clone(), require_store));

    let welcome = handlers::dashboard::welcome_routes()
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    Router::new()
        .merge(handlers::system::routes())
        .merge(guarded)
        .merge(welcome)
        .fallback(handlers::system::not_found)
        .layer(map_response_with_state(state.clone(), expose_internal_detail))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = Arc::new(config.cors.clone());
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin.to_str().map(|o| cors.allows(o)).unwrap_or(false)
        }))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::PATCH,
        ])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            ACCEPT,
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true)
}

/// Puts the cause of a 500 into the body when running in development.
pub async fn expose_internal_detail(State(state): State<AppState>, response: Response) -> Response {
    if !state.config.is_development() {
        return response;
    }
    let Some(InternalDetail(detail)) = response.extensions().get::<InternalDetail>().cloned() else {
        return response;
    };
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal Server Error", "message": detail })),
    )
        .into_response()
}
