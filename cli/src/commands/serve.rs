// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `schoolhouse serve`

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use schoolhouse_core::domain::connection::{redact_uri, UriType};
use schoolhouse_core::presentation::api::{app, AppState};

pub async fn run(config_path: Option<PathBuf>, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = super::load_config(config_path)?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    info!(
        environment = config.server.environment.as_str(),
        backend = ?config.database.backend,
        "Schoolhouse starting"
    );

    if let Some(metrics_port) = config.observability.metrics_port {
        let addr = SocketAddr::from(([0, 0, 0, 0], metrics_port));
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("Failed to install Prometheus exporter")?;
        info!("Metrics exporter listening on {}", addr);
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let startup_attempts = config.connection.startup_attempts;
    let state = AppState::from_config(config);
    let supervisor = state.supervisor.clone();

    let uri = supervisor.uri().map(redact_uri);
    info!(
        uri = uri.as_deref().unwrap_or("(not set)"),
        uri_type = %UriType::of(supervisor.uri()),
        "Connecting to store"
    );
    // The server starts either way; the request guard answers 503 until a
    // connection exists.
    if !supervisor.connect(startup_attempts).await {
        warn!("Store unavailable at startup. Data routes will answer 503 until it connects.");
    }
    let monitor = supervisor.spawn_health_monitor();

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on {}", addr);

    let served = axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    monitor.abort();
    supervisor.shutdown().await;
    info!("Schoolhouse stopped");

    served.context("HTTP server failed")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
