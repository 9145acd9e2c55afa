// ABOUTME: HTTP server bootstrap binding the router to a TCP listener
// ABOUTME: Builds AppState from config and serves until shutdown
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::config::ServerConfig;
use crate::routes::{router, AppState};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Bind and serve the gateway until the process is stopped.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let config = Arc::new(config);
    let state = AppState::new(config.clone());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.http_port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.http_port))?;
    info!("{}", config.summary());

    axum::serve(listener, app)
        .await
        .context("server terminated unexpectedly")
}
