// ABOUTME: Route assembly and application state container for dependency injection
// ABOUTME: Wires the chat page, WebSocket upgrade, and completions endpoint into one Router
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Routes
//!
//! [`AppState`] is the explicitly constructed, explicitly passed state of
//! the gateway: the context store and command registry are built here and
//! injected through the router, never reached through ambient statics. Each
//! test instantiates its own.

use crate::commands::CommandRegistry;
use crate::completions::chat_completions;
use crate::config::ServerConfig;
use crate::connection::handle_socket;
use crate::context::ContextStore;
use crate::templates::CHAT_PAGE;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Shared application state, injected at construction
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ContextStore>,
    pub registry: Arc<CommandRegistry>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Build the state with a fresh store and the built-in command set
    #[must_use]
    pub fn new(config: Arc<ServerConfig>) -> Self {
        let store = Arc::new(ContextStore::new());
        let registry = Arc::new(CommandRegistry::with_builtins(store.clone()));
        Self {
            store,
            registry,
            config,
        }
    }
}

/// Assemble the full application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(chat_page))
        .route("/ws", get(websocket_upgrade))
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn chat_page() -> Html<&'static str> {
    Html(CHAT_PAGE)
}

/// Upgrade and hand the socket to its owning connection task
async fn websocket_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    debug!("websocket connection request");
    ws.on_upgrade(move |socket| handle_socket(socket, state.store.clone(), state.registry.clone()))
}
