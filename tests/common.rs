// ABOUTME: Shared test utilities for integration tests
// ABOUTME: Spawns an in-process gateway and provides WebSocket client helpers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(dead_code, clippy::missing_panics_doc, clippy::must_use_candidate)]

//! Shared test utilities for `courier_chat_server`
//!
//! Each test spawns its own server instance on an ephemeral port so state
//! never leaks between tests.

use courier_chat_server::config::ServerConfig;
use courier_chat_server::routes::{router, AppState};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration used by test servers: fast streaming, ephemeral port
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".into(),
        http_port: 0,
        completions_chunk_delay_ms: 1,
    }
}

/// Spawn a gateway with fresh state on an ephemeral port
pub async fn spawn_gateway() -> SocketAddr {
    let state = AppState::new(Arc::new(test_config()));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    addr
}

/// Open a WebSocket connection to the gateway
pub async fn connect_ws(addr: SocketAddr) -> WsClient {
    let (ws, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("websocket connect");
    ws
}

/// Connect and consume the welcome envelope, returning it alongside the client
pub async fn connect_and_welcome(addr: SocketAddr) -> (WsClient, Value) {
    let mut ws = connect_ws(addr).await;
    let welcome = recv_envelope(&mut ws).await;
    (ws, welcome)
}

/// Receive the next text frame as parsed JSON, with a timeout
pub async fn recv_envelope(ws: &mut WsClient) -> Value {
    let frame = tokio::time::timeout(RECV_TIMEOUT, async {
        loop {
            match ws.next().await {
                Some(Ok(WsMessage::Text(text))) => return text,
                Some(Ok(_)) => {}
                other => panic!("websocket ended unexpectedly: {other:?}"),
            }
        }
    })
    .await
    .expect("timed out waiting for a frame");
    serde_json::from_str(&frame).expect("frame is not valid JSON")
}

/// Send raw text (for malformed-frame scenarios)
pub async fn send_raw(ws: &mut WsClient, text: &str) {
    ws.send(WsMessage::Text(text.to_owned()))
        .await
        .expect("websocket send");
}

/// Send a JSON value as one text frame
pub async fn send_json(ws: &mut WsClient, value: &Value) {
    send_raw(ws, &value.to_string()).await;
}

/// Send a chat-shaped frame the way the served page does
pub async fn send_chat(ws: &mut WsClient, content: &str, sender: &str) {
    send_json(
        ws,
        &json!({
            "type": "chat",
            "role": "user",
            "content": content,
            "sender": sender,
        }),
    )
    .await;
}
