// ABOUTME: Per-connection WebSocket router owning one socket end-to-end
// ABOUTME: Classifies inbound frames into chat echo, command dispatch, or format errors
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Connection Router
//!
//! One task owns one socket for its whole life:
//! accept → welcome → active loop → cleanup. Frames are processed strictly
//! sequentially; the task only suspends at receive points, which is what
//! makes the fetch and parameter sub-protocols safe to run inline inside a
//! command handler.

use crate::commands::CommandRegistry;
use crate::context::ContextStore;
use crate::errors::{AppError, AppResult};
use crate::models::{CommandType, Message};
use axum::extract::ws::{Message as WsMessage, WebSocket};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Display name a connection starts with until the user renames
pub const DEFAULT_USERNAME: &str = "游客";

const WELCOME_TEXT: &str = "欢迎加入聊天室！输入 /help 查看可用命令";
const FORMAT_ERROR_TEXT: &str = "消息格式错误";

/// Owned send/receive half pair of one chat socket.
///
/// Command handlers receive this to emit envelopes and, for the delegation
/// sub-protocols, to suspend for the client's next frame.
pub struct ClientChannel {
    socket: WebSocket,
}

impl ClientChannel {
    #[must_use]
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }

    /// Serialize and transmit one envelope.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the socket rejects the frame.
    pub async fn send_envelope(&mut self, message: &Message) -> AppResult<()> {
        let json = message.to_json()?;
        self.socket
            .send(WsMessage::Text(json))
            .await
            .map_err(|err| AppError::transport(format!("websocket send failed: {err}")))
    }

    /// Send a response envelope with optional structured payload
    pub async fn send_response(&mut self, content: &str, data: Option<Value>) -> AppResult<()> {
        self.send_envelope(&Message::response(content, data)).await
    }

    /// Send an error envelope
    pub async fn send_error(&mut self, content: &str) -> AppResult<()> {
        self.send_envelope(&Message::error(content)).await
    }

    /// Block until the next inbound text frame.
    ///
    /// Non-text frames are skipped (the protocol is text-only; pings are
    /// answered by the transport layer).
    ///
    /// # Errors
    ///
    /// Returns `ConnectionClosed` when the peer closes or disappears, which
    /// also unblocks any sub-protocol wait in progress.
    pub async fn recv_text(&mut self) -> AppResult<String> {
        loop {
            match self.socket.recv().await {
                Some(Ok(WsMessage::Text(text))) => return Ok(text),
                Some(Ok(WsMessage::Close(_))) | None => {
                    return Err(AppError::connection_closed("client closed the connection"));
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    return Err(AppError::connection_closed(format!(
                        "websocket receive failed: {err}"
                    )));
                }
            }
        }
    }

    /// Best-effort transport close; close-time errors are swallowed.
    pub async fn close(&mut self) {
        let _ = self.socket.send(WsMessage::Close(None)).await;
    }
}

/// Own one upgraded socket end-to-end: create contexts, welcome, run the
/// read loop, and clean up whatever way the loop ends.
pub async fn handle_socket(
    socket: WebSocket,
    store: Arc<ContextStore>,
    registry: Arc<CommandRegistry>,
) {
    let conversation_id = Uuid::new_v4().to_string();
    let user_id = Uuid::new_v4().to_string();
    store
        .create_context(&conversation_id, &user_id, DEFAULT_USERNAME)
        .await;
    info!(%conversation_id, %user_id, "connection established");

    let mut channel = ClientChannel::new(socket);

    let outcome = match channel.send_envelope(&Message::system(WELCOME_TEXT)).await {
        Ok(()) => run_loop(&mut channel, &store, &registry, &conversation_id).await,
        Err(err) => Err(err),
    };

    match outcome {
        Ok(()) => debug!(%conversation_id, "connection closed by client"),
        Err(err) if err.is_connection_closed() => {
            debug!(%conversation_id, error = %err, "connection dropped");
        }
        Err(err) => {
            // One best-effort report, then tear down. Nothing is retried.
            warn!(%conversation_id, error = %err, "connection failed");
            let _ = channel
                .send_envelope(&Message::error(format!("发生错误: {err}")))
                .await;
        }
    }

    store.close_context(&conversation_id).await;
    channel.close().await;
}

/// The ACTIVE state: block for a frame, classify, route, repeat.
async fn run_loop(
    channel: &mut ClientChannel,
    store: &Arc<ContextStore>,
    registry: &Arc<CommandRegistry>,
    conversation_id: &str,
) -> AppResult<()> {
    loop {
        let text = match channel.recv_text().await {
            Ok(text) => text,
            Err(err) if err.code == crate::errors::ErrorCode::ConnectionClosed => {
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        // Parse failures and missing required fields are non-fatal: report
        // and keep the loop alive.
        let Some((content, sender)) = extract_frame_fields(&text) else {
            channel.send_error(FORMAT_ERROR_TEXT).await?;
            continue;
        };

        if content.starts_with('/') {
            let envelope = parse_command(&content, &sender);
            registry.dispatch(channel, &envelope, conversation_id).await?;
        } else {
            // Echo acknowledgment through the context's message-send path
            let echo = Message::chat(&content, &sender);
            store.add_message(conversation_id, echo.clone()).await;
            channel.send_envelope(&echo).await?;
        }
    }
}

/// Pull `content` and `sender` out of an inbound frame, or `None` if the
/// frame is not a JSON object carrying both as strings.
fn extract_frame_fields(text: &str) -> Option<(String, String)> {
    let frame: Value = serde_json::from_str(text).ok()?;
    let content = frame.get("content")?.as_str()?.to_owned();
    let sender = frame.get("sender")?.as_str()?.to_owned();
    Some((content, sender))
}

/// Turn slash-prefixed content into a command envelope. The first token
/// (case-folded, without the `/`) names the command; the rest are positional
/// arguments. `rename` joins its arguments into `data.new_name`; `history`
/// forwards its first argument as `data.count`.
fn parse_command(content: &str, sender: &str) -> Message {
    let stripped = content.trim_start_matches('/');
    let mut tokens = stripped.split_whitespace();
    let name = tokens.next().unwrap_or_default().to_lowercase();
    let args: Vec<&str> = tokens.collect();

    let command = CommandType::from_name(&name);
    let data = match command {
        CommandType::Rename if !args.is_empty() => Some(json!({ "new_name": args.join(" ") })),
        CommandType::History if !args.is_empty() => Some(json!({ "count": args[0] })),
        _ => None,
    };

    Message::user_command(command, content, sender, data)
}
