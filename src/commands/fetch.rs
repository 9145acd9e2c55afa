// ABOUTME: Fetch delegation protocol: the server asks the client to perform an HTTP request
// ABOUTME: Sends a request descriptor, then suspends for exactly one result frame
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Fetch Delegation
//!
//! Outbound HTTP work is delegated to the connected client because the
//! client, not the server, holds the credentials the target site expects.
//! The exchange is a two-step protocol on the single connection:
//!
//! 1. the server sends a command envelope whose `data` carries the full
//!    request descriptor;
//! 2. the server suspends for exactly one inbound frame and takes its
//!    `data` field as the fetch result.
//!
//! The client contract is to answer the fetch before sending anything else;
//! the router's strictly sequential frame processing makes that safe.

use super::{CommandError, CommandHandler};
use crate::connection::ClientChannel;
use crate::errors::AppError;
use crate::models::{CommandType, Message};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Request descriptor shipped to the client in the fetch envelope's `data`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchRequest {
    pub url: String,
    pub method: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Pre-encoded string body or structured payload
    #[serde(default)]
    pub data: Option<Value>,
}

impl FetchRequest {
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".into(),
            headers: HashMap::new(),
            data: None,
        }
    }

    #[must_use]
    pub fn post_form(url: impl Into<String>, body: String) -> Self {
        let mut headers = HashMap::new();
        headers.insert(
            "Content-Type".into(),
            "application/x-www-form-urlencoded".into(),
        );
        Self {
            url: url.into(),
            method: "POST".into(),
            headers,
            data: Some(Value::String(body)),
        }
    }
}

/// Ship the request descriptor to the client.
pub(crate) async fn send_fetch_request(
    channel: &mut ClientChannel,
    request: &FetchRequest,
) -> Result<(), CommandError> {
    debug!(url = %request.url, method = %request.method, "delegating fetch to client");
    let descriptor = serde_json::to_value(request)
        .map_err(|err| CommandError::Transport(AppError::from(err)))?;
    let envelope = Message::system_command(CommandType::Fetch, "", Some(descriptor));
    channel.send_envelope(&envelope).await?;
    Ok(())
}

/// Suspend for the client's fetch result and wrap it in a `fetch_response`
/// envelope. A malformed or `data`-less reply is an unexpected failure and
/// tears the connection down.
pub(crate) async fn await_fetch_response(
    channel: &mut ClientChannel,
) -> Result<Message, CommandError> {
    let reply = channel.recv_text().await?;
    let frame: Value = serde_json::from_str(&reply).map_err(|err| {
        CommandError::Transport(AppError::invalid_format(format!(
            "fetch reply is not valid JSON: {err}"
        )))
    })?;
    let data = frame.get("data").cloned().ok_or_else(|| {
        CommandError::Transport(AppError::invalid_format(
            "fetch reply carries no data field",
        ))
    })?;
    Ok(Message::fetch_response(data))
}

/// The plain `/fetch` command: delegates a GET against the example page and
/// relays the result back to the user.
pub struct FetchCommand;

#[async_trait]
impl CommandHandler for FetchCommand {
    fn command_type(&self) -> CommandType {
        CommandType::Fetch
    }

    fn help_text(&self) -> &'static str {
        "/fetch - 请求客户端抓取示例页面"
    }

    async fn execute(
        &self,
        channel: &mut ClientChannel,
        _envelope: &Message,
        _conversation_id: &str,
    ) -> Result<(), CommandError> {
        let request = FetchRequest::get("https://example.com");
        send_fetch_request(channel, &request).await?;
        let response = await_fetch_response(channel).await?;
        channel.send_response("", response.data).await?;
        Ok(())
    }
}
