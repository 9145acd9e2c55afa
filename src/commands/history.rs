// ABOUTME: History command returning the last N messages of the conversation
// ABOUTME: Count defaults to 5; non-numeric input falls back instead of erroring
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{CommandError, CommandHandler};
use crate::connection::ClientChannel;
use crate::context::ContextStore;
use crate::models::{CommandType, Message};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

const DEFAULT_COUNT: i64 = 5;

pub struct HistoryCommand {
    store: Arc<ContextStore>,
}

impl HistoryCommand {
    #[must_use]
    pub fn new(store: Arc<ContextStore>) -> Self {
        Self { store }
    }
}

/// Parse the optional `count` argument; non-numeric input falls back to the
/// default. Accepts both a JSON number and a numeric string.
fn parse_count(data: Option<&Value>) -> i64 {
    let Some(raw) = data.and_then(|d| d.get("count")) else {
        return DEFAULT_COUNT;
    };
    match raw {
        Value::Number(n) => n.as_i64().unwrap_or(DEFAULT_COUNT),
        Value::String(s) => s.trim().parse().unwrap_or(DEFAULT_COUNT),
        _ => DEFAULT_COUNT,
    }
}

#[async_trait]
impl CommandHandler for HistoryCommand {
    fn command_type(&self) -> CommandType {
        CommandType::History
    }

    fn help_text(&self) -> &'static str {
        "/history <数量> - 显示历史消息"
    }

    async fn execute(
        &self,
        channel: &mut ClientChannel,
        envelope: &Message,
        conversation_id: &str,
    ) -> Result<(), CommandError> {
        let count = parse_count(envelope.data.as_ref());
        let messages = self
            .store
            .last_messages(conversation_id, count)
            .await
            .ok_or(CommandError::ChatContextNotFound)?;

        if messages.is_empty() {
            channel.send_response("没有历史消息", None).await?;
            return Ok(());
        }

        let lines: Vec<String> = messages
            .iter()
            .map(|msg| {
                format!(
                    "[{}] {}: {}",
                    msg.timestamp.format("%H:%M:%S"),
                    msg.sender,
                    msg.content
                )
            })
            .collect();
        let text = format!("最近 {} 条消息:\n{}", messages.len(), lines.join("\n"));
        channel.send_response(&text, None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn count_defaults_and_falls_back_on_garbage() {
        assert_eq!(parse_count(None), 5);
        assert_eq!(parse_count(Some(&json!({}))), 5);
        assert_eq!(parse_count(Some(&json!({"count": "3"}))), 3);
        assert_eq!(parse_count(Some(&json!({"count": 7}))), 7);
        assert_eq!(parse_count(Some(&json!({"count": "abc"}))), 5);
        assert_eq!(parse_count(Some(&json!({"count": null}))), 5);
    }
}
