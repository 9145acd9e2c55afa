// ABOUTME: Status command reporting conversation and user state as a structured payload
// ABOUTME: Requires both chat and user context
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{CommandError, CommandHandler};
use crate::connection::ClientChannel;
use crate::context::ContextStore;
use crate::models::{CommandType, Message};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

pub struct StatusCommand {
    store: Arc<ContextStore>,
}

impl StatusCommand {
    #[must_use]
    pub fn new(store: Arc<ContextStore>) -> Self {
        Self { store }
    }
}

/// Elapsed wall-clock as `H:MM:SS`
fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

#[async_trait]
impl CommandHandler for StatusCommand {
    fn command_type(&self) -> CommandType {
        CommandType::Status
    }

    fn help_text(&self) -> &'static str {
        "/status - 显示系统状态"
    }

    async fn execute(
        &self,
        channel: &mut ClientChannel,
        _envelope: &Message,
        conversation_id: &str,
    ) -> Result<(), CommandError> {
        let status = self
            .store
            .status(conversation_id)
            .await
            .ok_or(CommandError::ChatContextNotFound)?;

        let elapsed = Utc::now()
            .signed_duration_since(status.started_at)
            .num_seconds();
        let data = json!({
            "conversation_id": status.conversation_id,
            "started_at": status.started_at.to_rfc3339(),
            "duration": format_duration(elapsed),
            "message_count": status.message_count,
            "username": status.username,
            "last_active": status.last_active.to_rfc3339(),
        });

        channel.send_response("系统状态", Some(data)).await?;
        Ok(())
    }
}
