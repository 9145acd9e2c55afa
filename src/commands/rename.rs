// ABOUTME: Rename command updating the username in the context store
// ABOUTME: Keyed by user_id, so every conversation of that user sees the new name
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

pub struct RenameCommand {
    store: Arc<ContextStore>,
}

impl RenameCommand {
    #[must_use]
    pub fn new(store: Arc<ContextStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommandHandler for RenameCommand {
    fn command_type(&self) -> CommandType {
        CommandType::Rename
    }

    fn help_text(&self) -> &'static str {
        "/rename <新名字> - 修改用户名"
    }

    async fn execute(
        &self,
        channel: &mut ClientChannel,
        envelope: &Message,
        conversation_id: &str,
    ) -> Result<(), CommandError> {
        let user = self
            .store
            .conversation_user(conversation_id)
            .await
            .ok_or(CommandError::UserContextNotFound)?;

        let new_name = envelope
            .data
            .as_ref()
            .and_then(|data| data.get("new_name"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        if new_name.is_empty() {
            return Err(CommandError::UsernameMissing);
        }

        self.store.update_username(&user.user_id, new_name).await;
        channel
            .send_response(&format!("用户名已更改为: {new_name}"), None)
            .await?;
        Ok(())
    }
}
