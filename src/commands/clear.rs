// ABOUTME: Clear command emptying the conversation's message history in place
// ABOUTME: Requires an existing chat context
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{CommandError, CommandHandler};
use crate::connection::ClientChannel;
use crate::context::ContextStore;
use crate::models::{CommandType, Message};
use async_trait::async_trait;
use std::sync::Arc;

pub struct ClearCommand {
    store: Arc<ContextStore>,
}

impl ClearCommand {
    #[must_use]
    pub fn new(store: Arc<ContextStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommandHandler for ClearCommand {
    fn command_type(&self) -> CommandType {
        CommandType::Clear
    }

    fn help_text(&self) -> &'static str {
        "/clear - 清除聊天记录"
    }

    async fn execute(
        &self,
        channel: &mut ClientChannel,
        _envelope: &Message,
        conversation_id: &str,
    ) -> Result<(), CommandError> {
        if !self.store.clear_history(conversation_id).await {
            return Err(CommandError::ChatContextNotFound);
        }
        channel.send_response("聊天记录已清除", None).await?;
        Ok(())
    }
}
