// ABOUTME: Fallback handler for unrecognized commands
// ABOUTME: Always fails with the original content echoed in the error
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{CommandError, CommandHandler};
use crate::connection::ClientChannel;
use crate::models::{CommandType, Message};
use async_trait::async_trait;

pub struct UnknownCommand;

#[async_trait]
impl CommandHandler for UnknownCommand {
    fn command_type(&self) -> CommandType {
        CommandType::Unknown
    }

    async fn execute(
        &self,
        _channel: &mut ClientChannel,
        envelope: &Message,
        _conversation_id: &str,
    ) -> Result<(), CommandError> {
        Err(CommandError::UnknownCommand(envelope.content.clone()))
    }
}
