// ABOUTME: Command dispatch mechanism: handler trait, registry, and domain error taxonomy
// ABOUTME: Resolves a command enum to a handler and converts domain failures to error envelopes
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Command Registry and Handlers
//!
//! Slash-commands are dispatched through a lookup table of trait objects
//! built at startup. Registering a handler is purely additive; registering
//! twice under the same command overwrites (later registration wins).
//!
//! [`CommandRegistry::dispatch`] is the single point where handler-level
//! domain failures become user-visible error envelopes. Transport failures
//! are not caught here; they propagate to the connection router, which
//! treats them as fatal for the connection.

pub mod add_favorite;
pub mod clear;
pub mod fetch;
pub mod help;
pub mod history;
pub mod params;
pub mod rename;
pub mod status;
pub mod unknown;

pub use add_favorite::AddFavoriteCommand;
pub use clear::ClearCommand;
pub use fetch::{FetchCommand, FetchRequest};
pub use help::HelpCommand;
pub use history::HistoryCommand;
pub use params::{ParamKind, ParamSpec, ParamValue};
pub use rename::RenameCommand;
pub use status::StatusCommand;
pub use unknown::UnknownCommand;

use crate::connection::ClientChannel;
use crate::context::ContextStore;
use crate::errors::{AppError, AppResult};
use crate::models::{CommandType, Message};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Domain-level command failure, converted to an error envelope by the
/// registry. The `Transport` variant is the exception: it carries a dead or
/// failing socket upward untouched.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("无法找到聊天上下文")]
    ChatContextNotFound,
    #[error("无法找到用户上下文")]
    UserContextNotFound,
    #[error("请指定新的用户名")]
    UsernameMissing,
    #[error("未知命令: {0}")]
    UnknownCommand(String),
    #[error("参数 {name} 的值 \"{value}\" 无法转换为{expected}")]
    ParamType {
        name: String,
        value: String,
        expected: &'static str,
    },
    #[error(transparent)]
    Transport(#[from] AppError),
}

/// A single command implementation
///
/// `execute` may suspend on the channel (fetch delegation, parameter
/// collection); ordering is safe because the connection router never
/// processes two frames concurrently.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Which command this handler serves
    fn command_type(&self) -> CommandType;

    /// One-line usage description
    fn help_text(&self) -> &'static str {
        "没有帮助信息"
    }

    /// Execute the command for `envelope` on `conversation_id`
    async fn execute(
        &self,
        channel: &mut ClientChannel,
        envelope: &Message,
        conversation_id: &str,
    ) -> Result<(), CommandError>;
}

/// Maps a command identifier to its handler
pub struct CommandRegistry {
    handlers: HashMap<CommandType, Arc<dyn CommandHandler>>,
    fallback: Arc<dyn CommandHandler>,
}

impl CommandRegistry {
    /// Empty registry with only the unknown-command fallback
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            fallback: Arc::new(UnknownCommand),
        }
    }

    /// Registry populated with all built-in commands
    #[must_use]
    pub fn with_builtins(store: Arc<ContextStore>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(HelpCommand));
        registry.register(Arc::new(ClearCommand::new(store.clone())));
        registry.register(Arc::new(RenameCommand::new(store.clone())));
        registry.register(Arc::new(StatusCommand::new(store.clone())));
        registry.register(Arc::new(HistoryCommand::new(store)));
        registry.register(Arc::new(FetchCommand));
        registry.register(Arc::new(AddFavoriteCommand::new()));
        registry
    }

    /// Register a handler under its own command type. Later registrations
    /// under the same command win.
    pub fn register(&mut self, handler: Arc<dyn CommandHandler>) {
        self.handlers.insert(handler.command_type(), handler);
    }

    /// Look up the handler for a command, falling back to unknown
    #[must_use]
    pub fn resolve(&self, command: Option<CommandType>) -> &Arc<dyn CommandHandler> {
        command
            .and_then(|cmd| self.handlers.get(&cmd))
            .unwrap_or(&self.fallback)
    }

    /// Number of registered handlers (excluding the fallback)
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Dispatch a command envelope to its handler.
    ///
    /// Domain errors are converted to a single error envelope here; the
    /// command aborts but the connection survives.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport failures, which the caller must
    /// treat as fatal for the connection.
    pub async fn dispatch(
        &self,
        channel: &mut ClientChannel,
        envelope: &Message,
        conversation_id: &str,
    ) -> AppResult<()> {
        let handler = self.resolve(envelope.command);
        debug!(
            command = handler.command_type().as_str(),
            conversation_id, "dispatching command"
        );
        match handler.execute(channel, envelope, conversation_id).await {
            Ok(()) => Ok(()),
            Err(CommandError::Transport(err)) => Err(err),
            Err(domain) => {
                warn!(
                    command = handler.command_type().as_str(),
                    error = %domain,
                    "command failed"
                );
                channel.send_error(&domain.to_string()).await
            }
        }
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
