// ABOUTME: Wire-level message envelope exchanged over the chat WebSocket
// ABOUTME: Defines message/role/command enums, the Message struct, and its constructors
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Message Envelope
//!
//! Every frame on the chat socket, inbound and outbound, is a single JSON
//! object of this shape. Enums serialize as their string value and the
//! timestamp as ISO-8601.
//!
//! Invariant: `command` is set iff `message_type` is [`MessageType::Command`].
//! The constructors below are the only way envelopes are built, which keeps
//! that invariant by construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The sender identity used for all server-originated envelopes
pub const SYSTEM_SENDER: &str = "System";

/// Envelope type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Chat,
    Command,
    Response,
    Error,
    System,
    FetchResponse,
}

/// Who an envelope speaks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Agent,
    System,
}

/// Commands the gateway understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    Help,
    Clear,
    Rename,
    Status,
    History,
    Unknown,
    Fetch,
    AddFav,
    ParamsRequest,
}

impl CommandType {
    /// Resolve a slash-command name (already case-folded, without the `/`)
    /// to a command. Names that map to no user-invocable command resolve to
    /// [`CommandType::Unknown`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "help" => Self::Help,
            "clear" => Self::Clear,
            "rename" => Self::Rename,
            "status" => Self::Status,
            "history" => Self::History,
            "fetch" => Self::Fetch,
            "add_fav" => Self::AddFav,
            _ => Self::Unknown,
        }
    }

    /// The wire name of this command
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Clear => "clear",
            Self::Rename => "rename",
            Self::Status => "status",
            Self::History => "history",
            Self::Unknown => "unknown",
            Self::Fetch => "fetch",
            Self::AddFav => "add_fav",
            Self::ParamsRequest => "params_request",
        }
    }
}

/// The unit exchanged over the socket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Envelope type
    #[serde(rename = "type")]
    pub message_type: MessageType,
    /// Role of the originator
    pub role: MessageRole,
    /// Text payload (may be empty)
    pub content: String,
    /// Display identifier of the sender
    pub sender: String,
    /// Creation instant, ISO-8601 on the wire
    pub timestamp: DateTime<Utc>,
    /// Which command this envelope carries (present iff `type = command`)
    #[serde(default)]
    pub command: Option<CommandType>,
    /// Structured payload
    #[serde(default)]
    pub data: Option<Value>,
}

impl Message {
    fn new(
        message_type: MessageType,
        role: MessageRole,
        content: impl Into<String>,
        sender: impl Into<String>,
        command: Option<CommandType>,
        data: Option<Value>,
    ) -> Self {
        Self {
            message_type,
            role,
            content: content.into(),
            sender: sender.into(),
            timestamp: Utc::now(),
            command,
            data,
        }
    }

    /// A user chat message (also used for the echo acknowledgment)
    pub fn chat(content: impl Into<String>, sender: impl Into<String>) -> Self {
        Self::new(
            MessageType::Chat,
            MessageRole::User,
            content,
            sender,
            None,
            None,
        )
    }

    /// A user-issued command envelope
    pub fn user_command(
        command: CommandType,
        content: impl Into<String>,
        sender: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        Self::new(
            MessageType::Command,
            MessageRole::User,
            content,
            sender,
            Some(command),
            data,
        )
    }

    /// A server-issued command envelope (fetch requests, parameter requests)
    pub fn system_command(
        command: CommandType,
        content: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        Self::new(
            MessageType::Command,
            MessageRole::System,
            content,
            SYSTEM_SENDER,
            Some(command),
            data,
        )
    }

    /// A successful command response
    pub fn response(content: impl Into<String>, data: Option<Value>) -> Self {
        Self::new(
            MessageType::Response,
            MessageRole::System,
            content,
            SYSTEM_SENDER,
            None,
            data,
        )
    }

    /// An error envelope
    pub fn error(content: impl Into<String>) -> Self {
        Self::new(
            MessageType::Error,
            MessageRole::System,
            content,
            SYSTEM_SENDER,
            None,
            None,
        )
    }

    /// A system notice (welcome message etc.)
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(
            MessageType::System,
            MessageRole::System,
            content,
            SYSTEM_SENDER,
            None,
            None,
        )
    }

    /// Wraps a client-supplied fetch result
    pub fn fetch_response(data: Value) -> Self {
        Self::new(
            MessageType::FetchResponse,
            MessageRole::System,
            "",
            SYSTEM_SENDER,
            None,
            Some(data),
        )
    }

    /// Serialize to the wire representation, emitting all fields
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (practically unreachable for
    /// this type).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
