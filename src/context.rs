// ABOUTME: In-memory conversation and user context store shared across connections
// ABOUTME: Single-writer store guarding both mappings behind one RwLock
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Context Store
//!
//! Process-wide, in-memory state for the chat gateway: one [`ChatContext`]
//! per live connection and one [`UserContext`] per user id. The store is the
//! single writer of both maps; every mutation goes through a store method so
//! no component can hold a copy that drifts.
//!
//! Conversations die with their connection. User contexts are created lazily
//! and persist for the process lifetime, so a username survives across
//! conversations sharing the same user id.

use crate::models::{Message, MessageType};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Per-user state, keyed by the immutable `user_id`
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user_id: String,
    pub username: String,
    pub connected_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub message_count: u64,
}

impl UserContext {
    fn new(user_id: &str, username: &str) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.to_owned(),
            username: username.to_owned(),
            connected_at: now,
            last_active: now,
            message_count: 0,
        }
    }
}

/// Per-connection conversation state
#[derive(Debug, Clone)]
pub struct ChatContext {
    pub conversation_id: String,
    pub started_at: DateTime<Utc>,
    pub message_history: Vec<Message>,
    /// Owning user, resolved through the store's user map
    pub user_id: String,
    pub metadata: HashMap<String, Value>,
}

impl ChatContext {
    fn new(conversation_id: &str, user_id: &str) -> Self {
        Self {
            conversation_id: conversation_id.to_owned(),
            started_at: Utc::now(),
            message_history: Vec::new(),
            user_id: user_id.to_owned(),
            metadata: HashMap::new(),
        }
    }
}

/// Snapshot of a conversation's status, joined with its user context
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub conversation_id: String,
    pub started_at: DateTime<Utc>,
    pub message_count: u64,
    pub username: String,
    pub last_active: DateTime<Utc>,
}

#[derive(Default)]
struct StoreInner {
    conversations: HashMap<String, ChatContext>,
    users: HashMap<String, UserContext>,
}

/// Shared, single-writer store for conversation and user state
#[derive(Default)]
pub struct ContextStore {
    inner: RwLock<StoreInner>,
}

impl ContextStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a conversation for a new connection, creating the user context
    /// lazily if this `user_id` has not been seen before.
    pub async fn create_context(&self, conversation_id: &str, user_id: &str, username: &str) {
        let mut inner = self.inner.write().await;
        inner
            .users
            .entry(user_id.to_owned())
            .or_insert_with(|| UserContext::new(user_id, username));
        inner.conversations.insert(
            conversation_id.to_owned(),
            ChatContext::new(conversation_id, user_id),
        );
        debug!(conversation_id, user_id, "conversation context created");
    }

    /// Append a message to the conversation history, bumping the owning
    /// user's `message_count` and refreshing `last_active`.
    ///
    /// Returns `false` if the conversation does not exist.
    pub async fn add_message(&self, conversation_id: &str, message: Message) -> bool {
        let mut inner = self.inner.write().await;
        let Some(context) = inner.conversations.get_mut(conversation_id) else {
            return false;
        };
        let user_id = context.user_id.clone();
        context.message_history.push(message);
        if let Some(user) = inner.users.get_mut(&user_id) {
            user.message_count += 1;
            user.last_active = Utc::now();
        }
        true
    }

    /// Empty the conversation's message history in place.
    ///
    /// Returns `false` if the conversation does not exist.
    pub async fn clear_history(&self, conversation_id: &str) -> bool {
        let mut inner = self.inner.write().await;
        match inner.conversations.get_mut(conversation_id) {
            Some(context) => {
                context.message_history.clear();
                true
            }
            None => false,
        }
    }

    /// Last `count` messages of the conversation, in chronological order.
    ///
    /// Returns `None` if the conversation does not exist; a non-positive
    /// `count` yields an empty list.
    pub async fn last_messages(&self, conversation_id: &str, count: i64) -> Option<Vec<Message>> {
        let inner = self.inner.read().await;
        let context = inner.conversations.get(conversation_id)?;
        if count <= 0 {
            return Some(Vec::new());
        }
        let history = &context.message_history;
        let skip = history.len().saturating_sub(count as usize);
        Some(history[skip..].to_vec())
    }

    /// All messages of a given type, in chronological order
    pub async fn messages_by_type(
        &self,
        conversation_id: &str,
        message_type: MessageType,
    ) -> Option<Vec<Message>> {
        let inner = self.inner.read().await;
        let context = inner.conversations.get(conversation_id)?;
        Some(
            context
                .message_history
                .iter()
                .filter(|msg| msg.message_type == message_type)
                .cloned()
                .collect(),
        )
    }

    /// The user context owning this conversation, if both exist
    pub async fn conversation_user(&self, conversation_id: &str) -> Option<UserContext> {
        let inner = self.inner.read().await;
        let context = inner.conversations.get(conversation_id)?;
        inner.users.get(&context.user_id).cloned()
    }

    /// Joined conversation + user snapshot for the status command
    pub async fn status(&self, conversation_id: &str) -> Option<StatusSnapshot> {
        let inner = self.inner.read().await;
        let context = inner.conversations.get(conversation_id)?;
        let user = inner.users.get(&context.user_id)?;
        Some(StatusSnapshot {
            conversation_id: context.conversation_id.clone(),
            started_at: context.started_at,
            message_count: user.message_count,
            username: user.username.clone(),
            last_active: user.last_active,
        })
    }

    /// Replace the username for this `user_id`. All conversations owned by
    /// the user observe the new name.
    pub async fn update_username(&self, user_id: &str, new_username: &str) {
        let mut inner = self.inner.write().await;
        if let Some(user) = inner.users.get_mut(user_id) {
            user.username = new_username.to_owned();
        }
    }

    /// Remove the conversation from the store. The user context is kept.
    pub async fn close_context(&self, conversation_id: &str) {
        let mut inner = self.inner.write().await;
        if inner.conversations.remove(conversation_id).is_some() {
            debug!(conversation_id, "conversation context closed");
        }
    }

    /// Whether a conversation is currently active
    pub async fn contains(&self, conversation_id: &str) -> bool {
        self.inner
            .read()
            .await
            .conversations
            .contains_key(conversation_id)
    }

    /// Number of active conversations
    pub async fn active_conversations(&self) -> usize {
        self.inner.read().await.conversations.len()
    }
}
