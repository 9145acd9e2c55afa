// ABOUTME: Stateless OpenAI-style chat completions mock endpoint
// ABOUTME: Validates input, then returns one JSON object or a delayed SSE chunk stream
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Mock Completions Endpoint
//!
//! `POST /v1/chat/completions` — an independent request/response endpoint
//! simulating token-by-token generation. It shares no state with the chat
//! core; the only configuration it reads is the per-chunk streaming delay.

use crate::errors::AppError;
use crate::routes::AppState;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use futures_util::stream::Stream;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

const MIN_TEMPERATURE: f64 = 0.0;
const MAX_TEMPERATURE: f64 = 2.0;
/// Characters per simulated token
const CHUNK_CHARS: usize = 4;

fn default_model() -> String {
    "courier-mock-1".into()
}

const fn default_temperature() -> f64 {
    1.0
}

/// One entry of the request's message list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Completion request body
#[derive(Debug, Deserialize)]
pub struct ChatCompletionRequest {
    #[serde(default = "default_model")]
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub stream: bool,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl ChatCompletionRequest {
    /// Reject empty message lists and out-of-range temperature.
    ///
    /// # Errors
    ///
    /// Returns a 400-class validation error.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.messages.is_empty() {
            return Err(AppError::invalid_input("messages must not be empty"));
        }
        if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(AppError::out_of_range(format!(
                "temperature must be between {MIN_TEMPERATURE} and {MAX_TEMPERATURE}, got {}",
                self.temperature
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct Usage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}

#[derive(Debug, Serialize)]
struct Choice {
    index: u32,
    message: ChatMessage,
    finish_reason: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatCompletion {
    id: String,
    object: &'static str,
    created: i64,
    model: String,
    choices: Vec<Choice>,
    usage: Usage,
}

/// The simulated reply: a fixed-prefix echo of the last message
fn mock_reply(request: &ChatCompletionRequest) -> String {
    let last = request
        .messages
        .last()
        .map(|msg| msg.content.as_str())
        .unwrap_or_default();
    format!("收到消息「{last}」。这是一条模拟生成的回复。")
}

/// Split the reply into simulated tokens, honoring `max_tokens`
fn tokenize(reply: &str, max_tokens: Option<u32>) -> Vec<String> {
    let chars: Vec<char> = reply.chars().collect();
    let mut tokens: Vec<String> = chars
        .chunks(CHUNK_CHARS)
        .map(|chunk| chunk.iter().collect())
        .collect();
    if let Some(limit) = max_tokens {
        tokens.truncate(limit as usize);
    }
    tokens
}

fn completion_id() -> String {
    format!("chatcmpl-{}", Uuid::new_v4().simple())
}

/// Handle `POST /v1/chat/completions`
///
/// # Errors
///
/// Returns a validation error for an empty message list or an out-of-range
/// temperature.
pub async fn chat_completions(
    State(state): State<AppState>,
    Json(request): Json<ChatCompletionRequest>,
) -> Result<Response, AppError> {
    request.validate()?;
    debug!(
        model = %request.model,
        stream = request.stream,
        messages = request.messages.len(),
        "completion requested"
    );

    let reply = mock_reply(&request);
    let tokens = tokenize(&reply, request.max_tokens);
    let prompt_tokens: usize = request
        .messages
        .iter()
        .map(|msg| msg.content.chars().count().div_ceil(CHUNK_CHARS).max(1))
        .sum();

    if request.stream {
        let delay = Duration::from_millis(state.config.completions_chunk_delay_ms);
        return Ok(stream_completion(request.model, tokens, delay).into_response());
    }

    let completion_tokens = tokens.len();
    let completion = ChatCompletion {
        id: completion_id(),
        object: "chat.completion",
        created: Utc::now().timestamp(),
        model: request.model,
        choices: vec![Choice {
            index: 0,
            message: ChatMessage {
                role: "assistant".into(),
                content: tokens.concat(),
            },
            finish_reason: "stop",
        }],
        usage: Usage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        },
    };
    Ok(Json(completion).into_response())
}

/// Emit the reply as incremental chunk events with a fixed delay per chunk,
/// terminated by the `[DONE]` sentinel.
fn stream_completion(
    model: String,
    tokens: Vec<String>,
    delay: Duration,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let id = completion_id();
    let created = Utc::now().timestamp();

    let stream = async_stream::stream! {
        // role preamble chunk, the way streaming providers open a choice
        yield Ok::<_, Infallible>(chunk_event(&id, created, &model, json!({"role": "assistant"}), None));

        for token in tokens {
            tokio::time::sleep(delay).await;
            yield Ok(chunk_event(&id, created, &model, json!({"content": token}), None));
        }

        yield Ok(chunk_event(&id, created, &model, json!({}), Some("stop")));
        yield Ok(Event::default().data("[DONE]"));
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn chunk_event(
    id: &str,
    created: i64,
    model: &str,
    delta: serde_json::Value,
    finish_reason: Option<&str>,
) -> Event {
    let chunk = json!({
        "id": id,
        "object": "chat.completion.chunk",
        "created": created,
        "model": model,
        "choices": [{
            "index": 0,
            "delta": delta,
            "finish_reason": finish_reason,
        }],
    });
    Event::default().data(chunk.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(messages: Vec<ChatMessage>, temperature: f64) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: default_model(),
            messages,
            stream: false,
            temperature,
            max_tokens: None,
        }
    }

    fn user_message(content: &str) -> ChatMessage {
        ChatMessage {
            role: "user".into(),
            content: content.into(),
        }
    }

    #[test]
    fn empty_message_list_is_rejected() {
        let err = request(vec![], 1.0).validate().unwrap_err();
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn temperature_bounds_are_inclusive() {
        let messages = vec![user_message("hi")];
        assert!(request(messages.clone(), 0.0).validate().is_ok());
        assert!(request(messages.clone(), 2.0).validate().is_ok());
        assert!(request(messages.clone(), 2.1).validate().is_err());
        assert!(request(messages, -0.1).validate().is_err());
    }

    #[test]
    fn max_tokens_truncates_the_reply() {
        let reply = mock_reply(&request(vec![user_message("你好")], 1.0));
        let unbounded = tokenize(&reply, None);
        let bounded = tokenize(&reply, Some(2));
        assert!(unbounded.len() > 2);
        assert_eq!(bounded.len(), 2);
        assert_eq!(bounded[..], unbounded[..2]);
    }

    #[test]
    fn mock_reply_echoes_last_message() {
        let reply = mock_reply(&request(
            vec![user_message("first"), user_message("last one")],
            1.0,
        ));
        assert!(reply.contains("last one"));
        assert!(!reply.contains("first,"));
    }
}
