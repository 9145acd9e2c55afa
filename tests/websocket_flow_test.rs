// ABOUTME: Integration tests for the WebSocket connection lifecycle and commands
// ABOUTME: Exercises welcome, chat echo, format errors, and every built-in command
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{connect_and_welcome, recv_envelope, send_chat, send_json, send_raw, spawn_gateway};
use serde_json::json;

#[tokio::test]
async fn welcome_advertises_help() {
    let addr = spawn_gateway().await;
    let (_ws, welcome) = connect_and_welcome(addr).await;

    assert_eq!(welcome["type"], "system");
    assert_eq!(welcome["role"], "system");
    assert_eq!(welcome["sender"], "System");
    assert!(welcome["content"].as_str().unwrap().contains("/help"));
}

#[tokio::test]
async fn chat_message_is_echoed_back() {
    let addr = spawn_gateway().await;
    let (mut ws, _) = connect_and_welcome(addr).await;

    send_chat(&mut ws, "你好", "Alice").await;
    let echo = recv_envelope(&mut ws).await;

    assert_eq!(echo["type"], "chat");
    assert_eq!(echo["role"], "user");
    assert_eq!(echo["content"], "你好");
    assert_eq!(echo["sender"], "Alice");
}

#[tokio::test]
async fn malformed_frame_reports_error_and_connection_survives() {
    let addr = spawn_gateway().await;
    let (mut ws, _) = connect_and_welcome(addr).await;

    send_raw(&mut ws, "not json").await;
    let error = recv_envelope(&mut ws).await;
    assert_eq!(error["type"], "error");
    assert_eq!(error["content"], "消息格式错误");

    // connection remains open for further frames
    send_chat(&mut ws, "still here", "Alice").await;
    let echo = recv_envelope(&mut ws).await;
    assert_eq!(echo["content"], "still here");
}

#[tokio::test]
async fn frame_missing_required_fields_is_a_format_error() {
    let addr = spawn_gateway().await;
    let (mut ws, _) = connect_and_welcome(addr).await;

    send_json(&mut ws, &json!({"content": "no sender"})).await;
    let error = recv_envelope(&mut ws).await;
    assert_eq!(error["type"], "error");
    assert_eq!(error["content"], "消息格式错误");

    send_json(&mut ws, &json!(["array", "not", "object"])).await;
    let error = recv_envelope(&mut ws).await;
    assert_eq!(error["content"], "消息格式错误");
}

#[tokio::test]
async fn help_lists_every_command() {
    let addr = spawn_gateway().await;
    let (mut ws, _) = connect_and_welcome(addr).await;

    send_chat(&mut ws, "/help", "Alice").await;
    let response = recv_envelope(&mut ws).await;

    assert_eq!(response["type"], "response");
    let text = response["content"].as_str().unwrap();
    for command in ["/help", "/clear", "/rename", "/status", "/history", "/fetch", "/add_fav"] {
        assert!(text.contains(command), "help text is missing {command}");
    }
}

#[tokio::test]
async fn rename_updates_username_seen_by_status() {
    let addr = spawn_gateway().await;
    let (mut ws, _) = connect_and_welcome(addr).await;

    send_json(&mut ws, &json!({"content": "/rename Bob", "sender": "Alice"})).await;
    let response = recv_envelope(&mut ws).await;
    assert_eq!(response["type"], "response");
    assert_eq!(response["role"], "system");
    assert!(response["content"]
        .as_str()
        .unwrap()
        .contains("用户名已更改为: Bob"));

    send_chat(&mut ws, "/status", "Alice").await;
    let status = recv_envelope(&mut ws).await;
    assert_eq!(status["type"], "response");
    assert_eq!(status["content"], "系统状态");
    assert_eq!(status["data"]["username"], "Bob");
    assert!(status["data"]["conversation_id"].is_string());
    assert!(status["data"]["duration"].is_string());
    assert!(status["data"]["started_at"].is_string());
}

#[tokio::test]
async fn rename_without_a_name_errors() {
    let addr = spawn_gateway().await;
    let (mut ws, _) = connect_and_welcome(addr).await;

    send_chat(&mut ws, "/rename", "Alice").await;
    let error = recv_envelope(&mut ws).await;
    assert_eq!(error["type"], "error");
    assert_eq!(error["content"], "请指定新的用户名");
}

#[tokio::test]
async fn rename_joins_multi_word_names() {
    let addr = spawn_gateway().await;
    let (mut ws, _) = connect_and_welcome(addr).await;

    send_chat(&mut ws, "/rename Bob the Builder", "Alice").await;
    let response = recv_envelope(&mut ws).await;
    assert!(response["content"]
        .as_str()
        .unwrap()
        .contains("Bob the Builder"));
}

#[tokio::test]
async fn history_returns_last_n_in_chronological_order() {
    let addr = spawn_gateway().await;
    let (mut ws, _) = connect_and_welcome(addr).await;

    for text in ["first", "second", "third"] {
        send_chat(&mut ws, text, "Alice").await;
        recv_envelope(&mut ws).await; // echo
    }

    send_json(&mut ws, &json!({"content": "/history 2", "sender": "Alice"})).await;
    let response = recv_envelope(&mut ws).await;
    let text = response["content"].as_str().unwrap();

    assert!(text.contains("最近 2 条消息"));
    assert!(!text.contains("first"));
    let second_pos = text.find("second").expect("second missing");
    let third_pos = text.find("third").expect("third missing");
    assert!(second_pos < third_pos, "history out of order");
}

#[tokio::test]
async fn history_count_falls_back_on_garbage() {
    let addr = spawn_gateway().await;
    let (mut ws, _) = connect_and_welcome(addr).await;

    send_chat(&mut ws, "hello", "Alice").await;
    recv_envelope(&mut ws).await;

    send_chat(&mut ws, "/history abc", "Alice").await;
    let response = recv_envelope(&mut ws).await;
    assert!(response["content"].as_str().unwrap().contains("最近 1 条消息"));
}

#[tokio::test]
async fn clear_then_history_reports_no_messages() {
    let addr = spawn_gateway().await;
    let (mut ws, _) = connect_and_welcome(addr).await;

    send_chat(&mut ws, "hello", "Alice").await;
    recv_envelope(&mut ws).await;

    send_chat(&mut ws, "/clear", "Alice").await;
    let response = recv_envelope(&mut ws).await;
    assert_eq!(response["content"], "聊天记录已清除");

    send_chat(&mut ws, "/history", "Alice").await;
    let history = recv_envelope(&mut ws).await;
    assert_eq!(history["content"], "没有历史消息");
}

#[tokio::test]
async fn commands_are_not_recorded_in_history() {
    let addr = spawn_gateway().await;
    let (mut ws, _) = connect_and_welcome(addr).await;

    send_chat(&mut ws, "only chat", "Alice").await;
    recv_envelope(&mut ws).await;
    send_chat(&mut ws, "/status", "Alice").await;
    recv_envelope(&mut ws).await;

    send_chat(&mut ws, "/history", "Alice").await;
    let history = recv_envelope(&mut ws).await;
    let text = history["content"].as_str().unwrap();
    assert!(text.contains("最近 1 条消息"));
    assert!(text.contains("only chat"));
}

#[tokio::test]
async fn unknown_command_echoes_original_content() {
    let addr = spawn_gateway().await;
    let (mut ws, _) = connect_and_welcome(addr).await;

    send_chat(&mut ws, "/frobnicate now", "Alice").await;
    let error = recv_envelope(&mut ws).await;
    assert_eq!(error["type"], "error");
    assert_eq!(error["content"], "未知命令: /frobnicate now");
}

#[tokio::test]
async fn command_names_are_case_folded() {
    let addr = spawn_gateway().await;
    let (mut ws, _) = connect_and_welcome(addr).await;

    send_chat(&mut ws, "/HELP", "Alice").await;
    let response = recv_envelope(&mut ws).await;
    assert_eq!(response["type"], "response");
    assert!(response["content"].as_str().unwrap().contains("可用命令"));
}

#[tokio::test]
async fn connections_get_independent_contexts() {
    let addr = spawn_gateway().await;
    let (mut ws1, _) = connect_and_welcome(addr).await;
    let (mut ws2, _) = connect_and_welcome(addr).await;

    send_chat(&mut ws1, "/rename Bob", "Alice").await;
    recv_envelope(&mut ws1).await;

    // the second connection has its own user context and keeps the default
    send_chat(&mut ws2, "/status", "Carol").await;
    let status = recv_envelope(&mut ws2).await;
    assert_eq!(status["data"]["username"], "游客");

    // and its own history
    send_chat(&mut ws1, "private", "Alice").await;
    recv_envelope(&mut ws1).await;
    send_chat(&mut ws2, "/history", "Carol").await;
    let history = recv_envelope(&mut ws2).await;
    assert_eq!(history["content"], "没有历史消息");
}

#[tokio::test]
async fn message_count_tracks_appends() {
    let addr = spawn_gateway().await;
    let (mut ws, _) = connect_and_welcome(addr).await;

    for i in 0..3 {
        send_chat(&mut ws, &format!("m{i}"), "Alice").await;
        recv_envelope(&mut ws).await;
    }

    send_chat(&mut ws, "/status", "Alice").await;
    let status = recv_envelope(&mut ws).await;
    assert_eq!(status["data"]["message_count"], 3);
}
