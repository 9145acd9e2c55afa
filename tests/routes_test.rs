// ABOUTME: Integration tests for the HTTP surface outside the chat core
// ABOUTME: Verifies the static chat page is served on the root path
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::spawn_gateway;

#[tokio::test]
async fn root_serves_the_chat_page() {
    let addr = spawn_gateway().await;
    let response = reqwest::get(format!("http://{addr}/"))
        .await
        .expect("page request");

    assert_eq!(response.status(), 200);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert!(content_type.starts_with("text/html"));

    let body = response.text().await.unwrap();
    assert!(body.contains("WebSocket 聊天"));
    assert!(body.contains("/ws"));
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let addr = spawn_gateway().await;
    let response = reqwest::get(format!("http://{addr}/nope"))
        .await
        .expect("request");
    assert_eq!(response.status(), 404);
}
