// ABOUTME: Main library entry point for the Courier chat gateway
// ABOUTME: Exposes the envelope model, context store, command dispatch, and HTTP wiring
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![deny(unsafe_code)]

//! # Courier Chat Server
//!
//! A WebSocket chat gateway that multiplexes chat messages, slash-commands,
//! and a client-delegated HTTP "fetch" protocol over a single bidirectional
//! connection per user.
//!
//! ## Architecture
//!
//! - **Models**: the JSON message envelope exchanged on the socket
//! - **Context**: in-memory conversation and user state, one store per server
//! - **Commands**: registry of trait-object handlers built at startup
//! - **Connection**: per-socket router owning the read loop and lifecycle
//! - **Completions**: stateless OpenAI-style mock endpoint
//!
//! The distinctive mechanism is fetch delegation: the server asks the
//! connected client to perform an outbound HTTP call on its behalf (the
//! client holds the user's authenticated session) and suspends on the same
//! connection until the result streams back.

// ── Public API ──────────────────────────────────────────────────────────
// These modules are used by the binary crate (src/bin/) and integration
// tests (tests/).

/// Command registry, handler trait, and the built-in command set
pub mod commands;

/// Stateless OpenAI-style chat completions mock
pub mod completions;

/// Environment-based configuration management
pub mod config;

/// Per-connection WebSocket routing and lifecycle
pub mod connection;

/// In-memory conversation and user context store
pub mod context;

/// Unified error handling with standard error codes
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Wire-level message envelope model
pub mod models;

/// Route assembly and application state
pub mod routes;

/// HTTP server bootstrap
pub mod server;

/// Static chat page
pub mod templates;
