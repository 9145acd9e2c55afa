// ABOUTME: Server binary for the Courier chat gateway
// ABOUTME: Parses CLI overrides, initializes logging, and serves the gateway
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Courier Chat Server Binary
//!
//! Starts the WebSocket chat gateway with environment-driven configuration
//! and optional CLI overrides.

use anyhow::Result;
use clap::Parser;
use courier_chat_server::{config::ServerConfig, logging, server};
use tracing::info;

#[derive(Parser)]
#[command(name = "courier-chat-server")]
#[command(about = "Courier - WebSocket chat gateway with client-delegated fetch")]
pub struct Args {
    /// Override bind host
    #[arg(long)]
    host: Option<String>,

    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Container environments may pass arguments clap does not know;
    // fall back to defaults rather than refusing to start.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Argument parsing failed: {e}");
            eprintln!("Using default configuration");
            Args {
                host: None,
                http_port: None,
            }
        }
    };

    let mut config = ServerConfig::from_env()?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    logging::init_from_env()?;
    info!("Starting Courier chat gateway");

    server::serve(config).await
}
