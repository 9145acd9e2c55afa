// ABOUTME: Environment-based configuration for deployment-specific settings
// ABOUTME: Reads host, port, and tunables from environment variables with sane defaults
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Environment-based configuration management

use anyhow::{Context, Result};
use std::env;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_HTTP_PORT: u16 = 8000;
const DEFAULT_CHUNK_DELAY_MS: u64 = 50;

/// Server configuration, loaded once at startup and injected everywhere
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// HTTP/WebSocket port
    pub http_port: u16,
    /// Fixed delay between streamed completion chunks
    pub completions_chunk_delay_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            http_port: DEFAULT_HTTP_PORT,
            completions_chunk_delay_ms: DEFAULT_CHUNK_DELAY_MS,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a set variable fails to parse.
    pub fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.into());
        let http_port = match env::var("HTTP_PORT") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("invalid HTTP_PORT value: {raw}"))?,
            Err(_) => DEFAULT_HTTP_PORT,
        };
        let completions_chunk_delay_ms = match env::var("COMPLETIONS_CHUNK_DELAY_MS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("invalid COMPLETIONS_CHUNK_DELAY_MS value: {raw}"))?,
            Err(_) => DEFAULT_CHUNK_DELAY_MS,
        };

        Ok(Self {
            host,
            http_port,
            completions_chunk_delay_ms,
        })
    }

    /// One-line startup summary for the operator log
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "listening on {}:{} (completions chunk delay {}ms)",
            self.host, self.http_port, self.completions_chunk_delay_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.http_port, 8000);
        assert_eq!(config.completions_chunk_delay_ms, 50);
    }

    #[test]
    fn summary_names_the_bind_address() {
        let config = ServerConfig::default();
        assert!(config.summary().contains("127.0.0.1:8000"));
    }
}
