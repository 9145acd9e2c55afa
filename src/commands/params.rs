// ABOUTME: Parameter-collection sub-protocol: specs, typed coercion, and interactive requests
// ABOUTME: Collects structured command arguments from the client one params_request at a time
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Parameter Collection
//!
//! Handlers that need structured input from the human (rather than
//! positional slash-command arguments) declare [`ParamSpec`]s and collect
//! them through [`collect_param`]: one `params_request` envelope out, one
//! reply frame in, value coerced to the declared kind. Strictly sequential,
//! never batched.
//!
//! Coercion is a closed set of typed parsers selected by [`ParamKind`].
//! A failed coercion aborts the enclosing command with no side effects.

use super::CommandError;
use crate::connection::ClientChannel;
use crate::models::{CommandType, Message};
use serde::Serialize;
use serde_json::{json, Value};

/// Declared type of a collected parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    String,
    Integer,
    Float,
    Boolean,
}

impl ParamKind {
    /// Human-readable type label used in parameter-type error messages
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::String => "字符串",
            Self::Integer => "整数",
            Self::Float => "浮点数",
            Self::Boolean => "布尔值",
        }
    }
}

/// A coerced parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl ParamValue {
    /// Render the value the way it appears in a form body
    #[must_use]
    pub fn to_form_value(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Str(s) => Value::String(s.clone()),
            Self::Int(i) => json!(i),
            Self::Float(f) => json!(f),
            Self::Bool(b) => Value::Bool(*b),
        }
    }
}

/// Declaration of one interactively collected parameter
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ParamKind,
    /// Absent default means the parameter is required
    pub default: Option<ParamValue>,
}

impl ParamSpec {
    #[must_use]
    pub fn required(name: &'static str, description: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            description,
            kind,
            default: None,
        }
    }

    #[must_use]
    pub fn optional(
        name: &'static str,
        description: &'static str,
        kind: ParamKind,
        default: ParamValue,
    ) -> Self {
        Self {
            name,
            description,
            kind,
            default: Some(default),
        }
    }

    /// The `params_request` envelope describing this parameter
    #[must_use]
    pub fn request_envelope(&self) -> Message {
        Message::system_command(
            CommandType::ParamsRequest,
            format!("请输入参数: {} ({})", self.name, self.description),
            Some(json!({
                "name": self.name,
                "description": self.description,
                "required": self.default.is_none(),
                "default": self.default.as_ref().map(ParamValue::to_json),
            })),
        )
    }

    /// Coerce a raw reply to the declared kind.
    ///
    /// A blank reply resolves to the default when one is declared. The
    /// boolean true-set is the case-insensitive `true`/`1`/`yes`/`y`, the
    /// false-set its complement `false`/`0`/`no`/`n`; everything else fails.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::ParamType`] naming the parameter and the
    /// value that failed coercion.
    pub fn coerce(&self, raw: &str) -> Result<ParamValue, CommandError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            if let Some(default) = &self.default {
                return Ok(default.clone());
            }
        }
        let type_error = || CommandError::ParamType {
            name: self.name.to_owned(),
            value: raw.to_owned(),
            expected: self.kind.label(),
        };
        match self.kind {
            ParamKind::String => Ok(ParamValue::Str(raw.to_owned())),
            ParamKind::Integer => trimmed
                .parse::<i64>()
                .map(ParamValue::Int)
                .map_err(|_| type_error()),
            ParamKind::Float => trimmed
                .parse::<f64>()
                .map(ParamValue::Float)
                .map_err(|_| type_error()),
            ParamKind::Boolean => match trimmed.to_lowercase().as_str() {
                "true" | "1" | "yes" | "y" => Ok(ParamValue::Bool(true)),
                "false" | "0" | "no" | "n" => Ok(ParamValue::Bool(false)),
                _ => Err(type_error()),
            },
        }
    }
}

/// Request one parameter from the client and coerce the reply.
///
/// Sends the `params_request` envelope, then suspends for exactly one reply
/// frame whose `content` field carries the value.
///
/// # Errors
///
/// - [`CommandError::ParamType`] on coercion failure
/// - [`CommandError::Transport`] if the socket dies or the reply frame is
///   not valid JSON (unexpected class, fatal for the connection)
pub async fn collect_param(
    channel: &mut ClientChannel,
    spec: &ParamSpec,
) -> Result<ParamValue, CommandError> {
    channel.send_envelope(&spec.request_envelope()).await?;

    let reply = channel.recv_text().await?;
    let frame: Value = serde_json::from_str(&reply).map_err(|err| {
        CommandError::Transport(crate::errors::AppError::invalid_format(format!(
            "parameter reply is not valid JSON: {err}"
        )))
    })?;
    let raw = frame
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default();
    spec.coerce(raw)
}
