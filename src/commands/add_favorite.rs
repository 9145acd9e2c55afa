// ABOUTME: Add-favorite command: interactive parameter collection plus a delegated POST fetch
// ABOUTME: Collects rid and add_media_ids, fixes the remaining form fields, reports the result
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::fetch::{await_fetch_response, send_fetch_request, FetchRequest};
use super::params::{collect_param, ParamKind, ParamSpec};
use super::{CommandError, CommandHandler};
use crate::connection::ClientChannel;
use crate::models::{CommandType, Message};
use async_trait::async_trait;
use tracing::debug;
use urlencoding::encode;

const FAVORITES_ENDPOINT: &str = "https://api.bilibili.com/x/v3/fav/resource/deal";

pub struct AddFavoriteCommand {
    params: [ParamSpec; 2],
}

impl AddFavoriteCommand {
    #[must_use]
    pub fn new() -> Self {
        Self {
            params: [
                ParamSpec::required("rid", "视频/专栏ID", ParamKind::String),
                ParamSpec::required("add_media_ids", "目标收藏夹ID", ParamKind::String),
            ],
        }
    }

    /// The five form fields in their documented fixed order. `type`,
    /// `del_media_ids`, and `platform` are fixed values; the collected
    /// fields are URL-encoded.
    fn form_body(rid: &str, add_media_ids: &str) -> String {
        format!(
            "rid={}&type=42&add_media_ids={}&del_media_ids=&platform=web",
            encode(rid),
            encode(add_media_ids)
        )
    }
}

impl Default for AddFavoriteCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for AddFavoriteCommand {
    fn command_type(&self) -> CommandType {
        CommandType::AddFav
    }

    fn help_text(&self) -> &'static str {
        "/add_fav - 添加收藏"
    }

    async fn execute(
        &self,
        channel: &mut ClientChannel,
        _envelope: &Message,
        _conversation_id: &str,
    ) -> Result<(), CommandError> {
        // Parameters are requested one at a time; a coercion failure aborts
        // before any fetch is issued.
        let rid = collect_param(channel, &self.params[0]).await?;
        let add_media_ids = collect_param(channel, &self.params[1]).await?;

        let body = Self::form_body(&rid.to_form_value(), &add_media_ids.to_form_value());
        debug!(body = %body, "issuing favorites fetch");

        let request = FetchRequest::post_form(FAVORITES_ENDPOINT, body);
        send_fetch_request(channel, &request).await?;
        let response = await_fetch_response(channel).await?;

        channel.send_response("收藏添加完成", response.data).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_body_keeps_documented_field_order() {
        let body = AddFavoriteCommand::form_body("12345", "67890");
        assert_eq!(
            body,
            "rid=12345&type=42&add_media_ids=67890&del_media_ids=&platform=web"
        );
    }

    #[test]
    fn collected_fields_are_url_encoded() {
        let body = AddFavoriteCommand::form_body("a b", "1,2");
        assert_eq!(
            body,
            "rid=a%20b&type=42&add_media_ids=1%2C2&del_media_ids=&platform=web"
        );
    }
}
