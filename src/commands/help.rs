// ABOUTME: Help command returning the static list of available commands
// ABOUTME: No side effects, no context requirements
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{CommandError, CommandHandler};
use crate::connection::ClientChannel;
use crate::models::{CommandType, Message};
use async_trait::async_trait;

const HELP_TEXT: &str = "可用命令：
/help - 显示此帮助信息
/clear - 清除聊天记录
/rename <新名字> - 修改用户名
/status - 显示系统状态
/history <数量> - 显示历史消息
/fetch - 请求客户端抓取示例页面
/add_fav - 添加收藏";

pub struct HelpCommand;

#[async_trait]
impl CommandHandler for HelpCommand {
    fn command_type(&self) -> CommandType {
        CommandType::Help
    }

    fn help_text(&self) -> &'static str {
        "/help - 显示此帮助信息"
    }

    async fn execute(
        &self,
        channel: &mut ClientChannel,
        _envelope: &Message,
        _conversation_id: &str,
    ) -> Result<(), CommandError> {
        channel.send_response(HELP_TEXT, None).await?;
        Ok(())
    }
}
