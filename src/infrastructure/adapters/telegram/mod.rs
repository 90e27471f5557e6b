//! Telegram adapter
//!
//! Thin collaborator layer: long-polls `getUpdates`, converts platform
//! messages into domain [`Update`]s for the bus, and implements
//! [`ClientHandle`] over the send methods. The bus itself never touches
//! this module.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::errors::BotError;
use crate::domain::entities;
use crate::domain::traits::{BotInfo, ClientHandle};

/// Telegram API base URL
const API_BASE: &str = "https://api.telegram.org";

/// Telegram update type
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    pub is_bot: Option<bool>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
}

impl Message {
    /// Convert a platform message into the domain snapshot the bus consumes
    pub fn to_domain(&self) -> entities::Update {
        let sender = self.from.as_ref().map(|u| {
            let mut user = entities::User::new(u.id.to_string());
            if let Some(ref username) = u.username {
                user = user.with_username(username.clone());
            }
            if let Some(ref first) = u.first_name {
                user = user.with_first_name(first.clone());
            }
            if let Some(ref last) = u.last_name {
                user = user.with_last_name(last.clone());
            }
            if u.is_bot.unwrap_or(false) {
                user = user.as_bot();
            }
            user
        });

        entities::Update::new(self.chat.id.to_string(), self.text.clone().unwrap_or_default())
            .with_message_id(self.message_id.to_string())
            .with_sender_opt(sender)
            .with_platform("telegram")
            .with_raw(serde_json::to_value(self).unwrap_or_default())
    }
}

/// Telegram bot adapter
pub struct TelegramAdapter {
    token: String,
    client: Client,
    info: BotInfo,
}

impl TelegramAdapter {
    pub fn new(token: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            client: Client::new(),
            info: BotInfo {
                id: "unknown".to_string(),
                name: name.into(),
                username: String::new(),
            },
        }
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", API_BASE, self.token, method)
    }

    /// Fetch bot info from Telegram API
    pub async fn fetch_bot_info(&mut self) -> Result<(), BotError> {
        #[derive(Deserialize)]
        struct Response {
            result: BotInfoResponse,
        }

        #[derive(Deserialize)]
        struct BotInfoResponse {
            id: i64,
            first_name: String,
            username: String,
        }

        let url = self.api_url("getMe");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        let data: Response = response
            .json()
            .await
            .map_err(|e| BotError::Internal(format!("Bad getMe response: {}", e)))?;

        self.info = BotInfo {
            id: data.result.id.to_string(),
            name: data.result.first_name,
            username: data.result.username,
        };

        Ok(())
    }

    /// Get updates from Telegram using the getUpdates long-poll API
    pub async fn get_updates(&self, offset: i64, timeout: i64) -> Result<Vec<Update>, BotError> {
        #[derive(Serialize)]
        struct GetUpdatesRequest {
            offset: i64,
            timeout: i64,
            allowed_updates: Vec<String>,
        }

        #[derive(Deserialize)]
        struct Response {
            result: Vec<Update>,
        }

        let url = self.api_url("getUpdates");
        let request = GetUpdatesRequest {
            offset,
            timeout,
            allowed_updates: vec!["message".to_string()],
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!(
                "Telegram API error: {}",
                response.status()
            )));
        }

        let data: Response = response
            .json()
            .await
            .map_err(|e| BotError::Internal(format!("Bad getUpdates response: {}", e)))?;

        Ok(data.result)
    }

    /// Get the next update offset
    pub fn next_offset(updates: &[Update]) -> i64 {
        updates.iter().map(|u| u.update_id + 1).max().unwrap_or(0)
    }

    /// Send a message via the Telegram API
    async fn send_message_api(&self, chat_id: &str, text: &str) -> Result<String, BotError> {
        #[derive(Serialize)]
        struct SendMessageRequest {
            chat_id: String,
            text: String,
        }

        #[derive(Deserialize)]
        struct Response {
            result: MessageResult,
        }

        #[derive(Deserialize)]
        struct MessageResult {
            message_id: i64,
        }

        let url = self.api_url("sendMessage");
        let request = SendMessageRequest {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!(
                "Telegram API error: {}",
                response.status()
            )));
        }

        let data: Response = response
            .json()
            .await
            .map_err(|e| BotError::Internal(format!("Bad sendMessage response: {}", e)))?;

        Ok(data.result.message_id.to_string())
    }

    /// Register the bot's command list with Telegram (shown in the client UI)
    pub async fn register_commands(&self, commands: &[(String, String)]) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct Command {
            command: String,
            description: String,
        }

        #[derive(Serialize)]
        struct SetMyCommandsRequest {
            commands: Vec<Command>,
        }

        let commands: Vec<Command> = commands
            .iter()
            .map(|(name, description)| Command {
                command: name.clone(),
                description: description.clone(),
            })
            .collect();

        let url = self.api_url("setMyCommands");
        let request = SetMyCommandsRequest { commands };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(BotError::Network(format!(
                "Failed to register commands: {}",
                error
            )));
        }

        tracing::info!("Registered {} commands with Telegram", request.commands.len());
        Ok(())
    }
}

#[async_trait]
impl ClientHandle for TelegramAdapter {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<String, BotError> {
        tracing::debug!("Sending to {}: {}", chat_id, text);

        let _ = self.send_chat_action(chat_id, "typing").await;
        self.send_message_api(chat_id, text).await
    }

    async fn send_chat_action(&self, chat_id: &str, action: &str) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct SendChatActionRequest {
            chat_id: String,
            action: String,
        }

        let url = self.api_url("sendChatAction");
        let request = SendChatActionRequest {
            chat_id: chat_id.to_string(),
            action: action.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!(
                "Chat action error: {}",
                response.status()
            )));
        }

        Ok(())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_converts_to_domain_update() {
        let message = Message {
            message_id: 7,
            from: Some(User {
                id: 42,
                is_bot: Some(false),
                username: Some("alice".to_string()),
                first_name: Some("Alice".to_string()),
                last_name: None,
            }),
            chat: Chat { id: -100 },
            text: Some("/ping".to_string()),
        };

        let update = message.to_domain();
        assert_eq!(update.chat_id, "-100");
        assert_eq!(update.message_id, "7");
        assert_eq!(update.text, "/ping");
        assert_eq!(update.platform, "telegram");
        assert_eq!(update.sender.as_ref().unwrap().id, "42");
        assert!(update.raw.is_some());
    }

    #[test]
    fn next_offset_is_one_past_the_highest_id() {
        let updates = vec![
            Update { update_id: 3, message: None },
            Update { update_id: 9, message: None },
            Update { update_id: 5, message: None },
        ];
        assert_eq!(TelegramAdapter::next_offset(&updates), 10);
        assert_eq!(TelegramAdapter::next_offset(&[]), 0);
    }
}
