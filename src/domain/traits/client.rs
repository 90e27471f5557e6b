use async_trait::async_trait;

use crate::application::errors::BotError;

/// ClientHandle trait - abstraction for the chat platform a command replies
/// through. Passed opaquely into every command invocation; the bus itself
/// never calls it.
#[async_trait]
pub trait ClientHandle: Send + Sync {
    /// Send a message to a chat, returning the platform message id
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<String, BotError>;

    /// Send a chat action (typing, upload_photo, ...). Platforms without the
    /// concept ignore it.
    async fn send_chat_action(&self, _chat_id: &str, _action: &str) -> Result<(), BotError> {
        Ok(())
    }

    /// Identity of the bot this handle acts as
    fn bot_info(&self) -> BotInfo;
}

/// Bot identity on the platform
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
    pub username: String,
}
