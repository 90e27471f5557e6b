//! Console adapter for development/testing

use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::traits::{BotInfo, ClientHandle};

/// Console client handle for local development. Replies go to stdout.
pub struct ConsoleAdapter {
    info: BotInfo,
}

impl ConsoleAdapter {
    pub fn new(name: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            info: BotInfo {
                id: "console".to_string(),
                name: name.into(),
                username: username.into(),
            },
        }
    }

    pub async fn read_line(&self, prompt: &str) -> Option<String> {
        use std::io::Write;
        print!("{}", prompt);
        std::io::stdout().flush().ok()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input).ok()?;
        if input.is_empty() {
            // EOF
            return None;
        }
        Some(input.trim_end_matches(['\r', '\n']).to_string())
    }
}

#[async_trait]
impl ClientHandle for ConsoleAdapter {
    async fn send_message(&self, _chat_id: &str, text: &str) -> Result<String, BotError> {
        println!("[BOT] {}", text);
        Ok("console_msg".to_string())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
