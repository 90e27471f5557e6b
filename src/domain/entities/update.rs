use super::User;
use chrono::{DateTime, Utc};

/// One inbound conversational event, as handed over by an adapter.
///
/// The bus treats this as an immutable snapshot: it reads the message text,
/// passes the value through to command handlers, and returns it unchanged to
/// the caller. Platform-level fields are never mutated during dispatch.
#[derive(Debug, Clone)]
pub struct Update {
    pub id: String,
    pub chat_id: String,
    pub message_id: String,
    pub sender: Option<User>,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub platform: String,
    pub raw: Option<serde_json::Value>,
}

impl Update {
    pub fn new(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            chat_id: chat_id.into(),
            message_id: String::new(),
            sender: None,
            text: text.into(),
            timestamp: Utc::now(),
            platform: "unknown".to_string(),
            raw: None,
        }
    }

    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = message_id.into();
        self
    }

    pub fn with_sender(mut self, user: User) -> Self {
        self.sender = Some(user);
        self
    }

    pub fn with_sender_opt(mut self, user: Option<User>) -> Self {
        if let Some(u) = user {
            self.sender = Some(u);
        }
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Message text of the event
    pub fn text(&self) -> &str {
        &self.text
    }
}
