//! Built-in command handlers
//!
//! Each built-in is a small [`Command`] implementation that replies through
//! the injected client handle. The factory table at the bottom is what lets
//! the registry resolve a built-in by identifier (`registry.add("ping")`).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::errors::{BotError, CommandError};
use crate::application::messaging::registry::CommandFactory;
use crate::domain::entities::{Command, Update};
use crate::domain::traits::ClientHandle;

async fn reply(
    client: &dyn ClientHandle,
    update: &Update,
    text: &str,
) -> Result<String, CommandError> {
    client
        .send_message(&update.chat_id, text)
        .await
        .map_err(|e: BotError| CommandError::Client(e.to_string()))?;
    Ok(text.to_string())
}

/// Welcome message for new chats
pub struct StartCommand;

#[async_trait]
impl Command for StartCommand {
    fn name(&self) -> &str {
        "start"
    }

    fn description(&self) -> &str {
        "Start the bot"
    }

    async fn handle(
        &self,
        client: &dyn ClientHandle,
        update: &Update,
        _args: &str,
    ) -> Result<String, CommandError> {
        let info = client.bot_info();
        let text = format!(
            "Hello! I'm {}. Send /help to see what I can do.",
            info.name
        );
        reply(client, update, &text).await
    }
}

/// Lists the built-in commands. Also the documented fallback target for
/// unknown commands when configured as such.
pub struct HelpCommand;

#[async_trait]
impl Command for HelpCommand {
    fn name(&self) -> &str {
        "help"
    }

    fn description(&self) -> &str {
        "Show help message"
    }

    async fn handle(
        &self,
        client: &dyn ClientHandle,
        update: &Update,
        _args: &str,
    ) -> Result<String, CommandError> {
        let text = "Available commands:\n\
                    /start - Start the bot\n\
                    /help - Show this message\n\
                    /ping - Check the bot is alive\n\
                    /version - Show bot version\n\
                    /echo <text> - Repeat text back\n\
                    /whoami - Show who you are";
        reply(client, update, text).await
    }
}

/// Liveness check
pub struct PingCommand;

#[async_trait]
impl Command for PingCommand {
    fn name(&self) -> &str {
        "ping"
    }

    fn description(&self) -> &str {
        "Check the bot is alive"
    }

    async fn handle(
        &self,
        client: &dyn ClientHandle,
        update: &Update,
        _args: &str,
    ) -> Result<String, CommandError> {
        reply(client, update, "pong").await
    }
}

pub struct VersionCommand;

#[async_trait]
impl Command for VersionCommand {
    fn name(&self) -> &str {
        "version"
    }

    fn description(&self) -> &str {
        "Show bot version"
    }

    async fn handle(
        &self,
        client: &dyn ClientHandle,
        update: &Update,
        _args: &str,
    ) -> Result<String, CommandError> {
        let text = format!("relay-bot v{}", env!("CARGO_PKG_VERSION"));
        reply(client, update, &text).await
    }
}

/// Repeats its argument string verbatim. Errors on empty args, which is the
/// one built-in that exercises handler-error propagation end to end.
pub struct EchoCommand;

#[async_trait]
impl Command for EchoCommand {
    fn name(&self) -> &str {
        "echo"
    }

    fn aliases(&self) -> Vec<String> {
        vec!["say".to_string()]
    }

    fn description(&self) -> &str {
        "Repeat text back"
    }

    async fn handle(
        &self,
        client: &dyn ClientHandle,
        update: &Update,
        args: &str,
    ) -> Result<String, CommandError> {
        if args.is_empty() {
            return Err(CommandError::InvalidArgs(
                "Usage: /echo <text>".to_string(),
            ));
        }
        reply(client, update, args).await
    }
}

/// Tells the sender who the platform says they are
pub struct WhoamiCommand;

#[async_trait]
impl Command for WhoamiCommand {
    fn name(&self) -> &str {
        "whoami"
    }

    fn description(&self) -> &str {
        "Show who you are"
    }

    async fn handle(
        &self,
        client: &dyn ClientHandle,
        update: &Update,
        _args: &str,
    ) -> Result<String, CommandError> {
        let text = match &update.sender {
            Some(user) => format!("You are {} (id {})", user.display_name(), user.id),
            None => "I don't know who you are on this platform.".to_string(),
        };
        reply(client, update, &text).await
    }
}

/// Identifier -> constructor table for the built-ins
pub fn builtin_factories() -> HashMap<&'static str, CommandFactory> {
    let mut factories: HashMap<&'static str, CommandFactory> = HashMap::new();
    factories.insert("start", || Arc::new(StartCommand) as Arc<dyn Command>);
    factories.insert("help", || Arc::new(HelpCommand) as Arc<dyn Command>);
    factories.insert("ping", || Arc::new(PingCommand) as Arc<dyn Command>);
    factories.insert("version", || Arc::new(VersionCommand) as Arc<dyn Command>);
    factories.insert("echo", || Arc::new(EchoCommand) as Arc<dyn Command>);
    factories.insert("whoami", || Arc::new(WhoamiCommand) as Arc<dyn Command>);
    factories
}

/// Names of all built-ins, in the order they appear in /help
pub fn builtin_names() -> Vec<&'static str> {
    vec!["start", "help", "ping", "version", "echo", "whoami"]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::traits::BotInfo;

    struct NullClient;

    #[async_trait]
    impl ClientHandle for NullClient {
        async fn send_message(&self, _chat_id: &str, _text: &str) -> Result<String, BotError> {
            Ok("0".to_string())
        }

        fn bot_info(&self) -> BotInfo {
            BotInfo {
                id: "0".to_string(),
                name: "relay-bot".to_string(),
                username: "relay_bot".to_string(),
            }
        }
    }

    #[tokio::test]
    async fn ping_replies_pong() {
        let update = Update::new("chat1", "/ping");
        let result = PingCommand.handle(&NullClient, &update, "").await.unwrap();
        assert_eq!(result, "pong");
    }

    #[tokio::test]
    async fn echo_requires_args() {
        let update = Update::new("chat1", "/echo");
        let err = EchoCommand.handle(&NullClient, &update, "").await.unwrap_err();
        assert!(matches!(err, CommandError::InvalidArgs(_)));
    }

    #[tokio::test]
    async fn echo_returns_args_verbatim() {
        let update = Update::new("chat1", "/echo one  two");
        let result = EchoCommand
            .handle(&NullClient, &update, "one  two")
            .await
            .unwrap();
        assert_eq!(result, "one  two");
    }

    #[tokio::test]
    async fn whoami_reports_sender() {
        use crate::domain::entities::User;

        let update = Update::new("chat1", "/whoami")
            .with_sender(User::new("42").with_username("alice"));
        let result = WhoamiCommand.handle(&NullClient, &update, "").await.unwrap();
        assert_eq!(result, "You are alice (id 42)");
    }

    #[test]
    fn factory_table_covers_all_builtins() {
        let factories = builtin_factories();
        for name in builtin_names() {
            let command = factories[name]();
            assert_eq!(command.name(), name);
        }
    }
}
