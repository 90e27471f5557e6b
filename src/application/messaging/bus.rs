//! Command bus - composes parser and registry into the dispatch pipeline

use std::sync::Arc;

use crate::application::errors::{BotError, CommandError, ParseError, RegistrationError};
use crate::domain::entities::{Command, CommandSource, Update};
use crate::domain::traits::ClientHandle;

use super::parser::{parse_command, ParsedCommand};
use super::registry::CommandRegistry;

/// End-to-end pipeline for one inbound event: parse the text, resolve the
/// command against the registry, invoke it, hand the update back.
///
/// The bus is stateless across calls apart from the registry's contents.
/// Registration is expected to happen at startup, before traffic; the bus
/// takes `&mut self` for administrative calls and `&self` for dispatch, so
/// live mutation under shared access does not compile without an external
/// lock.
pub struct CommandBus {
    registry: CommandRegistry,
    fallback: Option<String>,
}

impl CommandBus {
    pub fn new() -> Self {
        Self {
            registry: CommandRegistry::new(),
            fallback: None,
        }
    }

    /// Name of the command to invoke when a parsed command is not in the
    /// registry. Without one, unknown commands are a silent no-op.
    pub fn with_fallback(mut self, name: impl Into<String>) -> Self {
        self.fallback = Some(name.into());
        self
    }

    // Administrative surface: thin pass-throughs to the registry.

    pub fn add_command(&mut self, source: impl Into<CommandSource>) -> Result<(), RegistrationError> {
        self.registry.add(source)
    }

    pub fn add_commands<I, S>(&mut self, sources: I) -> Result<(), RegistrationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<CommandSource>,
    {
        self.registry.add_many(sources)
    }

    pub fn remove_command(&mut self, name: &str) {
        self.registry.remove(name);
    }

    pub fn remove_commands<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.registry.remove_many(names);
    }

    /// Snapshot of current registrations in insertion order
    pub fn commands(&self) -> Vec<(String, Arc<dyn Command>)> {
        self.registry.list()
    }

    /// Recognize a command token in raw text
    pub fn parse_command(&self, text: &str) -> Result<Option<ParsedCommand>, ParseError> {
        parse_command(text)
    }

    /// Resolve `name` and invoke the handler with `(client, update, args)`.
    ///
    /// Lookup is case-sensitive on the literal token. An unknown name is an
    /// expected runtime occurrence, not an error: the configured fallback
    /// runs if it is registered, otherwise the result is `Ok(None)`. Handler
    /// failures propagate unchanged.
    pub async fn execute(
        &self,
        name: &str,
        args: &str,
        update: &Update,
        client: &dyn ClientHandle,
    ) -> Result<Option<String>, CommandError> {
        let command = match self.registry.get(name) {
            Some(command) => command,
            None => {
                let fallback = self.fallback.as_deref().and_then(|f| self.registry.get(f));
                match fallback {
                    Some(command) => {
                        tracing::debug!("Unknown command /{}, running fallback /{}", name, command.name());
                        command
                    }
                    None => {
                        tracing::debug!("Unknown command /{}, ignoring", name);
                        return Ok(None);
                    }
                }
            }
        };

        command.handle(client, update, args).await.map(Some)
    }

    /// Top-level entry point, called once per inbound event.
    ///
    /// No match returns the update unchanged. On a match the command runs to
    /// completion first; its side effects flow through the client handle, and
    /// its result value is not carried by the returned update.
    pub async fn handle(
        &self,
        text: &str,
        update: Update,
        client: &dyn ClientHandle,
    ) -> Result<Update, BotError> {
        let Some(parsed) = parse_command(text)? else {
            return Ok(update);
        };

        if !parsed.target_bot.is_empty() {
            tracing::trace!("Command /{} addressed to @{}", parsed.name, parsed.target_bot);
        }

        let result = self
            .execute(&parsed.name, &parsed.args, &update, client)
            .await?;
        if let Some(result) = result {
            tracing::debug!("Command /{} handled: {}", parsed.name, result);
        }

        Ok(update)
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}
