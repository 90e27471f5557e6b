use std::sync::Arc;

use async_trait::async_trait;

use super::Update;
use crate::application::errors::CommandError;
use crate::domain::traits::ClientHandle;

/// A named unit of behavior the bus can dispatch to.
///
/// Implementations are constructed once at registration time and held behind
/// `Arc` by the registry until removed. Handlers reply through the injected
/// client handle; the returned string is the handler's result value for the
/// caller of `execute`, not a message sent anywhere by the bus.
#[async_trait]
pub trait Command: Send + Sync {
    /// Unique command token, without the leading slash
    fn name(&self) -> &str;

    /// Extra lookup names, same token rules as `name`
    fn aliases(&self) -> Vec<String> {
        Vec::new()
    }

    /// One-line description shown in help output
    fn description(&self) -> &str {
        ""
    }

    async fn handle(
        &self,
        client: &dyn ClientHandle,
        update: &Update,
        args: &str,
    ) -> Result<String, CommandError>;
}

/// What a caller hands to the registry: a live instance, or the identifier
/// of a built-in command resolved through the factory table.
pub enum CommandSource {
    Instance(Arc<dyn Command>),
    Builtin(String),
}

impl From<Arc<dyn Command>> for CommandSource {
    fn from(command: Arc<dyn Command>) -> Self {
        CommandSource::Instance(command)
    }
}

impl<C: Command + 'static> From<Arc<C>> for CommandSource {
    fn from(command: Arc<C>) -> Self {
        CommandSource::Instance(command)
    }
}

impl From<&str> for CommandSource {
    fn from(name: &str) -> Self {
        CommandSource::Builtin(name.to_string())
    }
}

impl From<String> for CommandSource {
    fn from(name: String) -> Self {
        CommandSource::Builtin(name)
    }
}

/// Closure-backed command handler type
pub type HandlerFn =
    Box<dyn Fn(&dyn ClientHandle, &Update, &str) -> Result<String, CommandError> + Send + Sync>;

/// A command built from a closure, for ad-hoc registration
pub struct FuncCommand {
    name: String,
    description: String,
    aliases: Vec<String>,
    handler: HandlerFn,
}

impl FuncCommand {
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&dyn ClientHandle, &Update, &str) -> Result<String, CommandError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            description: String::new(),
            aliases: Vec::new(),
            handler: Box::new(handler),
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }
}

#[async_trait]
impl Command for FuncCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn aliases(&self) -> Vec<String> {
        self.aliases.clone()
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn handle(
        &self,
        client: &dyn ClientHandle,
        update: &Update,
        args: &str,
    ) -> Result<String, CommandError> {
        (self.handler)(client, update, args)
    }
}
