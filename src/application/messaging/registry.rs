//! Command registry - the mutable name -> Command store

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::commands;
use crate::application::errors::RegistrationError;
use crate::domain::entities::{Command, CommandSource};

/// Constructor for a built-in command, resolved by identifier
pub type CommandFactory = fn() -> Arc<dyn Command>;

/// Mutable mapping from command name to a live handler instance.
///
/// A command is reachable under exactly the names and aliases it was
/// registered with; aliases are separate entries sharing one `Arc`, so
/// removing a name removes only that key. Listing enumerates entries in
/// insertion order. Lookup is case-sensitive on the literal token.
pub struct CommandRegistry {
    commands: HashMap<String, Arc<dyn Command>>,
    order: Vec<String>,
    factories: HashMap<&'static str, CommandFactory>,
}

impl CommandRegistry {
    /// New registry, empty of commands, with the built-in factory table
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
            order: Vec::new(),
            factories: commands::builtin_factories(),
        }
    }

    /// Register one command. Last registration wins on a duplicate name.
    pub fn add(&mut self, source: impl Into<CommandSource>) -> Result<(), RegistrationError> {
        let command = self.resolve(source.into())?;
        self.insert(command);
        Ok(())
    }

    /// Register a batch, all-or-nothing: every source is resolved and
    /// validated before any is inserted, so a failure leaves the registry
    /// unchanged.
    pub fn add_many<I, S>(&mut self, sources: I) -> Result<(), RegistrationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<CommandSource>,
    {
        let resolved = sources
            .into_iter()
            .map(|s| self.resolve(s.into()))
            .collect::<Result<Vec<_>, _>>()?;

        for command in resolved {
            self.insert(command);
        }
        Ok(())
    }

    /// Remove one name. Removing an absent name is a no-op.
    pub fn remove(&mut self, name: &str) {
        if self.commands.remove(name).is_some() {
            self.order.retain(|n| n != name);
        }
    }

    pub fn remove_many<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.remove(name.as_ref());
        }
    }

    /// Look up a command by literal name or alias
    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Snapshot of current registrations in insertion order. The returned
    /// value is detached from the registry.
    pub fn list(&self) -> Vec<(String, Arc<dyn Command>)> {
        self.order
            .iter()
            .map(|name| (name.clone(), Arc::clone(&self.commands[name])))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn resolve(&self, source: CommandSource) -> Result<Arc<dyn Command>, RegistrationError> {
        let command = match source {
            CommandSource::Instance(command) => command,
            CommandSource::Builtin(name) => {
                let factory = self
                    .factories
                    .get(name.as_str())
                    .ok_or_else(|| RegistrationError::Unresolved(name.clone()))?;
                factory()
            }
        };

        if !valid_token(command.name()) {
            return Err(RegistrationError::InvalidName(command.name().to_string()));
        }
        for alias in command.aliases() {
            if !valid_token(&alias) {
                return Err(RegistrationError::InvalidName(alias));
            }
        }
        Ok(command)
    }

    fn insert(&mut self, command: Arc<dyn Command>) {
        let mut keys = vec![command.name().to_string()];
        keys.extend(command.aliases());

        for key in keys {
            if !self.commands.contains_key(&key) {
                self.order.push(key.clone());
            }
            self.commands.insert(key, Arc::clone(&command));
        }
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Command tokens are `[A-Za-z0-9_]+`, no leading slash
fn valid_token(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::FuncCommand;

    fn stub(name: &str) -> Arc<FuncCommand> {
        let reply = format!("{} handled", name);
        Arc::new(FuncCommand::new(name, move |_, _, _| Ok(reply.clone())))
    }

    #[test]
    fn add_then_get() {
        let mut registry = CommandRegistry::new();
        registry.add(stub("mycommand")).unwrap();
        assert!(registry.contains("mycommand"));
        assert_eq!(registry.get("mycommand").unwrap().name(), "mycommand");
    }

    #[test]
    fn duplicate_name_last_registration_wins() {
        let mut registry = CommandRegistry::new();
        registry.add(stub("dup")).unwrap();
        let second = Arc::new(
            FuncCommand::new("dup", |_, _, _| Ok("second".to_string()))
                .with_description("replacement"),
        );
        registry.add(second).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("dup").unwrap().description(), "replacement");
    }

    #[test]
    fn aliases_are_independent_entries() {
        let mut registry = CommandRegistry::new();
        let cmd = Arc::new(
            FuncCommand::new("echo", |_, _, args| Ok(args.to_string()))
                .with_aliases(vec!["say".to_string()]),
        );
        registry.add(cmd).unwrap();

        assert!(registry.contains("echo"));
        assert!(registry.contains("say"));

        registry.remove("say");
        assert!(!registry.contains("say"));
        assert!(registry.contains("echo"));
    }

    #[test]
    fn invalid_name_is_a_registration_error() {
        let mut registry = CommandRegistry::new();
        let err = registry.add(stub("")).unwrap_err();
        assert_eq!(err, RegistrationError::InvalidName(String::new()));

        let err = registry.add(stub("/slashy")).unwrap_err();
        assert_eq!(err, RegistrationError::InvalidName("/slashy".to_string()));

        let err = registry.add(stub("has space")).unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidName(_)));
    }

    #[test]
    fn builtin_identifier_resolves() {
        let mut registry = CommandRegistry::new();
        registry.add("ping").unwrap();
        assert!(registry.contains("ping"));
    }

    #[test]
    fn unknown_identifier_is_a_registration_error() {
        let mut registry = CommandRegistry::new();
        let err = registry.add("nosuch").unwrap_err();
        assert_eq!(err, RegistrationError::Unresolved("nosuch".to_string()));
    }

    #[test]
    fn add_many_is_all_or_nothing() {
        let mut registry = CommandRegistry::new();
        let err = registry
            .add_many(vec!["ping", "nosuch", "help"])
            .unwrap_err();
        assert_eq!(err, RegistrationError::Unresolved("nosuch".to_string()));
        assert!(registry.is_empty());
    }

    #[test]
    fn add_many_then_remove_many_leaves_empty() {
        let mut registry = CommandRegistry::new();
        registry
            .add_many(vec![
                CommandSource::from(stub("a")),
                CommandSource::from(stub("b")),
            ])
            .unwrap();
        assert_eq!(registry.len(), 2);

        registry.remove_many(["a", "b"]);
        assert!(registry.is_empty());
        assert!(!registry.contains("a"));
        assert!(!registry.contains("b"));
    }

    #[test]
    fn remove_absent_name_is_a_noop() {
        let mut registry = CommandRegistry::new();
        registry.remove("never_added");
        assert!(registry.is_empty());

        // twice in a row: same empty state both times
        registry.remove("never_added");
        assert!(registry.is_empty());
    }

    #[test]
    fn list_enumerates_in_insertion_order() {
        let mut registry = CommandRegistry::new();
        registry.add(stub("c")).unwrap();
        registry.add(stub("a")).unwrap();
        registry.add(stub("b")).unwrap();

        let names: Vec<String> = registry.list().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn list_is_a_detached_snapshot() {
        let mut registry = CommandRegistry::new();
        registry.add(stub("keep")).unwrap();

        let mut snapshot = registry.list();
        snapshot.clear();

        assert_eq!(registry.len(), 1);
        assert!(registry.contains("keep"));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let mut registry = CommandRegistry::new();
        registry.add(stub("Mixed")).unwrap();
        assert!(registry.contains("Mixed"));
        assert!(!registry.contains("mixed"));
    }
}
