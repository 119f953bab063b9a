//! Command definition registry.

use crate::RegistryError;
use serde_json::Value;
use swb_types::ModuleId;
use tracing::warn;

/// A command definition owned by a module.
#[derive(Debug, Clone)]
pub struct RegisteredCommand {
    /// Command name, unique across the whole aggregate.
    pub name: String,
    /// Opaque structured definition, deployed to the platform as-is.
    pub definition: Value,
    /// Module that registered this command.
    pub owner: ModuleId,
}

/// Registry of raw command definitions across all loaded modules.
///
/// Duplicate policy is **reject-on-conflict**: the first registration
/// of a name wins and later registrations (same or different module)
/// are rejected and logged. This keeps the deployed command set
/// unambiguous. Execution routes use the opposite policy; see
/// [`RouteTable`](crate::RouteTable).
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<RegisteredCommand>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command definition for a module.
    ///
    /// The name is read from the definition's `name` field.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::MissingName`] when the definition carries no
    ///   string `name` field.
    /// - [`RegistryError::DuplicateName`] when the name is already
    ///   registered. Both cases are logged at WARN and leave the
    ///   registry unchanged; neither is fatal.
    pub fn register(&mut self, owner: ModuleId, definition: Value) -> Result<(), RegistryError> {
        let Some(name) = definition.get("name").and_then(Value::as_str) else {
            warn!(module = %owner, "command definition has no name, dropping");
            return Err(RegistryError::MissingName);
        };

        if let Some(existing) = self.commands.iter().find(|c| c.name == name) {
            warn!(
                name,
                module = %owner,
                first_owner = %existing.owner,
                "duplicate command name, keeping first registration"
            );
            return Err(RegistryError::DuplicateName {
                name: name.to_string(),
            });
        }

        self.commands.push(RegisteredCommand {
            name: name.to_string(),
            definition,
            owner,
        });
        Ok(())
    }

    /// Returns `true` if a command with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.commands.iter().any(|c| c.name == name)
    }

    /// Returns the flattened aggregate, insertion order preserved.
    #[must_use]
    pub fn aggregate(&self) -> &[RegisteredCommand] {
        &self.commands
    }

    /// Returns cloned definitions in insertion order, ready to deploy.
    #[must_use]
    pub fn definitions(&self) -> Vec<Value> {
        self.commands.iter().map(|c| c.definition.clone()).collect()
    }

    /// Removes the command with the given name.
    ///
    /// Returns `true` if a command was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.commands.len();
        self.commands.retain(|c| c.name != name);
        before != self.commands.len()
    }

    /// Removes every command owned by the given module.
    ///
    /// Returns the number of commands removed.
    pub fn remove_module(&mut self, owner: &ModuleId) -> usize {
        let before = self.commands.len();
        self.commands.retain(|c| &c.owner != owner);
        before - self.commands.len()
    }

    /// Returns the number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if no commands are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_and_aggregate_in_order() {
        let mut reg = CommandRegistry::new();
        reg.register("a".into(), json!({"name": "ping"})).unwrap();
        reg.register("a".into(), json!({"name": "pong"})).unwrap();
        reg.register("b".into(), json!({"name": "buy"})).unwrap();

        let names: Vec<_> = reg.aggregate().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["ping", "pong", "buy"]);
    }

    #[test]
    fn first_registration_wins() {
        let mut reg = CommandRegistry::new();
        reg.register("a".into(), json!({"name": "ping", "v": 1}))
            .unwrap();

        let err = reg
            .register("b".into(), json!({"name": "ping", "v": 2}))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName { .. }));

        assert_eq!(reg.len(), 1);
        assert_eq!(reg.aggregate()[0].owner, ModuleId::new("a"));
        assert_eq!(reg.aggregate()[0].definition["v"], 1);
    }

    #[test]
    fn missing_name_rejected() {
        let mut reg = CommandRegistry::new();
        let err = reg.register("a".into(), json!({"description": "?"}));
        assert!(matches!(err, Err(RegistryError::MissingName)));
        assert!(reg.is_empty());
    }

    #[test]
    fn remove_by_name_frees_the_name() {
        let mut reg = CommandRegistry::new();
        reg.register("a".into(), json!({"name": "ping"})).unwrap();

        assert!(reg.remove("ping"));
        assert!(!reg.remove("ping"));
        reg.register("b".into(), json!({"name": "ping"})).unwrap();
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn remove_module_frees_names() {
        let mut reg = CommandRegistry::new();
        reg.register("a".into(), json!({"name": "ping"})).unwrap();
        reg.register("b".into(), json!({"name": "buy"})).unwrap();

        assert_eq!(reg.remove_module(&ModuleId::new("a")), 1);
        assert!(!reg.contains("ping"));
        assert!(reg.contains("buy"));

        // A fresh instance of the module can re-register without collision.
        reg.register("a".into(), json!({"name": "ping"})).unwrap();
        assert_eq!(reg.len(), 2);
    }
}
