//! Mock platform API for deployment tests.

use crate::{CommandsApi, DeployError, DeployTarget, RemoteCommand};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory stand-in for the platform's command API.
///
/// Tracks call counts per operation, keeps a per-target remote command
/// set that the calls mutate, and can be told to fail creates for
/// specific command names.
#[derive(Debug, Default)]
pub struct MockCommandsApi {
    remote: Mutex<HashMap<DeployTarget, Vec<RemoteCommand>>>,
    fail_create: Mutex<HashSet<String>>,
    fetches: AtomicUsize,
    replace_alls: AtomicUsize,
    creates: AtomicUsize,
    updates: AtomicUsize,
    deletes: AtomicUsize,
}

impl MockCommandsApi {
    /// Creates a mock with no remote commands.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates a remote command, as if a previous run deployed it.
    pub fn seed_remote(&self, target: DeployTarget, name: &str, definition: Value) {
        let mut remote = self.remote.lock().unwrap_or_else(|e| e.into_inner());
        remote.entry(target).or_default().push(RemoteCommand {
            id: format!("id-{name}"),
            name: name.to_owned(),
            definition,
        });
    }

    /// Makes `create` fail for the given command name.
    pub fn fail_create_for(&self, name: &str) {
        self.fail_create
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_owned());
    }

    /// Returns the remote command set for a target.
    #[must_use]
    pub fn remote(&self, target: DeployTarget) -> Vec<RemoteCommand> {
        self.remote
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&target)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of `fetch` calls made.
    #[must_use]
    pub fn fetch_calls(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of `replace_all` calls made.
    #[must_use]
    pub fn replace_all_calls(&self) -> usize {
        self.replace_alls.load(Ordering::SeqCst)
    }

    /// Number of `create` calls made.
    #[must_use]
    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    /// Number of `update` calls made.
    #[must_use]
    pub fn update_calls(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    /// Number of `delete` calls made.
    #[must_use]
    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    fn name_of(definition: &Value) -> String {
        definition
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned()
    }
}

#[async_trait]
impl CommandsApi for MockCommandsApi {
    async fn fetch(&self, target: DeployTarget) -> Result<Vec<RemoteCommand>, DeployError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.remote(target))
    }

    async fn replace_all(
        &self,
        target: DeployTarget,
        definitions: &[Value],
    ) -> Result<(), DeployError> {
        self.replace_alls.fetch_add(1, Ordering::SeqCst);
        let commands = definitions
            .iter()
            .map(|definition| {
                let name = Self::name_of(definition);
                RemoteCommand {
                    id: format!("id-{name}"),
                    name,
                    definition: definition.clone(),
                }
            })
            .collect();
        self.remote
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(target, commands);
        Ok(())
    }

    async fn create(&self, target: DeployTarget, definition: &Value) -> Result<(), DeployError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        let name = Self::name_of(definition);
        let failing = self.fail_create.lock().unwrap_or_else(|e| e.into_inner());
        if failing.contains(&name) {
            return Err(DeployError::Platform(format!(
                "create rejected for {name}"
            )));
        }
        drop(failing);
        self.remote
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(target)
            .or_default()
            .push(RemoteCommand {
                id: format!("id-{name}"),
                name,
                definition: definition.clone(),
            });
        Ok(())
    }

    async fn update(
        &self,
        target: DeployTarget,
        id: &str,
        definition: &Value,
    ) -> Result<(), DeployError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let mut remote = self.remote.lock().unwrap_or_else(|e| e.into_inner());
        let commands = remote.entry(target).or_default();
        match commands.iter_mut().find(|cmd| cmd.id == id) {
            Some(command) => {
                command.definition = definition.clone();
                Ok(())
            }
            None => Err(DeployError::Platform(format!("unknown command id {id}"))),
        }
    }

    async fn delete(&self, target: DeployTarget, id: &str) -> Result<(), DeployError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        let mut remote = self.remote.lock().unwrap_or_else(|e| e.into_inner());
        let commands = remote.entry(target).or_default();
        let before = commands.len();
        commands.retain(|cmd| cmd.id != id);
        if commands.len() == before {
            return Err(DeployError::Platform(format!("unknown command id {id}")));
        }
        Ok(())
    }
}
