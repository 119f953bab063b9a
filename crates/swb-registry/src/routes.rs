//! Name-keyed execution route tables.

use std::collections::HashMap;
use swb_types::ModuleId;
use tracing::debug;

/// One active route per name.
///
/// Used for command execution, autocomplete and context-menu routing.
/// Duplicate policy is **last-writer-wins**: a later registration for
/// the same name replaces the earlier one. This is deliberately the
/// opposite of [`CommandRegistry`](crate::CommandRegistry)'s
/// reject-on-conflict policy; a reloading module must be able to take
/// back its own route, while raw definitions must stay unique.
#[derive(Debug)]
pub struct RouteTable<H> {
    routes: HashMap<String, (ModuleId, H)>,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }
}

impl<H: Clone> RouteTable<H> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the route for a name, replacing any existing one.
    ///
    /// Returns `true` when an earlier route was replaced.
    pub fn insert(&mut self, name: impl Into<String>, owner: ModuleId, handler: H) -> bool {
        let name = name.into();
        let replaced = self.routes.insert(name.clone(), (owner.clone(), handler));
        if let Some((old_owner, _)) = &replaced {
            debug!(name, old_owner = %old_owner, new_owner = %owner, "execution route replaced");
        }
        replaced.is_some()
    }

    /// Resolves the active route for a name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<(ModuleId, H)> {
        self.routes.get(name).cloned()
    }

    /// Removes the route for a name, regardless of owner.
    ///
    /// Returns `true` if a route was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.routes.remove(name).is_some()
    }

    /// Removes every route owned by the given module.
    ///
    /// Returns the number of routes removed.
    pub fn remove_module(&mut self, owner: &ModuleId) -> usize {
        let before = self.routes.len();
        self.routes.retain(|_, (o, _)| o != owner);
        before - self.routes.len()
    }

    /// Returns the number of active routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no routes are installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
