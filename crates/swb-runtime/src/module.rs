//! Module-facing registration surface.

use crate::core::Listener;
use crate::handler::{Handler, SharedHandler};
use crate::Core;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Weak};
use swb_interaction::Interaction;
use swb_registry::ModuleLifecycle;
use swb_types::ModuleId;

/// A module's handle onto the core.
///
/// Every registration made through this context adds its own undo to
/// the module's lifecycle, so [`Core::unload_module`] tears down
/// exactly what the module set up. The context holds no storage itself
/// and can be cloned freely.
///
/// Registration methods that return a closure hand back an explicit
/// unregister: calling it removes the registration immediately and
/// cancels the lifecycle entry.
#[derive(Debug, Clone)]
pub struct ModuleContext {
    core: Arc<Core>,
    owner: ModuleId,
    lifecycle: Arc<ModuleLifecycle>,
}

impl ModuleContext {
    pub(crate) fn new(core: Arc<Core>, owner: ModuleId, lifecycle: Arc<ModuleLifecycle>) -> Self {
        Self {
            core,
            owner,
            lifecycle,
        }
    }

    /// The module this context registers on behalf of.
    #[must_use]
    pub fn owner(&self) -> &ModuleId {
        &self.owner
    }

    /// The core this context is attached to.
    #[must_use]
    pub fn core(&self) -> &Arc<Core> {
        &self.core
    }

    /// Registers one command definition.
    ///
    /// Returns `true` when the definition was accepted; a missing or
    /// duplicate name is rejected and logged by the registry.
    pub fn register_command(&self, definition: serde_json::Value) -> bool {
        let name = definition
            .get("name")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned);

        let accepted = self
            .core
            .commands
            .write()
            .expect("lock poisoned")
            .register(self.owner.clone(), definition)
            .is_ok();

        if accepted {
            if let Some(name) = name {
                let core = Arc::downgrade(&self.core);
                // The cancel handle is dropped: commands unregister only
                // through module disposal.
                let _ = self.lifecycle.add_disposable(move || {
                    if let Some(core) = core.upgrade() {
                        core.commands.write().expect("lock poisoned").remove(&name);
                    }
                });
            }
        }
        accepted
    }

    /// Registers several command definitions, returning how many were
    /// accepted.
    pub fn register_commands(
        &self,
        definitions: impl IntoIterator<Item = serde_json::Value>,
    ) -> usize {
        definitions
            .into_iter()
            .filter(|definition| self.register_command(definition.clone()))
            .count()
    }

    /// Installs the execution route for a command name.
    ///
    /// Last writer wins: re-registering (e.g. after a module reload)
    /// replaces the previous route.
    pub fn on_command(&self, name: impl Into<String>, handler: impl Handler) {
        self.install_route(RouteKind::Command, name.into(), Arc::new(handler));
    }

    /// Installs the autocomplete route for a command name.
    pub fn on_autocomplete(&self, name: impl Into<String>, handler: impl Handler) {
        self.install_route(RouteKind::Autocomplete, name.into(), Arc::new(handler));
    }

    /// Installs the route for a context-menu entry name.
    pub fn on_context_menu(&self, name: impl Into<String>, handler: impl Handler) {
        self.install_route(RouteKind::ContextMenu, name.into(), Arc::new(handler));
    }

    /// Binds a button handler to a scoped id.
    pub fn register_button(
        &self,
        scoped_id: impl Into<String>,
        handler: impl Handler,
    ) -> impl FnOnce() + Send + 'static {
        let binding = self.core.components.write().expect("lock poisoned").register_button(
            scoped_id,
            self.owner.clone(),
            Arc::new(handler) as SharedHandler,
        );
        self.binding_unregister(binding)
    }

    /// Binds a select handler to a scoped id, covering all four select
    /// variants.
    pub fn register_select(
        &self,
        scoped_id: impl Into<String>,
        handler: impl Handler,
    ) -> impl FnOnce() + Send + 'static {
        let binding = self.core.components.write().expect("lock poisoned").register_select(
            scoped_id,
            self.owner.clone(),
            Arc::new(handler) as SharedHandler,
        );
        self.binding_unregister(binding)
    }

    /// Binds a modal handler to a scoped id.
    pub fn register_modal(
        &self,
        scoped_id: impl Into<String>,
        handler: impl Handler,
    ) -> impl FnOnce() + Send + 'static {
        let binding = self.core.components.write().expect("lock poisoned").register_modal(
            scoped_id,
            self.owner.clone(),
            Arc::new(handler) as SharedHandler,
        );
        self.binding_unregister(binding)
    }

    /// Registers a broadcast listener gated by a predicate.
    ///
    /// Every matching listener runs for every interaction, independent
    /// of (and in addition to) keyed routing.
    pub fn on_interaction(
        &self,
        predicate: impl Fn(&Interaction) -> bool + Send + Sync + 'static,
        handler: impl Handler,
    ) -> impl FnOnce() + Send + 'static {
        let id = self.core.next_listener.fetch_add(1, Ordering::SeqCst);
        self.core.listeners.write().expect("lock poisoned").push(Listener {
            id,
            owner: self.owner.clone(),
            predicate: Arc::new(predicate),
            handler: Arc::new(handler),
        });

        let core = Arc::downgrade(&self.core);
        let cancel = self.lifecycle.add_disposable(remove_listener(core.clone(), id));
        let remove = remove_listener(core, id);
        move || {
            remove();
            cancel();
        }
    }

    /// Returns this module's session manager handle.
    #[must_use]
    pub fn sessions(&self) -> &Arc<swb_state::SessionManager> {
        self.core.sessions()
    }

    /// Registers an arbitrary cleanup callback on the module lifecycle.
    ///
    /// Returns a closure that removes the callback without running it.
    pub fn add_disposable(
        &self,
        f: impl FnOnce() + Send + 'static,
    ) -> impl FnOnce() + Send + 'static {
        self.lifecycle.add_disposable(f)
    }

    fn install_route(&self, kind: RouteKind, name: String, handler: SharedHandler) {
        let table = match kind {
            RouteKind::Command => &self.core.command_routes,
            RouteKind::Autocomplete => &self.core.autocomplete_routes,
            RouteKind::ContextMenu => &self.core.context_menu_routes,
        };
        table
            .write()
            .expect("lock poisoned")
            .insert(name.clone(), self.owner.clone(), handler);

        let core = Arc::downgrade(&self.core);
        let owner = self.owner.clone();
        // Routes are replaced by re-registration, not cancelled, so the
        // cancel handle is dropped.
        let _ = self.lifecycle.add_disposable(move || {
            let Some(core) = core.upgrade() else { return };
            let table = match kind {
                RouteKind::Command => &core.command_routes,
                RouteKind::Autocomplete => &core.autocomplete_routes,
                RouteKind::ContextMenu => &core.context_menu_routes,
            };
            let mut table = table.write().expect("lock poisoned");
            // Only remove the route if it is still ours; a later writer
            // may have taken the name over.
            if table.resolve(&name).is_some_and(|(o, _)| o == owner) {
                table.remove(&name);
            }
        });
    }

    fn binding_unregister(
        &self,
        binding: swb_registry::BindingId,
    ) -> impl FnOnce() + Send + 'static {
        let core = Arc::downgrade(&self.core);
        let cancel = self
            .lifecycle
            .add_disposable(remove_binding(core.clone(), binding));
        let remove = remove_binding(core, binding);
        move || {
            remove();
            cancel();
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum RouteKind {
    Command,
    Autocomplete,
    ContextMenu,
}

fn remove_binding(
    core: Weak<Core>,
    binding: swb_registry::BindingId,
) -> impl FnOnce() + Send + 'static {
    move || {
        if let Some(core) = core.upgrade() {
            core.components
                .write()
                .expect("lock poisoned")
                .unregister(binding);
        }
    }
}

fn remove_listener(core: Weak<Core>, id: u64) -> impl FnOnce() + Send + 'static {
    move || {
        if let Some(core) = core.upgrade() {
            core.listeners
                .write()
                .expect("lock poisoned")
                .retain(|l| l.id != id);
        }
    }
}
