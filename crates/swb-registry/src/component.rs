//! Component binding registry.

use std::collections::HashMap;
use swb_types::{ComponentKind, ModuleId};
use tracing::debug;

/// Identifier for one registration, covering every kind it was bound
/// under (a select registration spans four kinds but is one binding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(u64);

/// One scoped id bound to a handler under one component kind.
#[derive(Debug, Clone)]
pub struct ComponentBinding<H> {
    /// Full scoped identifier, matched exactly at dispatch.
    pub scoped_id: String,
    /// Kind this entry is bound under.
    pub kind: ComponentKind,
    /// Module that owns the binding.
    pub owner: ModuleId,
    /// The handler to invoke.
    pub handler: H,
    binding: BindingId,
}

/// Registry of interactive-component handlers across all modules.
///
/// Bindings are resolved by exact scoped-id match within a kind; when
/// two modules bind the same id, the earlier registration wins (module
/// registration order). The registry is generic over the handler type
/// so the routing layer decides what a handler is.
#[derive(Debug)]
pub struct ComponentRegistry<H> {
    bindings: HashMap<ComponentKind, Vec<ComponentBinding<H>>>,
    next_binding: u64,
}

impl<H> Default for ComponentRegistry<H> {
    fn default() -> Self {
        Self {
            bindings: HashMap::new(),
            next_binding: 0,
        }
    }
}

impl<H: Clone> ComponentRegistry<H> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a scoped id under each of the given kinds.
    ///
    /// Returns the id of the whole registration group;
    /// [`unregister`](Self::unregister) removes every entry it created.
    pub fn register(
        &mut self,
        kinds: &[ComponentKind],
        scoped_id: impl Into<String>,
        owner: ModuleId,
        handler: H,
    ) -> BindingId {
        let binding = BindingId(self.next_binding);
        self.next_binding += 1;
        let scoped_id = scoped_id.into();

        for kind in kinds {
            let entries = self.bindings.entry(*kind).or_default();
            if let Some(existing) = entries.iter().find(|b| b.scoped_id == scoped_id) {
                debug!(
                    scoped_id,
                    kind = %kind,
                    owner = %owner,
                    shadowed_by = %existing.owner,
                    "scoped id already bound, earlier registration keeps priority"
                );
            }
            entries.push(ComponentBinding {
                scoped_id: scoped_id.clone(),
                kind: *kind,
                owner: owner.clone(),
                handler: handler.clone(),
                binding,
            });
        }

        binding
    }

    /// Binds a button handler.
    pub fn register_button(
        &mut self,
        scoped_id: impl Into<String>,
        owner: ModuleId,
        handler: H,
    ) -> BindingId {
        self.register(&[ComponentKind::Button], scoped_id, owner, handler)
    }

    /// Binds a select handler under all four select variants, so any
    /// variant carrying the scoped id routes to the same handler.
    pub fn register_select(
        &mut self,
        scoped_id: impl Into<String>,
        owner: ModuleId,
        handler: H,
    ) -> BindingId {
        self.register(&ComponentKind::SELECT_VARIANTS, scoped_id, owner, handler)
    }

    /// Binds a modal handler.
    pub fn register_modal(
        &mut self,
        scoped_id: impl Into<String>,
        owner: ModuleId,
        handler: H,
    ) -> BindingId {
        self.register(&[ComponentKind::Modal], scoped_id, owner, handler)
    }

    /// Resolves a scoped id under a kind.
    ///
    /// First match in registration order wins. Returns the owner and a
    /// clone of the handler.
    #[must_use]
    pub fn resolve(&self, kind: ComponentKind, scoped_id: &str) -> Option<(ModuleId, H)> {
        self.bindings
            .get(&kind)?
            .iter()
            .find(|b| b.scoped_id == scoped_id)
            .map(|b| (b.owner.clone(), b.handler.clone()))
    }

    /// Removes every entry created by one registration.
    ///
    /// Returns the number of entries removed.
    pub fn unregister(&mut self, binding: BindingId) -> usize {
        let mut removed = 0;
        for entries in self.bindings.values_mut() {
            let before = entries.len();
            entries.retain(|b| b.binding != binding);
            removed += before - entries.len();
        }
        removed
    }

    /// Removes every binding owned by the given module.
    ///
    /// Returns the number of entries removed.
    pub fn remove_module(&mut self, owner: &ModuleId) -> usize {
        let mut removed = 0;
        for entries in self.bindings.values_mut() {
            let before = entries.len();
            entries.retain(|b| &b.owner != owner);
            removed += before - entries.len();
        }
        removed
    }

    /// Returns the total number of bound entries across all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.values().map(Vec::len).sum()
    }

    /// Returns `true` if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
