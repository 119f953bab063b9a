//! Per-module disposal tracking.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use swb_types::ModuleId;
use tracing::{debug, error};

type Disposer = Box<dyn FnOnce() + Send + 'static>;

/// Ordered set of cleanup callbacks for one module.
///
/// Every registration a module makes (commands, component bindings,
/// listeners, timers) adds a disposer here, so
/// [`dispose_all`](Self::dispose_all) is the single teardown point:
/// after it runs, nothing the module registered remains routable and a
/// fresh instance can re-register without collision.
///
/// # Guarantees
///
/// - Each disposer runs at most once.
/// - A panicking disposer is caught and logged; the rest still run.
/// - `dispose_all` is idempotent: the set is cleared, so a second call
///   is a no-op.
pub struct ModuleLifecycle {
    owner: ModuleId,
    disposers: Mutex<Vec<(u64, Disposer)>>,
    next: AtomicU64,
}

impl ModuleLifecycle {
    /// Creates an empty lifecycle for a module.
    #[must_use]
    pub fn new(owner: ModuleId) -> Arc<Self> {
        Arc::new(Self {
            owner,
            disposers: Mutex::new(Vec::new()),
            next: AtomicU64::new(0),
        })
    }

    /// Returns the owning module.
    #[must_use]
    pub fn owner(&self) -> &ModuleId {
        &self.owner
    }

    /// Registers a zero-argument cleanup callback.
    ///
    /// Returns an unregister function that removes the callback
    /// *without* running it. Holding the unregister function does not
    /// keep the lifecycle alive.
    pub fn add_disposable(
        self: &Arc<Self>,
        f: impl FnOnce() + Send + 'static,
    ) -> impl FnOnce() + Send + 'static {
        let id = self.next.fetch_add(1, Ordering::SeqCst);
        self.disposers
            .lock()
            .expect("lock poisoned")
            .push((id, Box::new(f)));

        let weak = Arc::downgrade(self);
        move || {
            if let Some(lifecycle) = weak.upgrade() {
                lifecycle
                    .disposers
                    .lock()
                    .expect("lock poisoned")
                    .retain(|(entry_id, _)| *entry_id != id);
            }
        }
    }

    /// Invokes every registered disposer exactly once, then clears the
    /// set.
    ///
    /// Disposers run in registration order. A panic in one disposer is
    /// caught and logged and does not prevent the rest from running.
    pub fn dispose_all(&self) {
        let drained: Vec<(u64, Disposer)> =
            std::mem::take(&mut *self.disposers.lock().expect("lock poisoned"));

        if drained.is_empty() {
            return;
        }
        debug!(module = %self.owner, count = drained.len(), "disposing module");

        for (id, disposer) in drained {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(disposer)) {
                let message = panic_message(payload.as_ref());
                error!(
                    module = %self.owner,
                    disposer = id,
                    panic = %message,
                    "disposer panicked, continuing with the rest"
                );
            }
        }
    }

    /// Returns the number of pending disposers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.disposers.lock().expect("lock poisoned").len()
    }

    /// Returns `true` if no disposers are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ModuleLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleLifecycle")
            .field("owner", &self.owner)
            .field("pending", &self.len())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn dispose_all_runs_in_order() {
        let lifecycle = ModuleLifecycle::new("m".into());
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let order = Arc::clone(&order);
            lifecycle.add_disposable(move || order.lock().unwrap().push(i));
        }

        lifecycle.dispose_all();
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
        assert!(lifecycle.is_empty());
    }

    #[test]
    fn dispose_all_is_idempotent() {
        let lifecycle = ModuleLifecycle::new("m".into());
        let count = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&count);
        lifecycle.add_disposable(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        lifecycle.dispose_all();
        lifecycle.dispose_all();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn panicking_disposer_does_not_stop_the_rest() {
        let lifecycle = ModuleLifecycle::new("m".into());
        let ran = Arc::new(AtomicUsize::new(0));

        lifecycle.add_disposable(|| panic!("boom"));
        let r = Arc::clone(&ran);
        lifecycle.add_disposable(move || {
            r.fetch_add(1, Ordering::SeqCst);
        });

        lifecycle.dispose_all();
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unregister_removes_without_running() {
        let lifecycle = ModuleLifecycle::new("m".into());
        let count = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&count);
        let unregister = lifecycle.add_disposable(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(lifecycle.len(), 1);

        unregister();
        assert!(lifecycle.is_empty());

        lifecycle.dispose_all();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unregister_after_dispose_is_noop() {
        let lifecycle = ModuleLifecycle::new("m".into());
        let unregister = lifecycle.add_disposable(|| {});
        lifecycle.dispose_all();
        unregister();
        assert!(lifecycle.is_empty());
    }
}
