//! The core: explicit owner of every registry and service.
//!
//! There are no globals; everything a module or the dispatcher touches
//! hangs off one [`Core`] value shared by `Arc`. Hosts build exactly
//! the core they need:
//!
//! ```
//! use swb_runtime::Core;
//!
//! # fn main() -> Result<(), swb_runtime::CoreError> {
//! let core = Core::builder().build()?;
//! let shop = core.module("shop");
//! # Ok(())
//! # }
//! ```

use crate::config::SwitchboardConfig;
use crate::error::CoreError;
use crate::handler::{NullSink, SharedHandler};
use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex as StdMutex, RwLock};
use swb_deploy::{
    CommandsApi, DeployError, DeployReport, DeployTarget, Deployer, FileSnapshotStore,
    MemorySnapshotStore, SnapshotStore,
};
use swb_interaction::{Interaction, ResponseSink};
use swb_registry::{CommandRegistry, ComponentRegistry, ModuleLifecycle, RouteTable};
use swb_state::{FileBackend, MemoryBackend, SessionBackend, SessionManager};
use swb_types::ModuleId;
use tracing::info;

/// One predicate-gated broadcast listener.
#[derive(Clone)]
pub(crate) struct Listener {
    pub(crate) id: u64,
    pub(crate) owner: ModuleId,
    pub(crate) predicate: Arc<dyn Fn(&Interaction) -> bool + Send + Sync>,
    pub(crate) handler: SharedHandler,
}

/// Central runtime state shared by every module and the dispatcher.
///
/// Registries sit behind `std::sync::RwLock` (critical sections are
/// synchronous and short); the session manager and deployer carry their
/// own synchronization.
pub struct Core {
    pub(crate) commands: RwLock<CommandRegistry>,
    pub(crate) command_routes: RwLock<RouteTable<SharedHandler>>,
    pub(crate) autocomplete_routes: RwLock<RouteTable<SharedHandler>>,
    pub(crate) context_menu_routes: RwLock<RouteTable<SharedHandler>>,
    pub(crate) components: RwLock<ComponentRegistry<SharedHandler>>,
    pub(crate) listeners: RwLock<Vec<Listener>>,
    pub(crate) next_listener: AtomicU64,
    pub(crate) sink: Arc<dyn ResponseSink>,
    sessions: Arc<SessionManager>,
    lifecycles: StdMutex<HashMap<ModuleId, Arc<ModuleLifecycle>>>,
    deployer: Option<Deployer>,
    config: SwitchboardConfig,
    sweeper: StdMutex<Option<tokio::task::JoinHandle<()>>>,
}

impl std::fmt::Debug for Core {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Core")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Core {
    /// Starts building a core.
    #[must_use]
    pub fn builder() -> CoreBuilder {
        CoreBuilder::default()
    }

    /// Returns the effective configuration.
    #[must_use]
    pub fn config(&self) -> &SwitchboardConfig {
        &self.config
    }

    /// Returns the session manager.
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Returns a module's context, creating its lifecycle on first use.
    ///
    /// Calling this again for the same module returns a context sharing
    /// the existing lifecycle.
    #[must_use]
    pub fn module(self: &Arc<Self>, name: impl Into<ModuleId>) -> crate::ModuleContext {
        let owner = name.into();
        let lifecycle = {
            let mut lifecycles = self.lifecycles.lock().expect("lock poisoned");
            Arc::clone(
                lifecycles
                    .entry(owner.clone())
                    .or_insert_with(|| ModuleLifecycle::new(owner.clone())),
            )
        };
        crate::ModuleContext::new(Arc::clone(self), owner, lifecycle)
    }

    /// Unloads a module: runs its disposers, then sweeps every registry
    /// for anything it left behind.
    ///
    /// After this returns, nothing the module registered is routable
    /// and a fresh instance can register without collision. Unloading a
    /// module that was never loaded is a no-op.
    pub fn unload_module(&self, owner: &ModuleId) {
        let lifecycle = self
            .lifecycles
            .lock()
            .expect("lock poisoned")
            .remove(owner);
        if let Some(lifecycle) = lifecycle {
            lifecycle.dispose_all();
        }

        // Disposers normally clean everything up; the sweep is the
        // backstop for registrations made without one.
        let commands = self.commands.write().expect("lock poisoned").remove_module(owner);
        let routes = self
            .command_routes
            .write()
            .expect("lock poisoned")
            .remove_module(owner)
            + self
                .autocomplete_routes
                .write()
                .expect("lock poisoned")
                .remove_module(owner)
            + self
                .context_menu_routes
                .write()
                .expect("lock poisoned")
                .remove_module(owner);
        let components = self
            .components
            .write()
            .expect("lock poisoned")
            .remove_module(owner);
        self.listeners
            .write()
            .expect("lock poisoned")
            .retain(|l| &l.owner != owner);

        info!(
            module = %owner,
            commands,
            routes,
            components,
            "module unloaded"
        );
    }

    /// Returns the aggregated command definitions in registration order.
    #[must_use]
    pub fn command_definitions(&self) -> Vec<serde_json::Value> {
        self.commands.read().expect("lock poisoned").definitions()
    }

    /// Deploys the aggregated command set to a target.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Platform`] when the core was built without
    /// a commands API, or whatever the deployer surfaces.
    pub async fn deploy(&self, target: DeployTarget) -> Result<DeployReport, DeployError> {
        let Some(deployer) = &self.deployer else {
            return Err(DeployError::Platform(
                "no commands api configured".to_string(),
            ));
        };
        let definitions = self.command_definitions();
        deployer.deploy(target, &definitions).await
    }

    /// Starts the background session sweep at the configured interval.
    ///
    /// Must be called inside a tokio runtime. Idempotent; a second call
    /// while the sweeper is running does nothing.
    pub fn start_sweeper(self: &Arc<Self>) {
        let mut sweeper = self.sweeper.lock().expect("lock poisoned");
        if sweeper.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }
        *sweeper = Some(
            self.sessions
                .spawn_sweeper(self.config.session.sweep_interval()),
        );
    }

    /// Stops the sweeper and unloads every module.
    pub fn shutdown(&self) {
        if let Some(handle) = self.sweeper.lock().expect("lock poisoned").take() {
            handle.abort();
        }
        let owners: Vec<ModuleId> = self
            .lifecycles
            .lock()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect();
        for owner in owners {
            self.unload_module(&owner);
        }
    }
}

/// Builder for [`Core`].
///
/// Every part is optional: the default core has an in-memory session
/// backend, a reply-dropping sink and no platform API (deployment then
/// fails until one is provided).
#[derive(Default)]
pub struct CoreBuilder {
    sink: Option<Arc<dyn ResponseSink>>,
    commands_api: Option<Arc<dyn CommandsApi>>,
    snapshots: Option<Arc<dyn SnapshotStore>>,
    sessions: Option<Arc<SessionManager>>,
    config: SwitchboardConfig,
}

impl CoreBuilder {
    /// Sets the outbound reply channel.
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn ResponseSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Sets the platform command API used for deployment.
    #[must_use]
    pub fn commands_api(mut self, api: Arc<dyn CommandsApi>) -> Self {
        self.commands_api = Some(api);
        self
    }

    /// Sets the deployment snapshot store (in-memory by default).
    #[must_use]
    pub fn snapshot_store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.snapshots = Some(store);
        self
    }

    /// Provides a pre-built session manager, e.g. one over a file
    /// backend.
    #[must_use]
    pub fn session_manager(mut self, sessions: Arc<SessionManager>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    /// Sets the configuration (defaults otherwise).
    #[must_use]
    pub fn config(mut self, config: SwitchboardConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the core.
    ///
    /// Configuration fills in whatever the builder left unset: a
    /// `session.file` path selects the file session backend and a
    /// `deploy.snapshot_dir` the file snapshot store. Explicit builder
    /// calls win over configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] when a configured session file or snapshot
    /// directory cannot be prepared.
    pub fn build(self) -> Result<Arc<Core>, CoreError> {
        let config = self.config;
        let sessions = match self.sessions {
            Some(sessions) => sessions,
            None => {
                let backend: Arc<dyn SessionBackend> = match &config.session.file {
                    Some(path) => Arc::new(FileBackend::new(path.clone())?),
                    None => Arc::new(MemoryBackend::new()),
                };
                Arc::new(
                    SessionManager::with_backend(backend).default_ttl(config.session.ttl()),
                )
            }
        };
        let deployer = match self.commands_api {
            Some(api) => {
                let snapshots: Arc<dyn SnapshotStore> =
                    match (self.snapshots, &config.deploy.snapshot_dir) {
                        (Some(store), _) => store,
                        (None, Some(dir)) => Arc::new(FileSnapshotStore::new(dir.clone())?),
                        (None, None) => Arc::new(MemorySnapshotStore::new()),
                    };
                Some(Deployer::new(api, snapshots).strategy(config.deploy.strategy))
            }
            None => None,
        };

        Ok(Arc::new(Core {
            commands: RwLock::new(CommandRegistry::new()),
            command_routes: RwLock::new(RouteTable::new()),
            autocomplete_routes: RwLock::new(RouteTable::new()),
            context_menu_routes: RwLock::new(RouteTable::new()),
            components: RwLock::new(ComponentRegistry::new()),
            listeners: RwLock::new(Vec::new()),
            next_listener: AtomicU64::new(0),
            sink: self.sink.unwrap_or_else(|| Arc::new(NullSink)),
            sessions,
            lifecycles: StdMutex::new(HashMap::new()),
            deployer,
            config,
            sweeper: StdMutex::new(None),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deploy_without_api_fails() {
        let core = Core::builder().build().unwrap();
        let err = core.deploy(DeployTarget::Global).await.unwrap_err();
        assert!(matches!(err, DeployError::Platform(_)));
    }

    #[test]
    fn unload_unknown_module_is_noop() {
        let core = Core::builder().build().unwrap();
        core.unload_module(&ModuleId::new("ghost"));
    }

    #[tokio::test]
    async fn sweeper_start_is_idempotent() {
        let core = Core::builder().build().unwrap();
        core.start_sweeper();
        core.start_sweeper();
        core.shutdown();
    }

    #[tokio::test]
    async fn explicit_session_manager_wins_over_config() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut config = SwitchboardConfig::default();
        config.session.file = Some(temp.path().join("sessions.json"));

        let manager = Arc::new(SessionManager::new());
        let core = Core::builder()
            .config(config)
            .session_manager(Arc::clone(&manager))
            .build()
            .unwrap();

        core.sessions().with_key("msg-1").set("step", 1).await;
        assert!(!temp.path().join("sessions.json").exists());
    }
}
