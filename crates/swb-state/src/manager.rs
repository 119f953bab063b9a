//! Session manager and per-session handles.

use crate::{now_ms, MemoryBackend, SessionBackend, SessionRecord};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use swb_interaction::Interaction;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Sessions expire this long after their last access unless overridden.
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

/// How often the background sweep looks for expired sessions.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Shared session state behind a pluggable backend.
///
/// The manager owns nothing but the backend and a per-key lock map; the
/// backend is authoritative, every handle operation reads through it.
/// All mutations for one key run under that key's lock, held across the
/// load and the store, so concurrent writers to the same session cannot
/// lose updates.
pub struct SessionManager {
    backend: Arc<dyn SessionBackend>,
    default_ttl: Duration,
    locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManager {
    /// Creates a manager over an in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::with_backend(Arc::new(MemoryBackend::new()))
    }

    /// Creates a manager over the given backend.
    #[must_use]
    pub fn with_backend(backend: Arc<dyn SessionBackend>) -> Self {
        Self {
            backend,
            default_ttl: DEFAULT_TTL,
            locks: StdMutex::new(HashMap::new()),
        }
    }

    /// Overrides the TTL applied to handles that don't set their own.
    #[must_use]
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Opens a handle for an explicit session key.
    #[must_use]
    pub fn with_key(self: &Arc<Self>, key: impl Into<String>) -> SessionHandle {
        SessionHandle {
            manager: Arc::clone(self),
            key: key.into(),
            ttl: self.default_ttl,
        }
    }

    /// Opens a handle keyed by the interaction's session key, so every
    /// interaction on the same message shares one session.
    #[must_use]
    pub fn for_interaction(self: &Arc<Self>, interaction: &Interaction) -> SessionHandle {
        self.with_key(interaction.session_key())
    }

    /// Deletes every expired session and returns how many were removed.
    ///
    /// Backend failures are logged; a failed sweep pass removes nothing
    /// and the next pass retries.
    pub async fn sweep_once(&self) -> usize {
        let records = match self.backend.load_all().await {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "session sweep could not list records");
                return 0;
            }
        };

        let now = now_ms();
        let mut removed = 0;
        for record in records.iter().filter(|r| r.is_expired(now)) {
            let lock = self.key_lock(&record.key);
            let _guard = lock.lock().await;
            // Re-check under the lock: a handle may have slid the TTL
            // between the listing and now.
            match self.backend.load(&record.key).await {
                Ok(Some(current)) if current.is_expired(now_ms()) => {
                    if let Err(err) = self.backend.remove(&record.key).await {
                        warn!(key = %record.key, error = %err, "failed to sweep session");
                    } else {
                        removed += 1;
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(key = %record.key, error = %err, "failed to re-check session");
                }
            }
        }

        self.prune_locks();
        removed
    }

    /// Spawns the fixed-interval sweep task.
    ///
    /// The task holds only a weak reference and ends on its own once the
    /// manager is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(manager) = weak.upgrade() else { break };
                let removed = manager.sweep_once().await;
                if removed > 0 {
                    debug!(removed, "swept expired sessions");
                }
            }
        })
    }

    fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(locks.entry(key.to_owned()).or_default())
    }

    /// Drops lock entries nobody is waiting on. The map would otherwise
    /// grow with every session key ever seen.
    fn prune_locks(&self) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Loads the live record for a key (creating a fresh one if absent
    /// or expired), applies `f`, slides the TTL and stores the result.
    ///
    /// Runs entirely under the key's lock. Read failures degrade to a
    /// fresh session; write failures are logged and dropped.
    async fn access<R>(
        &self,
        key: &str,
        ttl: Duration,
        f: impl FnOnce(&mut Map<String, Value>) -> R,
    ) -> R {
        let ttl_ms = ttl.as_millis() as u64;
        let lock = self.key_lock(key);
        let _guard = lock.lock().await;

        let mut record = match self.backend.load(key).await {
            Ok(Some(record)) if !record.is_expired(now_ms()) => record,
            Ok(_) => SessionRecord::new(key, ttl_ms),
            Err(err) => {
                warn!(key = %key, error = %err, "session read failed, starting fresh");
                SessionRecord::new(key, ttl_ms)
            }
        };

        let out = f(&mut record.data);
        record.touch(ttl_ms);
        if let Err(err) = self.backend.store(&record).await {
            warn!(key = %key, error = %err, "dropping session write");
        }
        out
    }
}

/// A handle onto one session's key-value bag.
///
/// Handles are cheap to create and hold no session data themselves;
/// every operation reads through the manager's backend and slides the
/// session's expiry forward by this handle's TTL. Operations never
/// fail: storage trouble degrades to an empty session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    manager: Arc<SessionManager>,
    key: String,
    ttl: Duration,
}

impl SessionHandle {
    /// Returns the session key this handle operates on.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Overrides the TTL this handle slides the session by.
    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Fetches a field.
    pub async fn get(&self, field: &str) -> Option<Value> {
        self.manager
            .access(&self.key, self.ttl, |data| data.get(field).cloned())
            .await
    }

    /// Stores a field, overwriting any previous value.
    pub async fn set(&self, field: impl Into<String>, value: impl Into<Value>) {
        let (field, value) = (field.into(), value.into());
        self.manager
            .access(&self.key, self.ttl, move |data| {
                data.insert(field, value);
            })
            .await;
    }

    /// Returns whether a field is present.
    pub async fn has(&self, field: &str) -> bool {
        self.manager
            .access(&self.key, self.ttl, |data| data.contains_key(field))
            .await
    }

    /// Removes a field, returning whether it was present.
    pub async fn delete(&self, field: &str) -> bool {
        self.manager
            .access(&self.key, self.ttl, |data| data.remove(field).is_some())
            .await
    }

    /// Empties the session's data bag. The session itself stays alive
    /// until its TTL lapses.
    pub async fn clear(&self) {
        self.manager
            .access(&self.key, self.ttl, |data| data.clear())
            .await;
    }

    /// Removes the session record entirely, ending it now instead of
    /// at TTL expiry. The next access starts a fresh session.
    ///
    /// Runs under the key's lock. A backend failure is logged; the
    /// record then lives on until the sweep retires it.
    pub async fn destroy(&self) {
        let lock = self.manager.key_lock(&self.key);
        let _guard = lock.lock().await;
        if let Err(err) = self.manager.backend.remove(&self.key).await {
            warn!(key = %self.key, error = %err, "failed to destroy session");
        }
    }

    /// Lists the field names in insertion order.
    pub async fn keys(&self) -> Vec<String> {
        self.manager
            .access(&self.key, self.ttl, |data| data.keys().cloned().collect())
            .await
    }

    /// Lists the values in insertion order.
    pub async fn values(&self) -> Vec<Value> {
        self.manager
            .access(&self.key, self.ttl, |data| data.values().cloned().collect())
            .await
    }

    /// Lists `(field, value)` pairs in insertion order.
    pub async fn entries(&self) -> Vec<(String, Value)> {
        self.manager
            .access(&self.key, self.ttl, |data| {
                data.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StateError;
    use async_trait::async_trait;
    use serde_json::json;

    fn manager() -> Arc<SessionManager> {
        Arc::new(SessionManager::new())
    }

    #[tokio::test]
    async fn set_get_round_trip() {
        let manager = manager();
        let session = manager.with_key("msg-1");

        assert_eq!(session.get("step").await, None);
        session.set("step", 2).await;
        assert_eq!(session.get("step").await, Some(json!(2)));
        assert!(session.has("step").await);
    }

    #[tokio::test]
    async fn handles_for_same_key_share_state() {
        let manager = manager();
        manager.with_key("msg-1").set("color", "red").await;
        assert_eq!(
            manager.with_key("msg-1").get("color").await,
            Some(json!("red"))
        );
        assert_eq!(manager.with_key("msg-2").get("color").await, None);
    }

    #[tokio::test]
    async fn delete_and_clear() {
        let manager = manager();
        let session = manager.with_key("msg-1");
        session.set("a", 1).await;
        session.set("b", 2).await;

        assert!(session.delete("a").await);
        assert!(!session.delete("a").await);
        assert_eq!(session.keys().await, ["b"]);

        session.clear().await;
        assert!(session.entries().await.is_empty());
    }

    #[tokio::test]
    async fn destroy_removes_the_record_now() {
        let backend = Arc::new(MemoryBackend::new());
        let manager = Arc::new(SessionManager::with_backend(backend.clone()));
        let session = manager.with_key("msg-1");
        session.set("step", 1).await;

        session.destroy().await;

        // Gone from the backend, not just emptied.
        assert!(backend.load("msg-1").await.unwrap().is_none());
        assert_eq!(manager.with_key("msg-1").get("step").await, None);
    }

    #[tokio::test]
    async fn entries_preserve_insertion_order() {
        let manager = manager();
        let session = manager.with_key("msg-1");
        session.set("z", 1).await;
        session.set("a", 2).await;

        assert_eq!(session.keys().await, ["z", "a"]);
        assert_eq!(session.values().await, [json!(1), json!(2)]);
    }

    #[tokio::test]
    async fn access_slides_expiry_forward() {
        let backend = Arc::new(MemoryBackend::new());
        let manager = Arc::new(SessionManager::with_backend(backend.clone()));
        let session = manager.with_key("msg-1").ttl(Duration::from_secs(3600));

        session.set("step", 1).await;
        let first = backend.load("msg-1").await.unwrap().unwrap().expires_at_ms;

        tokio::time::sleep(Duration::from_millis(5)).await;
        session.get("step").await;
        let second = backend.load("msg-1").await.unwrap().unwrap().expires_at_ms;

        assert!(second > first);
    }

    #[tokio::test]
    async fn sweep_removes_expired_sessions_only() {
        let manager = manager();
        manager
            .with_key("stale")
            .ttl(Duration::ZERO)
            .set("step", 1)
            .await;
        manager.with_key("live").set("step", 1).await;

        assert_eq!(manager.sweep_once().await, 1);

        // A fresh read after the sweep finds nothing under the stale key.
        assert_eq!(manager.with_key("stale").get("step").await, None);
        assert_eq!(manager.with_key("live").get("step").await, Some(json!(1)));
    }

    #[tokio::test]
    async fn expired_session_reads_as_fresh_before_sweep() {
        let manager = manager();
        let session = manager.with_key("msg-1").ttl(Duration::ZERO);
        session.set("step", 1).await;

        // Expired but not yet swept: the next access starts fresh.
        let fresh = manager.with_key("msg-1");
        assert_eq!(fresh.get("step").await, None);
    }

    #[tokio::test]
    async fn concurrent_writers_lose_no_updates() {
        let manager = manager();

        let mut tasks = Vec::new();
        for i in 0..32 {
            let session = manager.with_key("shared");
            tasks.push(tokio::spawn(async move {
                session.set(format!("field-{i}"), i).await;
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(manager.with_key("shared").entries().await.len(), 32);
    }

    struct FailingBackend;

    #[async_trait]
    impl SessionBackend for FailingBackend {
        async fn load(&self, _key: &str) -> Result<Option<SessionRecord>, StateError> {
            Err(StateError::Backend("down".into()))
        }
        async fn store(&self, _record: &SessionRecord) -> Result<(), StateError> {
            Err(StateError::Backend("down".into()))
        }
        async fn remove(&self, _key: &str) -> Result<(), StateError> {
            Err(StateError::Backend("down".into()))
        }
        async fn load_all(&self) -> Result<Vec<SessionRecord>, StateError> {
            Err(StateError::Backend("down".into()))
        }
    }

    #[tokio::test]
    async fn backend_failures_degrade_to_empty_session() {
        let manager = Arc::new(SessionManager::with_backend(Arc::new(FailingBackend)));
        let session = manager.with_key("msg-1");

        session.set("step", 1).await;
        assert_eq!(session.get("step").await, None);
        assert_eq!(manager.sweep_once().await, 0);
    }

    #[tokio::test]
    async fn sweeper_task_ends_when_manager_drops() {
        let manager = manager();
        let task = manager.spawn_sweeper(Duration::from_millis(1));
        drop(manager);

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("sweeper should stop")
            .unwrap();
    }
}
