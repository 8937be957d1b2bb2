//! In-process driver: a shared map with per-key expiration.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{CacheContext, CacheError, Driver, Expiration, Value};

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: Value, ttl: Expiration, now: Instant) -> Self {
        Self {
            value,
            expires_at: ttl.deadline_from(now),
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

type Entries = HashMap<String, Entry>;

fn purge(entries: &RwLock<Entries>) -> usize {
    let now = Instant::now();
    let mut entries = entries.write().unwrap_or_else(PoisonError::into_inner);
    let before = entries.len();
    entries.retain(|_, e| e.is_live(now));
    before - entries.len()
}

/// In-memory driver with lazy TTL expiration.
///
/// Reads take the shared lock; every mutation, including counters, takes the
/// exclusive lock. An expired entry is reported absent the moment its
/// deadline passes and is physically removed by the next read that sees it,
/// by a later write, or by the optional sweeper task.
///
/// Handles obtained through `with_context` share the same map.
#[derive(Clone)]
pub struct MemoryDriver {
    entries: Arc<RwLock<Entries>>,
    store: String,
    ctx: CacheContext,
}

impl MemoryDriver {
    pub fn new(store: impl Into<String>) -> Self {
        Self::new_with_context(store, CacheContext::new())
    }

    pub fn new_with_context(store: impl Into<String>, ctx: CacheContext) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            store: store.into(),
            ctx,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a live entry; an expired one is evicted on the way out.
    fn live_value(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        {
            let entries = self.read();
            match entries.get(key) {
                None => return None,
                Some(entry) if entry.is_live(now) => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        let mut entries = self.write();
        if entries.get(key).is_some_and(|e| !e.is_live(Instant::now())) {
            entries.remove(key);
            debug!(key, "memory cache: evicted expired entry on read");
        }
        None
    }

    /// Read-modify-write of an integer counter under the exclusive lock.
    fn apply_counter(&self, key: &str, delta: i64) -> Result<i64, CacheError> {
        let now = Instant::now();
        let mut entries = self.write();

        match entries.get_mut(key) {
            Some(entry) if entry.is_live(now) => {
                let current = entry.value.as_counter().ok_or_else(|| {
                    CacheError::operation("value is not an integer or out of range")
                })?;
                let next = current.checked_add(delta).ok_or_else(|| {
                    CacheError::operation("increment or decrement would overflow")
                })?;
                entry.value = Value::Int(next);
                Ok(next)
            }
            _ => {
                entries.insert(
                    key.to_string(),
                    Entry::new(Value::Int(delta), Expiration::Never, now),
                );
                Ok(delta)
            }
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.read().values().filter(|e| e.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Physically drop expired entries, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        purge(&self.entries)
    }

    /// Periodically purge expired entries.
    ///
    /// The task holds only a weak reference to the map. It stops when this
    /// handle's context is done or once every handle sharing the map has been
    /// dropped, whichever happens first.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let entries: Weak<RwLock<Entries>> = Arc::downgrade(&self.entries);
        let store = self.store.clone();
        let ctx = self.ctx.clone();

        tokio::spawn(async move {
            info!(
                store = %store,
                interval_ms = interval.as_millis() as u64,
                "Starting memory cache sweeper"
            );
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ctx.done() => {
                        debug!(store = %store, "memory cache sweeper stopped: context done");
                        return;
                    }
                    _ = ticker.tick() => {
                        let Some(entries) = entries.upgrade() else {
                            debug!(store = %store, "memory cache sweeper stopped: driver dropped");
                            return;
                        };
                        let removed = purge(&entries);
                        if removed > 0 {
                            debug!(store = %store, removed, "memory cache sweep");
                        }
                    }
                }
            }
        })
    }
}

impl Default for MemoryDriver {
    fn default() -> Self {
        Self::new("")
    }
}

#[async_trait]
impl Driver for MemoryDriver {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn store(&self) -> &str {
        &self.store
    }

    fn context(&self) -> &CacheContext {
        &self.ctx
    }

    async fn add(&self, key: &str, value: Value, ttl: Expiration) -> bool {
        let now = Instant::now();
        let mut entries = self.write();

        if entries.get(key).is_some_and(|e| e.is_live(now)) {
            return false;
        }
        if ttl.is_expired() {
            entries.remove(key);
            return false;
        }

        entries.insert(key.to_string(), Entry::new(value, ttl, now));
        true
    }

    async fn put(&self, key: &str, value: Value, ttl: Expiration) -> Result<(), CacheError> {
        let mut entries = self.write();
        if ttl.is_expired() {
            entries.remove(key);
        } else {
            entries.insert(key.to_string(), Entry::new(value, ttl, Instant::now()));
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Option<Value> {
        self.live_value(key)
    }

    async fn has(&self, key: &str) -> bool {
        self.live_value(key).is_some()
    }

    async fn forget(&self, key: &str) -> bool {
        self.write().remove(key);
        true
    }

    async fn forget_if(&self, key: &str, expected: &Value) -> bool {
        let now = Instant::now();
        let mut entries = self.write();

        let owned = entries
            .get(key)
            .is_some_and(|e| e.is_live(now) && &e.value == expected);
        if owned {
            entries.remove(key);
        }
        owned
    }

    async fn flush(&self) -> bool {
        self.write().clear();
        true
    }

    async fn increment(&self, key: &str, delta: i64) -> Result<i64, CacheError> {
        self.apply_counter(key, delta)
    }

    async fn decrement(&self, key: &str, delta: i64) -> Result<i64, CacheError> {
        let delta = delta
            .checked_neg()
            .ok_or_else(|| CacheError::operation("decrement would overflow"))?;
        self.apply_counter(key, delta)
    }

    async fn with_context(&self, ctx: CacheContext) -> Result<Arc<dyn Driver>, CacheError> {
        Ok(Arc::new(Self {
            entries: Arc::clone(&self.entries),
            store: self.store.clone(),
            ctx,
        }))
    }
}
