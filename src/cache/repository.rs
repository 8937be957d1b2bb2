//! `Cache`: the caller-facing facade over any [`Driver`].
//!
//! Everything here is composed from driver primitives and holds no backend
//! specific logic. In particular `remember` is a plain get, compute, put
//! sequence: concurrent callers missing on the same key will all compute and
//! the last write wins. Wrap the call in a [`Lock`] when single-flight matters.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::cache::coerce;
use crate::cache::{CacheContext, CacheError, Driver, Expiration, Lock, Value};

#[derive(Clone)]
pub struct Cache {
    driver: Arc<dyn Driver>,
    lock_poll_interval: Duration,
}

impl Cache {
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self {
            driver,
            lock_poll_interval: crate::cache::lock::DEFAULT_POLL_INTERVAL,
        }
    }

    /// Poll interval handed to locks created through this cache.
    pub fn with_lock_poll_interval(mut self, interval: Duration) -> Self {
        self.lock_poll_interval = interval;
        self
    }

    /// Get a reference to the backing driver.
    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    // ========================================================================
    // Driver proxy methods
    // ========================================================================

    pub async fn add(&self, key: &str, value: impl Into<Value>, ttl: impl Into<Expiration>) -> bool {
        self.driver.add(key, value.into(), ttl.into()).await
    }

    pub async fn put(
        &self,
        key: &str,
        value: impl Into<Value>,
        ttl: impl Into<Expiration>,
    ) -> Result<(), CacheError> {
        self.driver.put(key, value.into(), ttl.into()).await
    }

    pub async fn forever(&self, key: &str, value: impl Into<Value>) -> bool {
        self.driver.forever(key, value.into()).await
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        self.driver.get(key).await
    }

    pub async fn has(&self, key: &str) -> bool {
        self.driver.has(key).await
    }

    pub async fn forget(&self, key: &str) -> bool {
        self.driver.forget(key).await
    }

    pub async fn flush(&self) -> bool {
        self.driver.flush().await
    }

    pub async fn increment(&self, key: &str) -> Result<i64, CacheError> {
        self.driver.increment(key, 1).await
    }

    pub async fn increment_by(&self, key: &str, delta: i64) -> Result<i64, CacheError> {
        self.driver.increment(key, delta).await
    }

    pub async fn decrement(&self, key: &str) -> Result<i64, CacheError> {
        self.driver.decrement(key, 1).await
    }

    pub async fn decrement_by(&self, key: &str, delta: i64) -> Result<i64, CacheError> {
        self.driver.decrement(key, delta).await
    }

    // ========================================================================
    // Lookups with defaults
    // ========================================================================

    pub async fn get_or(&self, key: &str, default: impl Into<Value>) -> Value {
        match self.driver.get(key).await {
            Some(value) => value,
            None => default.into(),
        }
    }

    /// Like [`Cache::get_or`], but the default is only built on a miss.
    pub async fn get_or_else<F, V>(&self, key: &str, default: F) -> Value
    where
        F: FnOnce() -> V,
        V: Into<Value>,
    {
        match self.driver.get(key).await {
            Some(value) => value,
            None => default().into(),
        }
    }

    pub async fn get_bool(&self, key: &str, default: bool) -> bool {
        let value = self.driver.get(key).await;
        coerce::coerce_or(value, default, coerce::parse_bool, coerce::to_bool)
    }

    pub async fn get_int(&self, key: &str, default: i32) -> i32 {
        let value = self.driver.get(key).await;
        coerce::coerce_or(value, default, coerce::parse_i32, coerce::to_i32)
    }

    pub async fn get_int64(&self, key: &str, default: i64) -> i64 {
        let value = self.driver.get(key).await;
        coerce::coerce_or(value, default, coerce::parse_i64, coerce::to_i64)
    }

    pub async fn get_string(&self, key: &str, default: &str) -> String {
        match self.driver.get(key).await {
            Some(value) => coerce::to_string(&value),
            None => default.to_string(),
        }
    }

    /// Read and delete. A miss has no side effects.
    pub async fn pull(&self, key: &str) -> Option<Value> {
        let value = self.driver.get(key).await?;
        self.driver.forget(key).await;
        Some(value)
    }

    pub async fn pull_or(&self, key: &str, default: impl Into<Value>) -> Value {
        match self.pull(key).await {
            Some(value) => value,
            None => default.into(),
        }
    }

    // ========================================================================
    // Memoization
    // ========================================================================

    /// Return the cached value, or compute, store for `ttl` and return it.
    ///
    /// A failed computation caches nothing and its error is returned as
    /// [`CacheError::Compute`].
    pub async fn remember<F, Fut, V, E>(
        &self,
        key: &str,
        ttl: impl Into<Expiration>,
        compute: F,
    ) -> Result<Value, CacheError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        V: Into<Value>,
        E: Into<anyhow::Error>,
    {
        if let Some(value) = self.driver.get(key).await {
            debug!(key, driver = self.driver.name(), "cache hit");
            return Ok(value);
        }

        debug!(key, driver = self.driver.name(), "cache miss, computing");
        let value: Value = compute()
            .await
            .map_err(|e| CacheError::Compute(e.into()))?
            .into();

        self.driver.put(key, value.clone(), ttl.into()).await?;
        Ok(value)
    }

    pub async fn remember_forever<F, Fut, V, E>(
        &self,
        key: &str,
        compute: F,
    ) -> Result<Value, CacheError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        V: Into<Value>,
        E: Into<anyhow::Error>,
    {
        self.remember(key, Expiration::Never, compute).await
    }

    /// [`Cache::remember`] for structured values, stored as JSON text.
    ///
    /// A cached entry that no longer deserializes into `T` is treated as a
    /// miss and overwritten.
    pub async fn remember_json<T, F, Fut, E>(
        &self,
        key: &str,
        ttl: impl Into<Expiration>,
        compute: F,
    ) -> Result<T, CacheError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<anyhow::Error>,
    {
        if let Some(cached) = self.driver.get(key).await {
            match serde_json::from_slice(&cached.to_bytes()) {
                Ok(value) => return Ok(value),
                Err(e) => debug!(key, error = %e, "cached value did not deserialize, recomputing"),
            }
        }

        let value = compute().await.map_err(|e| CacheError::Compute(e.into()))?;
        let encoded = serde_json::to_string(&value)?;
        self.driver.put(key, Value::String(encoded), ttl.into()).await?;
        Ok(value)
    }

    // ========================================================================
    // Locks and context
    // ========================================================================

    /// Lock handle for `key`. Does not acquire.
    pub fn lock(&self, key: &str, ttl: impl Into<Expiration>) -> Lock {
        Lock::new(Arc::clone(&self.driver), key, ttl.into())
            .with_poll_interval(self.lock_poll_interval)
    }

    /// Lock handle for a lease whose owner token is already known.
    pub fn restore_lock(&self, key: &str, owner: &str, ttl: impl Into<Expiration>) -> Lock {
        Lock::restore(Arc::clone(&self.driver), key, owner, ttl.into())
            .with_poll_interval(self.lock_poll_interval)
    }

    /// Same cache bound to another cancellation scope.
    pub async fn with_context(&self, ctx: CacheContext) -> Result<Cache, CacheError> {
        Ok(Self {
            driver: self.driver.with_context(ctx).await?,
            lock_poll_interval: self.lock_poll_interval,
        })
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("driver", &self.driver.name())
            .field("store", &self.driver.store())
            .finish()
    }
}
