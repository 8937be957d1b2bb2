//! Null driver.
//!
//! Used when caching is disabled. Nothing is ever stored.

use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::{CacheContext, CacheError, Driver, Expiration, Value};

/// A driver that doesn't store anything.
///
/// Used when `cache.enabled = false` in configuration. Reads always miss,
/// `add` never wins, and counters report the delta without keeping it.
#[derive(Default)]
pub struct NullDriver {
    store: String,
    ctx: CacheContext,
}

impl NullDriver {
    pub fn new(store: impl Into<String>) -> Self {
        Self {
            store: store.into(),
            ctx: CacheContext::new(),
        }
    }
}

#[async_trait]
impl Driver for NullDriver {
    fn name(&self) -> &'static str {
        "null"
    }

    fn store(&self) -> &str {
        &self.store
    }

    fn context(&self) -> &CacheContext {
        &self.ctx
    }

    async fn add(&self, _key: &str, _value: Value, _ttl: Expiration) -> bool {
        false
    }

    async fn put(&self, _key: &str, _value: Value, _ttl: Expiration) -> Result<(), CacheError> {
        Ok(())
    }

    async fn get(&self, _key: &str) -> Option<Value> {
        None
    }

    async fn has(&self, _key: &str) -> bool {
        false
    }

    async fn forget(&self, _key: &str) -> bool {
        true
    }

    async fn forget_if(&self, _key: &str, _expected: &Value) -> bool {
        false
    }

    async fn flush(&self) -> bool {
        true
    }

    async fn increment(&self, _key: &str, delta: i64) -> Result<i64, CacheError> {
        Ok(delta)
    }

    async fn decrement(&self, _key: &str, delta: i64) -> Result<i64, CacheError> {
        Ok(delta.wrapping_neg())
    }

    async fn with_context(&self, ctx: CacheContext) -> Result<Arc<dyn Driver>, CacheError> {
        Ok(Arc::new(Self {
            store: self.store.clone(),
            ctx,
        }))
    }
}
