//! Driver trait definition.

use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::{CacheContext, CacheError, Expiration, Value};

/// Uniform contract implemented by every cache backend.
///
/// Boolean-returning operations collapse backend failures to `false`; a
/// caller cannot tell "absent" from "backend error" on those calls. Only
/// `put` and the counters report errors.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Backend name, for logging.
    fn name(&self) -> &'static str;

    /// Namespace this handle was created for.
    fn store(&self) -> &str;

    /// Cancellation scope this handle is bound to.
    fn context(&self) -> &CacheContext;

    /// Store `value` only if `key` has no live entry. Atomic on the backend.
    async fn add(&self, key: &str, value: Value, ttl: Expiration) -> bool;

    /// Unconditional upsert.
    async fn put(&self, key: &str, value: Value, ttl: Expiration) -> Result<(), CacheError>;

    /// Store without expiration.
    async fn forever(&self, key: &str, value: Value) -> bool {
        self.put(key, value, Expiration::Never).await.is_ok()
    }

    /// Live value for `key`, `None` on a miss or a backend failure.
    async fn get(&self, key: &str) -> Option<Value>;

    async fn has(&self, key: &str) -> bool;

    /// Delete `key`. True unless the backend failed; deleting a missing key
    /// still succeeds.
    async fn forget(&self, key: &str) -> bool;

    /// Delete `key` only while it still holds `expected`. Atomic on the backend.
    async fn forget_if(&self, key: &str, expected: &Value) -> bool;

    /// Remove every key the backend manages.
    async fn flush(&self) -> bool;

    /// Add `delta`, treating a missing key as 0.
    async fn increment(&self, key: &str, delta: i64) -> Result<i64, CacheError>;

    /// Subtract `delta`, treating a missing key as 0.
    async fn decrement(&self, key: &str, delta: i64) -> Result<i64, CacheError>;

    /// A handle bound to `ctx`. Network backends reconnect with the same settings.
    async fn with_context(&self, ctx: CacheContext) -> Result<Arc<dyn Driver>, CacheError>;
}
