//! Mutual exclusion built on a driver's atomic `add`.
//!
//! A [`Lock`] is only a handle. It keeps no record of whether it is held:
//! acquiring is an `add` of the lock's owner token, releasing is an atomic
//! compare-and-delete against that token. A lease that expired and was taken
//! by someone else can therefore never be released by the previous holder.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use rand::Rng;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::cache::{Driver, Expiration, Value};

/// Delay between acquisition attempts in [`Lock::block`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

const MAX_JITTER_MS: u64 = 10;

#[derive(Clone)]
pub struct Lock {
    driver: Arc<dyn Driver>,
    key: String,
    owner: String,
    ttl: Expiration,
    poll_interval: Duration,
}

impl Lock {
    /// New handle with a fresh owner token. Does not acquire.
    pub fn new(driver: Arc<dyn Driver>, key: impl Into<String>, ttl: Expiration) -> Self {
        Self::restore(driver, key, Uuid::new_v4().to_string(), ttl)
    }

    /// Handle for a lease acquired elsewhere, identified by its owner token.
    pub fn restore(
        driver: Arc<dyn Driver>,
        key: impl Into<String>,
        owner: impl Into<String>,
        ttl: Expiration,
    ) -> Self {
        Self {
            driver,
            key: key.into(),
            owner: owner.into(),
            ttl,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Lease token proving ownership.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn ttl(&self) -> Expiration {
        self.ttl
    }

    fn token(&self) -> Value {
        Value::String(self.owner.clone())
    }

    /// Try to acquire once.
    pub async fn get(&self) -> bool {
        let acquired = self.driver.add(&self.key, self.token(), self.ttl).await;
        debug!(key = %self.key, owner = %self.owner, acquired, "lock attempt");
        acquired
    }

    /// Acquire once and, if that worked, run `f` and release.
    ///
    /// Returns `None` when the lock was not acquired. The lock is released
    /// even if `f` panics; the panic is resumed afterwards.
    pub async fn get_with<F, Fut, T>(&self, f: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if !self.get().await {
            return None;
        }
        Some(self.run_and_release(f).await)
    }

    /// Keep trying to acquire until `timeout` elapses or the driver's context
    /// is done. A timeout too large to represent waits without a deadline.
    pub async fn block(&self, timeout: Duration) -> bool {
        let ctx = self.driver.context();
        let deadline = Instant::now().checked_add(timeout);

        loop {
            if ctx.is_done() {
                debug!(key = %self.key, "lock wait abandoned: context done");
                return false;
            }
            if self.get().await {
                return true;
            }

            let mut pause = self.next_pause();
            if let Some(deadline) = deadline {
                let now = Instant::now();
                if now >= deadline {
                    debug!(key = %self.key, timeout_ms = timeout.as_millis() as u64, "lock wait timed out");
                    return false;
                }
                pause = pause.min(deadline - now);
            }
            tokio::select! {
                _ = ctx.done() => {
                    debug!(key = %self.key, "lock wait abandoned: context done");
                    return false;
                }
                _ = tokio::time::sleep(pause) => {}
            }
        }
    }

    /// [`Lock::block`], then run `f` and release.
    pub async fn block_with<F, Fut, T>(&self, timeout: Duration, f: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if !self.block(timeout).await {
            return None;
        }
        Some(self.run_and_release(f).await)
    }

    /// Release only if this handle's token still owns the lock.
    pub async fn release(&self) -> bool {
        let released = self.driver.forget_if(&self.key, &self.token()).await;
        debug!(key = %self.key, owner = %self.owner, released, "lock release");
        released
    }

    /// Delete the lock regardless of who holds it.
    pub async fn force_release(&self) -> bool {
        self.driver.forget(&self.key).await
    }

    async fn run_and_release<F, Fut, T>(&self, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let outcome = AssertUnwindSafe(async move { f().await })
            .catch_unwind()
            .await;
        self.release().await;

        match outcome {
            Ok(value) => value,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    fn next_pause(&self) -> Duration {
        let jitter = rand::rng().random_range(0..=MAX_JITTER_MS);
        self.poll_interval + Duration::from_millis(jitter)
    }
}

impl std::fmt::Debug for Lock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lock")
            .field("driver", &self.driver.name())
            .field("key", &self.key)
            .field("owner", &self.owner)
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheContext, MemoryDriver};

    fn driver() -> Arc<dyn Driver> {
        Arc::new(MemoryDriver::new("locks"))
    }

    async fn failing_callback() -> u32 {
        panic!("callback failed")
    }

    #[tokio::test]
    async fn test_lock_round_trip() {
        let d = driver();
        let a = Lock::new(d.clone(), "job", Expiration::from_secs(10));
        let b = Lock::new(d.clone(), "job", Expiration::from_secs(10));

        assert!(a.get().await);
        assert!(!b.get().await);
        assert!(!a.get().await);

        assert!(a.release().await);
        assert!(b.get().await);
    }

    #[tokio::test]
    async fn test_release_requires_ownership() {
        let d = driver();
        let a = Lock::new(d.clone(), "job", Expiration::Never);
        let b = Lock::new(d.clone(), "job", Expiration::Never);

        assert!(a.get().await);
        assert!(!b.release().await);
        assert!(d.has("job").await);
    }

    #[tokio::test]
    async fn test_expired_lease_cannot_be_released_by_old_holder() {
        let d = driver();
        let a = Lock::new(d.clone(), "job", Expiration::from_millis(30));
        let b = Lock::new(d.clone(), "job", Expiration::from_secs(10));

        assert!(a.get().await);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(b.get().await);

        assert!(!a.release().await);
        assert_eq!(d.get("job").await, Some(Value::String(b.owner().to_string())));
    }

    #[tokio::test]
    async fn test_block_with_unbounded_timeout() {
        let d = driver();
        let lock = Lock::new(d.clone(), "job", Expiration::Never);
        assert!(lock.block(Duration::MAX).await);

        let other = Lock::new(d.clone(), "job", Expiration::Never)
            .with_poll_interval(Duration::from_millis(5));
        let releaser = {
            let lock = lock.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(30)).await;
                lock.release().await
            })
        };
        assert!(other.block(Duration::MAX).await);
        assert!(releaser.await.unwrap());
    }

    #[tokio::test]
    async fn test_force_release() {
        let d = driver();
        let a = Lock::new(d.clone(), "job", Expiration::Never);
        let b = Lock::new(d.clone(), "job", Expiration::Never);

        assert!(b.force_release().await);
        assert!(a.get().await);
        assert!(b.force_release().await);
        assert!(b.get().await);
    }

    #[tokio::test]
    async fn test_restored_handle_can_release() {
        let d = driver();
        let a = Lock::new(d.clone(), "job", Expiration::Never);
        assert!(a.get().await);

        let restored = Lock::restore(d.clone(), "job", a.owner(), Expiration::Never);
        assert!(restored.release().await);
        assert!(!d.has("job").await);
    }

    #[tokio::test]
    async fn test_get_with_runs_callback_and_releases() {
        let d = driver();
        let lock = Lock::new(d.clone(), "job", Expiration::Never);

        let out = lock.get_with(|| async { 42 }).await;
        assert_eq!(out, Some(42));
        assert!(!d.has("job").await);

        let holder = Lock::new(d.clone(), "job", Expiration::Never);
        assert!(holder.get().await);
        assert_eq!(lock.get_with(|| async { 1 }).await, None);
    }

    #[tokio::test]
    async fn test_get_with_releases_on_panic() {
        let d = driver();
        let lock = Lock::new(d.clone(), "job", Expiration::Never);

        let task_lock = lock.clone();
        let joined = tokio::spawn(async move {
            task_lock.get_with(failing_callback).await
        })
        .await;

        assert!(joined.is_err());
        assert!(!d.has("job").await);
        assert!(lock.get().await);
    }

    #[tokio::test]
    async fn test_block_waits_for_release() {
        let d = driver();
        let holder = Lock::new(d.clone(), "job", Expiration::Never);
        let waiter = Lock::new(d.clone(), "job", Expiration::Never)
            .with_poll_interval(Duration::from_millis(10));
        assert!(holder.get().await);

        let releaser = holder.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            releaser.release().await;
        });

        assert!(waiter.block(Duration::from_secs(2)).await);
        assert_eq!(d.get("job").await, Some(Value::String(waiter.owner().to_string())));
    }

    #[tokio::test]
    async fn test_block_times_out() {
        let d = driver();
        let holder = Lock::new(d.clone(), "job", Expiration::Never);
        let waiter = Lock::new(d.clone(), "job", Expiration::Never)
            .with_poll_interval(Duration::from_millis(10));
        assert!(holder.get().await);

        let started = std::time::Instant::now();
        assert!(!waiter.block(Duration::from_millis(80)).await);
        assert!(started.elapsed() >= Duration::from_millis(80));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_block_stops_when_context_cancelled() {
        let base = MemoryDriver::new("locks");
        let ctx = CacheContext::new();
        let d = base.with_context(ctx.clone()).await.unwrap();

        let holder = Lock::new(d.clone(), "job", Expiration::Never);
        assert!(holder.get().await);

        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let waiter = Lock::new(d.clone(), "job", Expiration::Never);
        let started = std::time::Instant::now();
        assert!(!waiter.block(Duration::from_secs(30)).await);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_block_with_runs_callback() {
        let d = driver();
        let lock = Lock::new(d.clone(), "job", Expiration::from_secs(5));
        let out = lock
            .block_with(Duration::from_millis(100), || async { "done" })
            .await;
        assert_eq!(out, Some("done"));
        assert!(!d.has("job").await);
    }
}
