//! Lock commands: lock and force-release

use std::future::Future;
use std::time::Duration;

use tracing::info;

use super::CommandOutput;
use crate::cache::{Cache, Expiration};

/// Handler for the lock commands
pub struct LockCommandHandler {
    cache: Cache,
    default_ttl_secs: u64,
}

impl LockCommandHandler {
    /// `default_ttl_secs` applies when `--ttl` is not given, 0 means no expiry
    pub fn new(cache: Cache, default_ttl_secs: u64) -> Self {
        Self {
            cache,
            default_ttl_secs,
        }
    }

    fn lease(&self, ttl: Option<u64>) -> Expiration {
        match ttl.unwrap_or(self.default_ttl_secs) {
            0 => Expiration::Never,
            secs => Expiration::from_secs(secs),
        }
    }

    /// Acquire `key` and print the owner token.
    ///
    /// Without `hold` the lock is left in place for another process to
    /// release. With `hold` it is released after the hold period or as soon
    /// as `interrupt` resolves, whichever comes first.
    pub async fn acquire<I>(
        &self,
        key: &str,
        ttl: Option<u64>,
        wait: Option<u64>,
        hold: Option<u64>,
        interrupt: I,
    ) -> CommandOutput
    where
        I: Future<Output = ()>,
    {
        let lock = self.cache.lock(key, self.lease(ttl));

        let acquired = match wait {
            Some(secs) if secs > 0 => lock.block(Duration::from_secs(secs)).await,
            _ => lock.get().await,
        };
        if !acquired {
            return CommandOutput::failed(format!("lock '{key}' is held by another owner"));
        }

        info!(key, owner = lock.owner(), "lock acquired");
        let mut output = CommandOutput::ok(lock.owner());

        if let Some(secs) = hold {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
                _ = interrupt => info!(key, "interrupted, releasing lock early"),
            }
            if lock.release().await {
                info!(key, "lock released");
            } else {
                output
                    .lines
                    .push(format!("lock '{key}' was no longer held at release"));
                output.success = false;
            }
        }

        output
    }

    pub async fn force_release(&self, key: &str) -> CommandOutput {
        let lock = self.cache.lock(key, Expiration::Never);
        if lock.force_release().await {
            CommandOutput::ok("OK")
        } else {
            CommandOutput::failed(format!("lock '{key}' could not be released"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryDriver;
    use std::sync::Arc;

    fn handler() -> LockCommandHandler {
        let cache = Cache::new(Arc::new(MemoryDriver::new("cli")))
            .with_lock_poll_interval(Duration::from_millis(5));
        LockCommandHandler::new(cache, 0)
    }

    fn never() -> std::future::Pending<()> {
        std::future::pending()
    }

    #[tokio::test]
    async fn test_acquire_prints_owner_and_keeps_lock() {
        let handler = handler();
        let out = handler.acquire("job", None, None, None, never()).await;
        assert!(out.success);
        assert_eq!(out.lines.len(), 1);
        assert!(handler.cache.has("job").await);

        let second = handler.acquire("job", None, None, None, never()).await;
        assert!(!second.success);
    }

    #[tokio::test]
    async fn test_hold_releases_afterwards() {
        let handler = handler();
        let out = handler.acquire("job", None, None, Some(0), never()).await;
        assert!(out.success);
        assert!(!handler.cache.has("job").await);
    }

    #[tokio::test]
    async fn test_interrupt_cuts_hold_short() {
        let handler = handler();
        let out = handler
            .acquire("job", None, None, Some(3600), std::future::ready(()))
            .await;
        assert!(out.success);
        assert!(!handler.cache.has("job").await);
    }

    #[tokio::test]
    async fn test_wait_gives_up_when_held() {
        let handler = handler();
        handler.cache.forever("job", "someone-else").await;
        let out = handler.acquire("job", None, Some(1), None, never()).await;
        assert!(!out.success);
    }

    #[tokio::test]
    async fn test_force_release() {
        let handler = handler();
        handler.acquire("job", Some(60), None, None, never()).await;
        assert_eq!(handler.force_release("job").await, CommandOutput::ok("OK"));
        assert!(!handler.cache.has("job").await);
    }

    #[test]
    fn test_lease_defaults() {
        let handler = handler();
        assert_eq!(handler.lease(None), Expiration::Never);
        assert_eq!(handler.lease(Some(0)), Expiration::Never);
        assert_eq!(handler.lease(Some(5)), Expiration::from_secs(5));

        let handler = LockCommandHandler::new(handler.cache.clone(), 30);
        assert_eq!(handler.lease(None), Expiration::from_secs(30));
    }
}
