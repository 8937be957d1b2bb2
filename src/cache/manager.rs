//! Backend selection and the process-wide cache instance.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;
use tracing::info;

use crate::cache::memory::MemoryDriver;
use crate::cache::noop::NullDriver;
use crate::cache::redis::RedisDriver;
use crate::cache::{Cache, CacheContext, CacheError, Driver};
use crate::config::settings::{CacheBackend, CacheConfig};

/// Global cache instance.
static CACHE: OnceCell<Cache> = OnceCell::const_new();

/// Initialize the global cache.
///
/// This should be called once during application startup.
/// Subsequent calls will return the existing instance.
pub async fn init_cache(config: &CacheConfig) -> Result<&'static Cache, CacheError> {
    CACHE.get_or_try_init(|| async { connect(config).await }).await
}

/// Get the global cache.
///
/// Returns `None` if the cache has not been initialized.
pub fn get_cache() -> Option<&'static Cache> {
    CACHE.get()
}

/// Build a cache for the configured backend.
///
/// If caching is disabled, the null driver is used. A memory backend's
/// sweeper runs until the context is cancelled or the returned cache and all
/// its clones are dropped.
pub async fn connect(config: &CacheConfig) -> Result<Cache, CacheError> {
    connect_with_context(config, CacheContext::new()).await
}

pub async fn connect_with_context(
    config: &CacheConfig,
    ctx: CacheContext,
) -> Result<Cache, CacheError> {
    let driver: Arc<dyn Driver> = if !config.enabled {
        Arc::new(NullDriver::new(config.store.as_str()))
    } else {
        match config.backend {
            CacheBackend::Memory => {
                let driver = MemoryDriver::new_with_context(config.store.as_str(), ctx);
                if config.memory.sweep_interval_ms > 0 {
                    driver.spawn_sweeper(Duration::from_millis(config.memory.sweep_interval_ms));
                }
                Arc::new(driver)
            }
            CacheBackend::Redis => {
                Arc::new(RedisDriver::new(ctx, &config.redis, &config.store).await?)
            }
        }
    };

    info!(
        driver = driver.name(),
        store = %config.store,
        "Cache initialized"
    );

    Ok(Cache::new(driver)
        .with_lock_poll_interval(Duration::from_millis(config.lock.poll_interval_ms)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Value;

    #[tokio::test]
    async fn test_disabled_cache_uses_null_driver() {
        let config = CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        };
        let cache = connect(&config).await.unwrap();
        assert_eq!(cache.driver().name(), "null");
        cache.forever("k", 1).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_memory_backend() {
        let mut config = CacheConfig::default();
        config.enabled = true;
        config.backend = CacheBackend::Memory;
        config.store = "unit".to_string();
        config.memory.sweep_interval_ms = 10;

        let ctx = CacheContext::new();
        let cache = connect_with_context(&config, ctx.clone()).await.unwrap();
        assert_eq!(cache.driver().name(), "memory");
        assert_eq!(cache.driver().store(), "unit");

        cache.forever("k", 1).await;
        assert_eq!(cache.get("k").await, Some(Value::Int(1)));
        ctx.cancel();
    }

    #[tokio::test]
    async fn test_global_cache_initializes_once() {
        let config = CacheConfig {
            enabled: true,
            ..CacheConfig::default()
        };
        let first = init_cache(&config).await.unwrap();
        let second = init_cache(&config).await.unwrap();
        assert!(std::ptr::eq(first, second));
        assert!(get_cache().is_some());
    }
}
