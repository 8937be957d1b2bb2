//! Backend-agnostic caching with expiration, counters, memoization and locks.
//!
//! This module provides a unified driver contract that supports:
//! - Memory driver (in-process, lazy TTL expiration)
//! - Redis driver (distributed, network-based)
//! - Null driver (caching disabled)
//!
//! # Configuration
//!
//! Configure caching in your TOML config file:
//!
//! ```toml
//! [cache]
//! enabled = true
//! backend = "memory"  # or "redis"
//! store = "app"
//!
//! [cache.memory]
//! sweep_interval_ms = 60000
//!
//! [cache.redis]
//! host = "127.0.0.1"
//! port = 6379
//! database = 0
//! pool_size = 4
//! connection_timeout = 5
//! key_prefix = "stash"
//! tls_enabled = false
//!
//! [cache.lock]
//! poll_interval_ms = 100
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let cache = stash::cache::connect(&settings.cache).await?;
//!
//! let rooms = cache
//!     .remember("rooms:count", Duration::from_secs(60), || async {
//!         db.count_rooms().await
//!     })
//!     .await?;
//!
//! let lock = cache.lock("jobs:cleanup", Duration::from_secs(30));
//! lock.block_with(Duration::from_secs(5), || async { run_cleanup().await }).await;
//! ```

pub mod coerce;
mod context;
mod error;
mod expiration;
pub mod lock;
mod manager;
mod memory;
mod noop;
mod redis;
mod repository;
mod traits;
mod value;

pub use context::CacheContext;
pub use error::CacheError;
pub use expiration::Expiration;
pub use lock::Lock;
pub use manager::{connect, connect_with_context, get_cache, init_cache};
pub use memory::MemoryDriver;
pub use noop::NullDriver;
pub use self::redis::RedisDriver;
pub use repository::Cache;
pub use traits::Driver;
pub use value::Value;

// Re-export config types
pub use crate::config::settings::{
    CacheBackend, CacheConfig, LockConfig, MemoryCacheConfig, RedisCacheConfig,
};
