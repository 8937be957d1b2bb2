//! Layered configuration for stash
//!
//! Sources, lowest to highest priority:
//! 1. `default.toml`
//! 2. `{environment}.toml`, where the environment comes from `STASH_APP_ENV`
//! 3. `local.toml` (not committed to version control)
//! 4. `STASH_*` environment variables, nested with `__`
//!    (`STASH_CACHE__REDIS__HOST=cache.internal`)
//!
//! `STASH_CONFIG_FILE` replaces the layered directory with a single file.

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{
    ApplicationConfig, CacheBackend, CacheConfig, LockConfig, LoggerSettings, MemoryCacheConfig,
    RedisCacheConfig, Settings,
};
