//! stash: a backend-agnostic cache with per-key expiration, counters,
//! memoization and owner-token locks over an in-process or redis store.

pub mod cache;
pub mod cli;
pub mod config;
pub mod logger;

pub fn pkg_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
