//! CLI argument parsing with clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::cache::Value;

/// Inspect and manage a stash cache store
#[derive(Parser, Debug)]
#[command(name = "stash")]
#[command(version = crate::pkg_version())]
#[command(about = "Inspect and manage a stash cache store")]
#[command(long_about = "
stash talks to the cache backend described by the loaded configuration.
With the memory backend every invocation starts from an empty store, so
the commands are mostly useful against redis.

EXAMPLES:
    # Store a value for five minutes
    stash put session:42 alice --ttl 300

    # Read it back
    stash get session:42

    # Bump a counter by 5
    stash incr visits 5

    # Take a lock for 30 seconds, waiting up to 10 seconds for it
    stash lock jobs:cleanup --ttl 30 --wait 10 --hold 5

    # Use a specific configuration file and backend
    stash --config /etc/stash/production.toml --backend redis has session:42
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path, replacing the layered config directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    #[arg(short, long, value_enum, global = true)]
    pub env: Option<Environment>,

    /// Override the configured cache backend
    #[arg(long, value_enum, global = true)]
    pub backend: Option<Backend>,

    /// Override the configured store name
    #[arg(long, value_name = "NAME", global = true)]
    pub store: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the value stored under KEY
    Get { key: String },

    /// Store VALUE under KEY, overwriting any existing entry
    Put {
        key: String,
        value: String,
        /// Seconds until the entry expires, 0 expires it immediately
        #[arg(long, value_name = "SECS")]
        ttl: Option<u64>,
        /// How VALUE is interpreted before it is stored
        #[arg(long = "type", value_enum, default_value_t = ValueKind::String)]
        kind: ValueKind,
    },

    /// Store VALUE under KEY only if KEY is absent
    Add {
        key: String,
        value: String,
        #[arg(long, value_name = "SECS")]
        ttl: Option<u64>,
        #[arg(long = "type", value_enum, default_value_t = ValueKind::String)]
        kind: ValueKind,
    },

    /// Remove KEY
    Forget { key: String },

    /// Exit successfully if KEY is present
    Has { key: String },

    /// Add BY (default 1) to the integer under KEY
    Incr {
        key: String,
        #[arg(default_value_t = 1, allow_negative_numbers = true)]
        by: i64,
    },

    /// Subtract BY (default 1) from the integer under KEY
    Decr {
        key: String,
        #[arg(default_value_t = 1, allow_negative_numbers = true)]
        by: i64,
    },

    /// Print and remove the value under KEY
    Pull { key: String },

    /// Remove every entry from the backend
    ///
    /// On redis this issues FLUSHALL and affects the whole database, not
    /// just this store. Pass --store-only to delete only this store's keys.
    Flush {
        /// Confirm the flush
        #[arg(long)]
        yes: bool,
        /// Only delete keys under the configured prefix and store (redis)
        #[arg(long)]
        store_only: bool,
    },

    /// Acquire the lock named KEY and print its owner token
    Lock {
        key: String,
        /// Lease length in seconds, 0 for no expiry
        #[arg(long, value_name = "SECS")]
        ttl: Option<u64>,
        /// Keep retrying for up to SECS seconds
        #[arg(long, value_name = "SECS")]
        wait: Option<u64>,
        /// Hold the lock for SECS seconds (or until Ctrl-C), then release it
        #[arg(long, value_name = "SECS")]
        hold: Option<u64>,
    },

    /// Release the lock named KEY regardless of owner
    ForceRelease { key: String },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Redis,
}

/// Interpretation of a value given on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Int,
    Float,
    Bool,
}

impl ValueKind {
    /// Convert raw text into a [`Value`] of this kind
    pub fn parse(self, raw: &str) -> Result<Value, String> {
        match self {
            ValueKind::String => Ok(Value::from(raw)),
            ValueKind::Int => raw
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| format!("'{raw}' is not an integer: {e}")),
            ValueKind::Float => raw
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| format!("'{raw}' is not a number: {e}")),
            ValueKind::Bool => crate::cache::coerce::parse_bool(raw)
                .map(Value::Bool)
                .ok_or_else(|| format!("'{raw}' is not a boolean, use 1/0/true/false")),
        }
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}

impl From<Backend> for crate::config::CacheBackend {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Memory => crate::config::CacheBackend::Memory,
            Backend::Redis => crate::config::CacheBackend::Redis,
        }
    }
}
