//! Key/value commands: get, put, add, forget, has, incr, decr, pull, flush

use std::time::Duration;

use anyhow::{Context, bail};
use tracing::warn;

use super::CommandOutput;
use crate::cache::{Cache, Expiration, Value};
use crate::cli::parser::ValueKind;

/// Handler for commands that operate on single keys or the whole store
pub struct KeyCommandHandler {
    cache: Cache,
}

fn ttl_from_secs(ttl: Option<u64>) -> Expiration {
    ttl.map(Duration::from_secs).into()
}

impl KeyCommandHandler {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    /// A miss prints nothing and fails
    pub async fn get(&self, key: &str) -> CommandOutput {
        match self.cache.get(key).await {
            Some(value) => CommandOutput::ok(value.to_string()),
            None => CommandOutput::silent(false),
        }
    }

    pub async fn put(
        &self,
        key: &str,
        raw: &str,
        kind: ValueKind,
        ttl: Option<u64>,
    ) -> anyhow::Result<CommandOutput> {
        let value = parse_value(raw, kind)?;
        self.cache
            .put(key, value, ttl_from_secs(ttl))
            .await
            .with_context(|| format!("failed to store '{key}'"))?;
        Ok(CommandOutput::ok("OK"))
    }

    /// Fails when the key is already present
    pub async fn add(
        &self,
        key: &str,
        raw: &str,
        kind: ValueKind,
        ttl: Option<u64>,
    ) -> anyhow::Result<CommandOutput> {
        let value = parse_value(raw, kind)?;
        if self.cache.add(key, value, ttl_from_secs(ttl)).await {
            Ok(CommandOutput::ok("OK"))
        } else {
            Ok(CommandOutput::failed(format!("'{key}' was not added")))
        }
    }

    pub async fn forget(&self, key: &str) -> CommandOutput {
        CommandOutput::silent(self.cache.forget(key).await)
    }

    pub async fn has(&self, key: &str) -> CommandOutput {
        if self.cache.has(key).await {
            CommandOutput::ok("true")
        } else {
            CommandOutput::failed("false")
        }
    }

    /// Negative deltas are allowed and move the counter the other way
    pub async fn increment(&self, key: &str, by: i64) -> anyhow::Result<CommandOutput> {
        let value = self
            .cache
            .increment_by(key, by)
            .await
            .with_context(|| format!("failed to increment '{key}'"))?;
        Ok(CommandOutput::ok(value.to_string()))
    }

    pub async fn decrement(&self, key: &str, by: i64) -> anyhow::Result<CommandOutput> {
        let value = self
            .cache
            .decrement_by(key, by)
            .await
            .with_context(|| format!("failed to decrement '{key}'"))?;
        Ok(CommandOutput::ok(value.to_string()))
    }

    pub async fn pull(&self, key: &str) -> CommandOutput {
        match self.cache.pull(key).await {
            Some(value) => CommandOutput::ok(value.to_string()),
            None => CommandOutput::silent(false),
        }
    }

    /// Flush the whole backend. On redis this is FLUSHALL.
    pub async fn flush(&self, confirmed: bool) -> anyhow::Result<CommandOutput> {
        if !confirmed {
            bail!("refusing to flush without --yes");
        }

        if self.cache.driver().name() == "redis" {
            warn!("flushing the entire redis database");
        }
        if self.cache.flush().await {
            Ok(CommandOutput::ok("OK"))
        } else {
            Ok(CommandOutput::failed("flush failed"))
        }
    }
}

fn parse_value(raw: &str, kind: ValueKind) -> anyhow::Result<Value> {
    kind.parse(raw).map_err(anyhow::Error::msg)
}
