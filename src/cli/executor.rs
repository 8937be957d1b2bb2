//! Command executor for dispatching CLI commands

use anyhow::{Context, bail};

use super::handlers::{CommandOutput, KeyCommandHandler, LockCommandHandler};
use super::parser::{Cli, Commands};
use crate::cache::{CacheContext, RedisDriver, connect_with_context};
use crate::config::{CacheBackend, Settings};

/// Connect to the configured backend and run the parsed command
pub async fn execute_command(cli: &Cli, settings: Settings) -> anyhow::Result<CommandOutput> {
    let ctx = CacheContext::new();

    // Only the redis driver can scope a flush to one store.
    if let Commands::Flush {
        yes,
        store_only: true,
    } = &cli.command
    {
        return clear_store(&settings, ctx, *yes).await;
    }

    let cache = connect_with_context(&settings.cache, ctx.clone())
        .await
        .context("failed to connect to cache backend")?;

    let keys = KeyCommandHandler::new(cache.clone());
    let output = match &cli.command {
        Commands::Get { key } => keys.get(key).await,
        Commands::Put {
            key,
            value,
            ttl,
            kind,
        } => keys.put(key, value, *kind, *ttl).await?,
        Commands::Add {
            key,
            value,
            ttl,
            kind,
        } => keys.add(key, value, *kind, *ttl).await?,
        Commands::Forget { key } => keys.forget(key).await,
        Commands::Has { key } => keys.has(key).await,
        Commands::Incr { key, by } => keys.increment(key, *by).await?,
        Commands::Decr { key, by } => keys.decrement(key, *by).await?,
        Commands::Pull { key } => keys.pull(key).await,
        Commands::Flush { yes, .. } => keys.flush(*yes).await?,
        Commands::Lock {
            key,
            ttl,
            wait,
            hold,
        } => {
            let handler = LockCommandHandler::new(cache, settings.cache.lock.default_ttl_secs);
            let interrupt = async {
                // If the signal handler cannot be installed, only the hold timer ends the wait
                if tokio::signal::ctrl_c().await.is_err() {
                    std::future::pending::<()>().await;
                }
            };
            handler.acquire(key, *ttl, *wait, *hold, interrupt).await
        }
        Commands::ForceRelease { key } => {
            LockCommandHandler::new(cache, settings.cache.lock.default_ttl_secs)
                .force_release(key)
                .await
        }
    };

    // Stops the memory driver's sweeper
    ctx.cancel();
    Ok(output)
}

async fn clear_store(
    settings: &Settings,
    ctx: CacheContext,
    confirmed: bool,
) -> anyhow::Result<CommandOutput> {
    if !confirmed {
        bail!("refusing to flush without --yes");
    }
    if !settings.cache.enabled || settings.cache.backend != CacheBackend::Redis {
        bail!("--store-only is only supported by the redis backend");
    }

    let driver = RedisDriver::new(ctx, &settings.cache.redis, &settings.cache.store)
        .await
        .context("failed to connect to redis")?;
    let removed = driver.clear_store().await.context("failed to clear store")?;
    Ok(CommandOutput::ok(format!("removed {removed} keys")))
}
