//! Local Cache demo
//!
//! Stores a short-lived value, reads it back before and after expiry, and
//! shows how a type mismatch is reported.

use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use local_cache::{CacheError, Config, LocalCache};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "local_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!("Configuration loaded: sweep_interval={:?}", config.sweep_interval);

    let mut cache = LocalCache::new(&config).context("failed to start local cache")?;

    cache.set("name", "张三".to_string(), 2_000);
    let name = cache.get_cloned::<String>("name")?;
    info!("name={:?}", name);

    tokio::time::sleep(Duration::from_secs(3)).await;

    match cache.get_cloned::<String>("name")? {
        Some(name) => info!("next name={}", name),
        None => info!("name has expired"),
    }

    cache.set("count", 42i32, 60_000);
    match cache.get::<String>("count") {
        Err(err @ CacheError::TypeMismatch { .. }) => warn!("{}", err),
        other => warn!("unexpected lookup result: {:?}", other),
    }

    let report = cache.sweep_now();
    info!(
        "Manual sweep reclaimed {} entries, retained {}",
        report.reclaimed, report.retained
    );
    println!("{}", serde_json::to_string_pretty(&cache.stats())?);

    cache.shutdown();
    Ok(())
}
