//! Reference binary: backfills a week of history on first start, then runs
//! the live feed against the structured-log sink until interrupted.

use anyhow::Context;
use datagen_core::clock::SystemClock;
use datagen_core::config::DatagenConfig;
use datagen_core::variates::entropy_rng;
use datagen_runtime::{LiveDriver, LogSink, MarkerRunHistory, TokioScheduler};
use rand::RngCore;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cfg = DatagenConfig::default();
    let driver = LiveDriver::new(
        cfg.clone(),
        Arc::new(SystemClock),
        Arc::new(TokioScheduler::new()),
        Arc::new(LogSink::new(cfg.timestamp_format.clone())),
    );

    let history = MarkerRunHistory::new(std::env::temp_dir().join("retail-datagen.run"));
    let backfilled = driver
        .run_backfill(&history)
        .context("history backfill failed")?;
    if backfilled > 0 {
        tracing::info!(events = backfilled, "history backfill delivered");
    }
    history.record_run().context("could not persist run marker")?;

    let seed = entropy_rng().next_u64();
    let handles = driver.spawn(seed).context("could not start generators")?;

    tokio::signal::ctrl_c()
        .await
        .context("signal handler failed")?;
    tracing::info!("shutting down");
    for handle in handles {
        handle.abort();
    }
    Ok(())
}
