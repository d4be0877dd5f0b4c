/// Example listing SushiMaker servings and following pending servings live
///
/// This example shows how to:
/// 1. Build a client, optionally pointing the maker subgraph at a custom endpoint
/// 2. Fetch servings within a block range
/// 3. Read maker totals as of a timestamp (resolved to a block first)
/// 4. Subscribe to pending-servings updates for a while
///
/// Run with:
/// ```bash
/// MIN_BLOCK=11000000 \
/// MAX_BLOCK=11100000 \
/// TIMESTAMP=1600000000 \
/// MAKER_ENDPOINT=https://api.thegraph.com/subgraphs/name/sushiswap/sushi-maker \
/// WATCH_SECS=30 \
/// cargo run --example maker_servings
/// ```
use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::StreamExt;
use sushidata::{
    PinOptions, ServingsOptions, Subgraph, SushiData, SushiDataConfigBuilder, UnixTimestamp,
};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("Failed to parse {name}")),
        Err(_) => Ok(default),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    dotenvy::dotenv().ok();

    let min_block: u64 = env_or("MIN_BLOCK", 11_000_000)?;
    let max_block: u64 = env_or("MAX_BLOCK", 11_100_000)?;
    let timestamp: i64 = env_or("TIMESTAMP", 1_600_000_000)?;
    let watch_secs: u64 = env_or("WATCH_SECS", 30)?;

    let mut builder = SushiDataConfigBuilder::with_defaults();
    if let Ok(endpoint) = env::var("MAKER_ENDPOINT") {
        builder = builder.endpoint(
            Subgraph::Maker,
            endpoint.parse().context("Failed to parse MAKER_ENDPOINT")?,
        );
    }
    let client = SushiData::new(builder.build())?;
    let maker = client.maker();

    info!(min_block, max_block, "Fetching servings");
    let servings = maker
        .servings(ServingsOptions::blocks(min_block, max_block))
        .await?;
    let total: f64 = servings.iter().map(|s| s.sushi_served).sum();
    println!("\n=== Servings in blocks {min_block}..={max_block} ===");
    println!("Count:        {}", servings.len());
    println!("SUSHI served: {total:.4}");
    for serving in servings.iter().take(5) {
        println!(
            "  block {} {} {:.4} SUSHI via {}",
            serving.block, serving.date, serving.sushi_served, serving.pair
        );
    }

    match maker
        .info(PinOptions::at_timestamp(UnixTimestamp(timestamp)))
        .await?
    {
        Some(info) => println!(
            "\nMaker {} had served {:.4} SUSHI by {timestamp}",
            info.address, info.sushi_served
        ),
        None => println!("\nNo maker record at {timestamp}"),
    }

    info!(watch_secs, "Watching pending servings");
    let mut updates = maker.observe_pending_servings()?.subscribe();
    let deadline = tokio::time::sleep(Duration::from_secs(watch_secs));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            update = updates.next() => match update {
                Some(Ok(pending)) => {
                    let value: f64 = pending.iter().map(|p| p.value_usd).sum();
                    println!("{} pending positions worth ${value:.2}", pending.len());
                }
                Some(Err(e)) => warn!(error = %e, "Pending servings update failed"),
                None => break,
            }
        }
    }
    updates.dispose();

    Ok(())
}
