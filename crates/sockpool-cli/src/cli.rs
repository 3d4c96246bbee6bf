//! `sockpool` - drive a TCP connection pool from the command line
//!
//! Builds a pool against `--addr`, runs concurrent checkout/return cycles
//! and prints the final pool statistics as JSON.

mod args;
mod config;
mod workload;

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use sockpool_core::TcpConnector;
use sockpool_pool::Pool;
use tracing_subscriber::EnvFilter;

use crate::args::Args;
use crate::config::{CliConfig, FileConfig};
use crate::workload::Summary;

fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let config = CliConfig::resolve(&args, file)?;

    let mut connector = TcpConnector::new(config.addr.clone());
    if let Some(timeout) = config.connect_timeout {
        connector = connector.with_connect_timeout(timeout);
    }

    tracing::info!(
        addr = %config.addr,
        min_size = config.pool.min_size(),
        max_size = config.pool.max_size(),
        "starting pool"
    );
    let pool = Pool::with_config(config.pool.clone(), connector)
        .await
        .with_context(|| format!("Failed to build pool for {}", config.addr))?;

    let started = Instant::now();
    let report = workload::run(&pool, args.workers, args.rounds).await;

    let summary = Summary {
        addr: config.addr,
        workers: args.workers,
        rounds: args.rounds,
        elapsed_ms: started.elapsed().as_millis(),
        report,
        stats: pool.stats(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
    );

    pool.close().await.context("Failed to close pool")?;
    Ok(())
}
