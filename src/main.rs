//! `tsdb-bench`: replay CSV query parameters against TimescaleDB and print
//! latency statistics.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use tsdb_dispatch::builders::build_pool;
use tsdb_dispatch::config::BenchConfig;
use tsdb_dispatch::core::AppResult;
use tsdb_dispatch::infra::{replay_params, replay_params_file, Querier};
use tsdb_dispatch::util::init_tracing;

#[derive(Parser, Debug)]
#[command(author, version, about = "Replay time-range queries against TimescaleDB and report latency")]
struct Args {
    /// Path to CSV file with input query params; reads stdin when absent
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Number of workers sending queries in parallel [default: 10]
    #[arg(long)]
    workers: Option<usize>,

    /// JSON benchmark configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let _ = dotenvy::dotenv();
    init_tracing();
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            BenchConfig::from_json_str(&raw).map_err(anyhow::Error::msg)?
        }
        None => BenchConfig::default(),
    };
    if let Some(workers) = args.workers {
        cfg.workers = workers;
    }
    cfg.validate().map_err(anyhow::Error::msg)?;

    let dsn = cfg.resolve_database_url().map_err(anyhow::Error::msg)?;
    let querier = Querier::connect(&dsn, cfg.workers)
        .await
        .context("connecting to database")?;

    let pool = Arc::new(build_pool(&cfg, querier.clone())?);
    info!(workers = cfg.workers, "benchmark started");

    // CSV reading and submission block on backpressure; keep them off the
    // runtime that drives the database connections. The pool is stopped on
    // every path out of the replay.
    let producer = Arc::clone(&pool);
    let csv = args.csv;
    let replayed = tokio::task::spawn_blocking(move || match csv {
        Some(path) => replay_params_file(producer.as_ref(), &path),
        None => {
            println!("Awaiting CSV input from stdin:");
            replay_params(producer.as_ref(), io::stdin().lock())
        }
    })
    .await;

    let outcome = match replayed {
        Ok(Ok(submitted)) => {
            info!(submitted, "input exhausted, lanes drained");
            pool.stats().map_err(anyhow::Error::from)
        }
        Ok(Err(err)) => Err(err.into()),
        Err(err) => Err(err.into()),
    };

    querier.close().await;
    let stats = outcome?;
    println!("{stats}");
    Ok(())
}
