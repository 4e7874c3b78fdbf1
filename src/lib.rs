//! # TSDB Dispatch
//!
//! A load-generation harness that replays a stream of time-range queries
//! against a time-series database and reports per-query latency.
//!
//! ## Dispatch Engine
//!
//! A [`DispatchPool`](core::DispatchPool) owns a fixed number of worker lanes.
//! Each lane is a dedicated OS thread draining its own bounded queue, one
//! item at a time. Items are routed by hashing their routing key, so all
//! queries for the same host run on the same lane, in submission order.
//!
//! - **Per-key ordering**: same key, same lane, FIFO
//! - **Per-lane backpressure**: `submit` only blocks when the target lane is full
//! - **Drain-then-join shutdown**: `stop` runs every queued item before returning
//! - **Post-run statistics**: count, sum, min, median, mean and max latency
//!
//! ```rust,ignore
//! use tsdb_dispatch::config::DispatchConfig;
//! use tsdb_dispatch::core::{DispatchPool, FnExecutor, WorkItem};
//!
//! let executor = FnExecutor::new(|lane, item: &WorkItem<String>| {
//!     println!("lane {lane} runs {}", item.payload());
//! });
//! let pool = DispatchPool::new(DispatchConfig::new(), executor)?;
//! pool.start(10)?;
//! pool.submit(WorkItem::new("host_000008", "query".to_string())?)?;
//! pool.stop()?;
//! println!("{}", pool.stats()?);
//! ```
//!
//! ## Collaborators
//!
//! The [`infra`] module supplies a CSV source of
//! [`QueryParams`](infra::QueryParams) and, with the `postgres` feature, a
//! TimescaleDB [`Querier`](infra::Querier) implementing
//! [`QueryExecutor`](core::QueryExecutor).

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Dispatch pool, routing, lanes and latency statistics.
pub mod core;
/// Configuration models for pools and benchmark runs.
pub mod config;
/// Builders to construct dispatch pools from configuration.
pub mod builders;
/// Input sources and query executors.
pub mod infra;
/// Shared utilities.
pub mod util;
