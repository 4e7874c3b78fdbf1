//! Configuration models for the dispatch pool and benchmark runs.

pub mod pool;

pub use pool::{BenchConfig, DispatchConfig, DEFAULT_LANE_CAPACITY, DEFAULT_WORKERS, DSN_ENV_VAR};
