//! Dispatch pool and benchmark harness configuration.

use std::env;

use serde::{Deserialize, Serialize};

/// Environment variable holding the database connection string.
pub const DSN_ENV_VAR: &str = "DB_DSN";

/// Default number of lanes, and of database connections.
pub const DEFAULT_WORKERS: usize = 10;

/// Default per-lane queue capacity.
pub const DEFAULT_LANE_CAPACITY: usize = 10;

const DEFAULT_STACK_SIZE: usize = 2 * 1024 * 1024;

/// Configuration of a [`DispatchPool`](crate::core::DispatchPool).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Name recorded on the pool's tracing span.
    pub name: String,
    /// Bounded capacity of each lane's queue.
    pub lane_capacity: usize,
    /// Stack size of each lane thread, in bytes.
    pub thread_stack_size: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            name: "dispatch".into(),
            lane_capacity: DEFAULT_LANE_CAPACITY,
            thread_stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl DispatchConfig {
    /// Configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pool name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the per-lane queue capacity.
    #[must_use]
    pub const fn with_lane_capacity(mut self, lane_capacity: usize) -> Self {
        self.lane_capacity = lane_capacity;
        self
    }

    /// Set the lane thread stack size.
    #[must_use]
    pub const fn with_thread_stack_size(mut self, thread_stack_size: usize) -> Self {
        self.thread_stack_size = thread_stack_size;
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.lane_capacity == 0 {
            return Err("lane_capacity must be greater than 0".into());
        }
        if self.thread_stack_size < 64 * 1024 {
            return Err("thread_stack_size must be at least 64 KiB".into());
        }
        Ok(())
    }
}

/// Configuration of one benchmark run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Number of lanes and of pooled database connections.
    pub workers: usize,
    /// Pool settings.
    pub dispatch: DispatchConfig,
    /// Database connection string; falls back to `DB_DSN`.
    pub database_url: Option<String>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            dispatch: DispatchConfig::default().with_name("tsdb-bench"),
            database_url: None,
        }
    }
}

impl BenchConfig {
    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("workers must be greater than 0".into());
        }
        self.dispatch
            .validate()
            .map_err(|e| format!("dispatch invalid: {e}"))
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a description of the parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Connection string from the config, or else from `DB_DSN`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither is set.
    pub fn resolve_database_url(&self) -> Result<String, String> {
        if let Some(url) = &self.database_url {
            return Ok(url.clone());
        }
        env::var(DSN_ENV_VAR).map_err(|_| format!("{DSN_ENV_VAR} is not set"))
    }
}
