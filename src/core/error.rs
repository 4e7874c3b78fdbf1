//! Error types for dispatch pool operations.

use thiserror::Error;

/// Errors produced by the dispatch pool lifecycle.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// `start` was called with zero lanes.
    #[error("lane count must be at least 1, got {0}")]
    InvalidLaneCount(usize),
    /// `start` was called on a pool that has already been started.
    #[error("pool already started")]
    AlreadyStarted,
    /// The operation requires a started pool.
    #[error("pool not started")]
    NotStarted,
    /// `stop` was called on a pool that has already been stopped.
    #[error("pool already stopped")]
    AlreadyStopped,
    /// Statistics were requested before the pool was stopped.
    #[error("pool not stopped; stats are only available after stop")]
    NotStopped,
    /// A work item was created with an empty routing key.
    #[error("routing key must not be empty")]
    EmptyRoutingKey,
    /// The lane's queue is no longer accepting items.
    #[error("lane {0} is disconnected")]
    LaneDisconnected(usize),
    /// A lane thread or its runtime could not be created.
    #[error("failed to spawn lane {lane}: {source}")]
    LaneSpawn {
        /// Index of the lane that failed to start.
        lane: usize,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
    /// A lane thread panicked; its samples were lost.
    #[error("lane {0} panicked")]
    LanePanicked(usize),
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
