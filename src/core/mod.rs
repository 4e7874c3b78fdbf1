//! Dispatch engine: routing, worker lanes, pool lifecycle and latency stats.

pub mod dispatch_pool;
pub mod error;
pub mod executor;
pub mod observer;
pub mod routing;
pub mod stats;
pub mod work_item;

pub use dispatch_pool::{DispatchPool, LaneState};
pub use error::{AppResult, DispatchError};
pub use executor::{FnExecutor, QueryExecutor};
pub use observer::{DispatchObserver, NoopObserver};
pub use routing::{lane_for, route_hash};
pub use stats::StatsSummary;
pub use work_item::WorkItem;
