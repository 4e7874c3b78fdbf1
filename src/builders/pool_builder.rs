//! Builders to construct started dispatch pools from benchmark configuration.

use std::sync::Arc;

use crate::config::BenchConfig;
use crate::core::{DispatchError, DispatchObserver, DispatchPool, NoopObserver, QueryExecutor};

/// Validate `cfg`, create a pool around `executor` and start `cfg.workers` lanes.
///
/// # Errors
///
/// - `DispatchError::InvalidConfig` if `cfg` is invalid
/// - any error from [`DispatchPool::start`]
pub fn build_pool<P, E>(cfg: &BenchConfig, executor: E) -> Result<DispatchPool<P, E>, DispatchError>
where
    P: Send + Sync + 'static,
    E: QueryExecutor<P>,
{
    build_pool_with_observer(cfg, executor, Arc::new(NoopObserver))
}

/// Like [`build_pool`], reporting to `observer`.
///
/// # Errors
///
/// - `DispatchError::InvalidConfig` if `cfg` is invalid
/// - any error from [`DispatchPool::start`]
pub fn build_pool_with_observer<P, E>(
    cfg: &BenchConfig,
    executor: E,
    observer: Arc<dyn DispatchObserver>,
) -> Result<DispatchPool<P, E>, DispatchError>
where
    P: Send + Sync + 'static,
    E: QueryExecutor<P>,
{
    cfg.validate().map_err(DispatchError::InvalidConfig)?;
    let pool = DispatchPool::with_observer(cfg.dispatch.clone(), executor, observer)?;
    pool.start(cfg.workers)?;
    Ok(pool)
}
