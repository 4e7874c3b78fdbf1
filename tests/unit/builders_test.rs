//! Tests for pool builders

use tsdb_dispatch::builders::build_pool;
use tsdb_dispatch::config::BenchConfig;
use tsdb_dispatch::core::{DispatchError, FnExecutor, WorkItem};

#[test]
fn test_build_pool_starts_configured_lanes() {
    let cfg = BenchConfig {
        workers: 3,
        ..BenchConfig::default()
    };
    let pool = build_pool(&cfg, FnExecutor::new(|_lane: usize, _item: &WorkItem<u32>| {})).unwrap();
    assert_eq!(pool.lane_count(), 3);

    pool.submit(WorkItem::new("host_000001", 1).unwrap()).unwrap();
    pool.stop().unwrap();
    assert_eq!(pool.stats().unwrap().count, 1);
}

#[test]
fn test_build_pool_rejects_invalid_config() {
    let cfg = BenchConfig {
        workers: 0,
        ..BenchConfig::default()
    };
    let result = build_pool(&cfg, FnExecutor::new(|_lane: usize, _item: &WorkItem<u32>| {}));
    assert!(matches!(result, Err(DispatchError::InvalidConfig(_))));
}
