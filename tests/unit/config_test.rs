//! Tests for configuration validation

use tsdb_dispatch::config::{BenchConfig, DispatchConfig, DEFAULT_LANE_CAPACITY, DEFAULT_WORKERS};

#[test]
fn test_dispatch_config_defaults() {
    let cfg = DispatchConfig::new();
    assert_eq!(cfg.lane_capacity, DEFAULT_LANE_CAPACITY);
    assert_eq!(cfg.lane_capacity, 10);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_dispatch_config_invalid_lane_capacity() {
    let cfg = DispatchConfig::new().with_lane_capacity(0);
    assert!(cfg.validate().is_err());
}

#[test]
fn test_dispatch_config_invalid_stack_size() {
    let cfg = DispatchConfig::new().with_thread_stack_size(1024);
    assert!(cfg.validate().is_err());
}

#[test]
fn test_bench_config_defaults() {
    let cfg = BenchConfig::default();
    assert_eq!(cfg.workers, DEFAULT_WORKERS);
    assert_eq!(cfg.dispatch.name, "tsdb-bench");
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_bench_config_invalid_workers() {
    let cfg = BenchConfig {
        workers: 0,
        ..BenchConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_bench_config_from_json() {
    let json = r#"{
        "workers": 4,
        "dispatch": {
            "name": "nightly",
            "lane_capacity": 32
        },
        "database_url": "postgres://localhost/tsdb"
    }"#;

    let cfg = BenchConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.workers, 4);
    assert_eq!(cfg.dispatch.name, "nightly");
    assert_eq!(cfg.dispatch.lane_capacity, 32);
    assert_eq!(cfg.dispatch.thread_stack_size, DispatchConfig::default().thread_stack_size);
    assert_eq!(
        cfg.resolve_database_url().unwrap(),
        "postgres://localhost/tsdb"
    );
}

#[test]
fn test_bench_config_from_json_partial() {
    let cfg = BenchConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, BenchConfig::default());
}

#[test]
fn test_bench_config_from_json_invalid() {
    assert!(BenchConfig::from_json_str(r#"{"workers": 0}"#).is_err());
    assert!(BenchConfig::from_json_str("not json").is_err());
}
