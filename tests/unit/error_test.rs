//! Tests for error types

use tsdb_dispatch::core::DispatchError;

#[test]
fn test_invalid_lane_count_error() {
    let err = DispatchError::InvalidLaneCount(0);
    assert_eq!(format!("{}", err), "lane count must be at least 1, got 0");
}

#[test]
fn test_lifecycle_errors() {
    assert_eq!(DispatchError::AlreadyStarted.to_string(), "pool already started");
    assert_eq!(DispatchError::NotStarted.to_string(), "pool not started");
    assert_eq!(DispatchError::AlreadyStopped.to_string(), "pool already stopped");
    assert_eq!(
        DispatchError::NotStopped.to_string(),
        "pool not stopped; stats are only available after stop"
    );
}

#[test]
fn test_lane_errors() {
    assert_eq!(DispatchError::LaneDisconnected(3).to_string(), "lane 3 is disconnected");
    assert_eq!(DispatchError::LanePanicked(1).to_string(), "lane 1 panicked");

    let err = DispatchError::LaneSpawn {
        lane: 2,
        source: std::io::Error::new(std::io::ErrorKind::Other, "out of threads"),
    };
    assert_eq!(err.to_string(), "failed to spawn lane 2: out of threads");
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_invalid_config_error() {
    let err = DispatchError::InvalidConfig("lane_capacity must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: lane_capacity must be greater than 0"
    );
}
