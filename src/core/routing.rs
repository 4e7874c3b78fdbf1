//! Stable key-to-lane routing.

use xxhash_rust::xxh64::xxh64;

const ROUTING_SEED: u64 = 0;

/// Deterministic 64-bit hash of a routing key (XXH64, seed 0).
#[must_use]
pub fn route_hash(routing_key: &str) -> u64 {
    xxh64(routing_key.as_bytes(), ROUTING_SEED)
}

/// Lane index for `routing_key` in a pool of `lanes` lanes.
///
/// Distinct keys may share a lane; the same key always maps to the same lane
/// for a fixed lane count.
///
/// # Panics
///
/// Panics if `lanes` is zero.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn lane_for(routing_key: &str, lanes: usize) -> usize {
    assert!(lanes > 0, "lane count must be non-zero");
    // The remainder is below `lanes`, so it fits back into usize.
    (route_hash(routing_key) % lanes as u64) as usize
}
