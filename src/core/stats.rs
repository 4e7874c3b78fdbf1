//! Post-run latency aggregation.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Summary of all per-query durations from one run.
///
/// Computed once after the pool has drained. With no samples every duration
/// field is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSummary {
    /// Wall-clock time between pool start and stop.
    pub total_wall_time: Duration,
    /// Number of executed items.
    pub count: usize,
    /// Sum of every item's duration.
    pub sum: Duration,
    /// Fastest item.
    pub min: Duration,
    /// Median item; mean of the two central samples for an even count.
    pub median: Duration,
    /// Arithmetic mean, truncated to whole nanoseconds.
    pub mean: Duration,
    /// Slowest item.
    pub max: Duration,
}

impl StatsSummary {
    /// Aggregate `durations`, sorting them in place.
    #[must_use]
    pub fn from_samples(total_wall_time: Duration, durations: &mut [Duration]) -> Self {
        durations.sort_unstable();
        let sum = sum(durations);
        Self {
            total_wall_time,
            count: durations.len(),
            sum,
            min: durations.first().copied().unwrap_or_default(),
            median: median_sorted(durations),
            mean: mean_of(sum, durations.len()),
            max: durations.last().copied().unwrap_or_default(),
        }
    }
}

impl fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\ttotal_processing_time={:?},\n\
             \ttotal_sum_query_time={:?},\n\
             \tmin_query_time={:?},\n\
             \tmedian_query_time={:?},\n\
             \taverage_query_time={:?},\n\
             \tmax_query_time={:?}",
            self.total_wall_time, self.sum, self.min, self.median, self.mean, self.max
        )
    }
}

/// Total of all durations.
#[must_use]
pub fn sum(durations: &[Duration]) -> Duration {
    durations.iter().sum()
}

/// Mean duration, zero for an empty slice.
#[must_use]
pub fn mean(durations: &[Duration]) -> Duration {
    mean_of(sum(durations), durations.len())
}

/// Median of an unsorted slice, zero when empty.
#[must_use]
pub fn median(durations: &[Duration]) -> Duration {
    let mut sorted = durations.to_vec();
    sorted.sort_unstable();
    median_sorted(&sorted)
}

fn mean_of(sum: Duration, count: usize) -> Duration {
    if count == 0 {
        return Duration::ZERO;
    }
    nanos_to_duration(sum.as_nanos() / count as u128)
}

fn median_sorted(sorted: &[Duration]) -> Duration {
    let len = sorted.len();
    if len == 0 {
        return Duration::ZERO;
    }
    let mid = len / 2;
    if len % 2 == 1 {
        sorted[mid]
    } else {
        let total = sorted[mid - 1].as_nanos() + sorted[mid].as_nanos();
        nanos_to_duration(total / 2)
    }
}

fn nanos_to_duration(nanos: u128) -> Duration {
    let secs = nanos / 1_000_000_000;
    // Both parts fit: the input was derived from Durations.
    #[allow(clippy::cast_possible_truncation)]
    let (secs, sub) = (secs as u64, (nanos % 1_000_000_000) as u32);
    Duration::new(secs, sub)
}
