//! Key-affine dispatch pool: a fixed set of lanes fed through per-lane queues.
//!
//! Every work item is hashed by its routing key onto exactly one lane. Each
//! lane runs on a dedicated OS thread and executes its queue strictly in
//! order, so items sharing a key run in the order they were submitted.
//!
//! # Lifecycle
//!
//! `new` → `start(n)` → `submit`* → `stop` → `stats`
//!
//! - `submit` blocks only while the target lane's queue is full.
//! - `stop` closes every queue, waits for each lane to drain, then freezes
//!   the run's [`StatsSummary`].
//!
//! # Example
//!
//! ```rust,ignore
//! use tsdb_dispatch::config::DispatchConfig;
//! use tsdb_dispatch::core::{DispatchPool, FnExecutor, WorkItem};
//!
//! let pool = DispatchPool::new(DispatchConfig::new(), FnExecutor::new(|_lane, _item: &WorkItem<u32>| {}))?;
//! pool.start(4)?;
//! pool.submit(WorkItem::new("host_000001", 7)?)?;
//! pool.stop()?;
//! println!("{}", pool.stats()?);
//! ```

mod lane;

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::{debug, error, info, info_span, Span};

use crate::config::DispatchConfig;
use crate::core::executor::QueryExecutor;
use crate::core::observer::{DispatchObserver, NoopObserver};
use crate::core::routing::lane_for;
use crate::core::{DispatchError, StatsSummary, WorkItem};

use lane::{spawn_lane, LaneHandle, LaneSpec, LaneStateCell};

pub use lane::LaneState;

/// Lanes of a started pool.
struct Running<P> {
    lanes: Vec<LaneHandle<P>>,
    started_at: Instant,
}

enum PoolState<P> {
    Idle,
    Running(Running<P>),
    Stopped {
        summary: StatsSummary,
        lanes: Vec<Arc<LaneStateCell>>,
    },
}

/// Pool controller owning the lanes, their queues and the run statistics.
///
/// All methods take `&self`; share the pool behind an `Arc` to submit from
/// several producer threads.
pub struct DispatchPool<P, E>
where
    P: Send + Sync + 'static,
    E: QueryExecutor<P>,
{
    config: DispatchConfig,
    executor: E,
    observer: Arc<dyn DispatchObserver>,
    span: Span,
    state: RwLock<PoolState<P>>,
}

impl<P, E> DispatchPool<P, E>
where
    P: Send + Sync + 'static,
    E: QueryExecutor<P>,
{
    /// Create an idle pool that discards observer events.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::InvalidConfig` if the configuration is invalid.
    pub fn new(config: DispatchConfig, executor: E) -> Result<Self, DispatchError> {
        Self::with_observer(config, executor, Arc::new(NoopObserver))
    }

    /// Create an idle pool reporting to `observer`.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::InvalidConfig` if the configuration is invalid.
    pub fn with_observer(
        config: DispatchConfig,
        executor: E,
        observer: Arc<dyn DispatchObserver>,
    ) -> Result<Self, DispatchError> {
        config.validate().map_err(DispatchError::InvalidConfig)?;
        let span = info_span!("dispatch_pool", pool = %config.name);
        Ok(Self {
            config,
            executor,
            observer,
            span,
            state: RwLock::new(PoolState::Idle),
        })
    }

    /// Pool configuration.
    #[must_use]
    pub const fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Spawn `lanes` lanes and start accepting work.
    ///
    /// # Errors
    ///
    /// - `DispatchError::InvalidLaneCount` if `lanes` is zero
    /// - `DispatchError::AlreadyStarted` if the pool was started before
    /// - `DispatchError::LaneSpawn` if a lane could not be created; lanes
    ///   already spawned are shut down before returning
    pub fn start(&self, lanes: usize) -> Result<(), DispatchError> {
        if lanes == 0 {
            return Err(DispatchError::InvalidLaneCount(lanes));
        }

        let mut state = self.state.write();
        if !matches!(*state, PoolState::Idle) {
            return Err(DispatchError::AlreadyStarted);
        }

        let started_at = Instant::now();
        let mut handles = Vec::with_capacity(lanes);
        for lane in 0..lanes {
            let spec = LaneSpec {
                lane,
                capacity: self.config.lane_capacity,
                stack_size: self.config.thread_stack_size,
                executor: self.executor.clone(),
                observer: Arc::clone(&self.observer),
                span: info_span!(parent: &self.span, "lane", lane),
            };
            match spawn_lane(spec) {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    error!(lane, error = %err, "failed to spawn lane, shutting down started lanes");
                    let _ = join_lanes(handles);
                    return Err(err);
                }
            }
        }

        *state = PoolState::Running(Running {
            lanes: handles,
            started_at,
        });

        info!(
            parent: &self.span,
            lanes,
            lane_capacity = self.config.lane_capacity,
            "dispatch pool started"
        );
        Ok(())
    }

    /// Route `item` to its lane and enqueue it.
    ///
    /// Blocks while that lane's queue is full; other lanes are unaffected.
    /// Returns the lane index the item was sent to.
    ///
    /// # Errors
    ///
    /// - `DispatchError::NotStarted` before `start`
    /// - `DispatchError::AlreadyStopped` after `stop`
    /// - `DispatchError::LaneDisconnected` if the lane thread has died
    pub fn submit(&self, item: WorkItem<P>) -> Result<usize, DispatchError> {
        // The read guard is held across the send so `stop` cannot close the
        // queues under an in-flight submission.
        let state = self.state.read();
        let running = match &*state {
            PoolState::Running(running) => running,
            PoolState::Idle => return Err(DispatchError::NotStarted),
            PoolState::Stopped { .. } => return Err(DispatchError::AlreadyStopped),
        };

        let lane = lane_for(item.routing_key(), running.lanes.len());
        debug!(
            parent: &self.span,
            routing_key = item.routing_key(),
            lane,
            "forwarding item to lane"
        );
        let routing_key = item.routing_key().to_owned();

        running.lanes[lane]
            .sender
            .send(item)
            .map_err(|_| DispatchError::LaneDisconnected(lane))?;
        self.observer.on_routed(lane, &routing_key);
        Ok(lane)
    }

    /// Close every queue, wait for all lanes to drain, and freeze the stats.
    ///
    /// # Errors
    ///
    /// - `DispatchError::NotStarted` before `start`
    /// - `DispatchError::AlreadyStopped` on a second call
    /// - `DispatchError::LanePanicked` if a lane thread panicked; the pool is
    ///   still stopped and stats cover the surviving lanes
    pub fn stop(&self) -> Result<(), DispatchError> {
        let mut state = self.state.write();
        let running = match std::mem::replace(&mut *state, PoolState::Idle) {
            PoolState::Running(running) => running,
            PoolState::Idle => return Err(DispatchError::NotStarted),
            stopped @ PoolState::Stopped { .. } => {
                *state = stopped;
                return Err(DispatchError::AlreadyStopped);
            }
        };

        info!(parent: &self.span, lanes = running.lanes.len(), "stopping dispatch pool, draining lanes");

        let lane_states: Vec<_> = running.lanes.iter().map(|l| Arc::clone(&l.state)).collect();
        let (mut durations, panicked) = join_lanes(running.lanes);
        let total_wall_time = running.started_at.elapsed();
        let summary = StatsSummary::from_samples(total_wall_time, &mut durations);

        info!(
            parent: &self.span,
            count = summary.count,
            total_wall_time = ?summary.total_wall_time,
            "dispatch pool stopped"
        );

        *state = PoolState::Stopped {
            summary,
            lanes: lane_states,
        };

        panicked.map_or(Ok(()), |lane| Err(DispatchError::LanePanicked(lane)))
    }

    /// Summary of the run.
    ///
    /// # Errors
    ///
    /// - `DispatchError::NotStarted` before `start`
    /// - `DispatchError::NotStopped` while the pool is running
    pub fn stats(&self) -> Result<StatsSummary, DispatchError> {
        match &*self.state.read() {
            PoolState::Stopped { summary, .. } => Ok(*summary),
            PoolState::Idle => Err(DispatchError::NotStarted),
            PoolState::Running(_) => Err(DispatchError::NotStopped),
        }
    }

    /// Number of lanes, zero before `start`.
    ///
    /// Blocks while `stop` is joining lanes.
    #[must_use]
    pub fn lane_count(&self) -> usize {
        match &*self.state.read() {
            PoolState::Idle => 0,
            PoolState::Running(running) => running.lanes.len(),
            PoolState::Stopped { lanes, .. } => lanes.len(),
        }
    }

    /// Current state of each lane, in lane order. Empty before `start`.
    #[must_use]
    pub fn lane_states(&self) -> Vec<LaneState> {
        match &*self.state.read() {
            PoolState::Idle => Vec::new(),
            PoolState::Running(running) => running.lanes.iter().map(|l| l.state.get()).collect(),
            PoolState::Stopped { lanes, .. } => lanes.iter().map(|s| s.get()).collect(),
        }
    }
}

impl<P, E> Drop for DispatchPool<P, E>
where
    P: Send + Sync + 'static,
    E: QueryExecutor<P>,
{
    fn drop(&mut self) {
        // Dropping the senders lets lanes drain and exit; they are detached
        // rather than joined. Call `stop` for a graceful shutdown.
        if let PoolState::Running(running) = std::mem::replace(self.state.get_mut(), PoolState::Idle) {
            for lane in &running.lanes {
                lane.state.begin_drain();
            }
            debug!(
                parent: &self.span,
                lanes = running.lanes.len(),
                "dispatch pool dropped without stop, lanes detached"
            );
        }
    }
}

/// Close all queues first, then join each lane and collect its samples.
///
/// Returns the merged samples and the index of the first lane that panicked.
fn join_lanes<P>(lanes: Vec<LaneHandle<P>>) -> (Vec<Duration>, Option<usize>) {
    let threads: Vec<_> = lanes
        .into_iter()
        .map(|handle| {
            handle.state.begin_drain();
            drop(handle.sender);
            (handle.state, handle.thread)
        })
        .collect();

    let mut durations = Vec::new();
    let mut panicked = None;
    for (lane, (state, thread)) in threads.into_iter().enumerate() {
        match thread.join() {
            Ok(mut samples) => {
                debug!(lane, samples = samples.len(), "lane joined");
                durations.append(&mut samples);
            }
            Err(_) => {
                // The lane never reached the end of its loop.
                state.set(LaneState::Stopped);
                error!(lane, "lane panicked, its samples are lost");
                panicked.get_or_insert(lane);
            }
        }
    }
    (durations, panicked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FnExecutor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_pool(
        counter: Arc<AtomicUsize>,
    ) -> DispatchPool<u32, FnExecutor<impl Fn(usize, &WorkItem<u32>) + Send + Sync + 'static>> {
        let executor = FnExecutor::new(move |_lane: usize, _item: &WorkItem<u32>| {
            counter.fetch_add(1, Ordering::Relaxed);
        });
        DispatchPool::new(DispatchConfig::new(), executor).unwrap()
    }

    #[test]
    fn test_start_zero_lanes_rejected() {
        let pool = counting_pool(Arc::new(AtomicUsize::new(0)));
        assert!(matches!(pool.start(0), Err(DispatchError::InvalidLaneCount(0))));
        // Still startable afterwards.
        pool.start(1).unwrap();
        pool.stop().unwrap();
    }

    #[test]
    fn test_start_twice_rejected() {
        let pool = counting_pool(Arc::new(AtomicUsize::new(0)));
        pool.start(2).unwrap();
        assert!(matches!(pool.start(2), Err(DispatchError::AlreadyStarted)));
        pool.stop().unwrap();
        assert!(matches!(pool.start(2), Err(DispatchError::AlreadyStarted)));
    }

    #[test]
    fn test_lifecycle_misuse() {
        let pool = counting_pool(Arc::new(AtomicUsize::new(0)));
        assert!(matches!(pool.stop(), Err(DispatchError::NotStarted)));
        assert!(matches!(pool.stats(), Err(DispatchError::NotStarted)));
        assert!(matches!(
            pool.submit(WorkItem::new("k", 1).unwrap()),
            Err(DispatchError::NotStarted)
        ));

        pool.start(3).unwrap();
        assert!(matches!(pool.stats(), Err(DispatchError::NotStopped)));
        pool.stop().unwrap();

        assert!(matches!(pool.stop(), Err(DispatchError::AlreadyStopped)));
        assert!(matches!(
            pool.submit(WorkItem::new("k", 1).unwrap()),
            Err(DispatchError::AlreadyStopped)
        ));
    }

    #[test]
    fn test_submit_returns_routed_lane() {
        let pool = counting_pool(Arc::new(AtomicUsize::new(0)));
        pool.start(5).unwrap();
        let lane = pool.submit(WorkItem::new("host_000042", 1).unwrap()).unwrap();
        assert_eq!(lane, lane_for("host_000042", 5));
        pool.stop().unwrap();
    }

    #[test]
    fn test_lane_states_follow_lifecycle() {
        let pool = counting_pool(Arc::new(AtomicUsize::new(0)));
        assert!(pool.lane_states().is_empty());
        assert_eq!(pool.lane_count(), 0);

        pool.start(3).unwrap();
        assert_eq!(pool.lane_count(), 3);
        pool.stop().unwrap();

        assert_eq!(pool.lane_states(), vec![LaneState::Stopped; 3]);
    }

    #[test]
    fn test_empty_run_stats() {
        let pool = counting_pool(Arc::new(AtomicUsize::new(0)));
        pool.start(4).unwrap();
        pool.stop().unwrap();

        let stats = pool.stats().unwrap();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.sum, Duration::ZERO);
        assert_eq!(stats.median, Duration::ZERO);
        assert_eq!(stats.mean, Duration::ZERO);
    }

    #[test]
    fn test_drain_completeness() {
        let counter = Arc::new(AtomicUsize::new(0));
        let pool = counting_pool(Arc::clone(&counter));
        pool.start(4).unwrap();
        for i in 0..100u32 {
            pool.submit(WorkItem::new(format!("host_{}", i % 13), i).unwrap())
                .unwrap();
        }
        pool.stop().unwrap();

        assert_eq!(counter.load(Ordering::Relaxed), 100);
        assert_eq!(pool.stats().unwrap().count, 100);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let executor = FnExecutor::new(|_lane: usize, _item: &WorkItem<u32>| {});
        let result = DispatchPool::new(DispatchConfig::new().with_lane_capacity(0), executor);
        assert!(matches!(result, Err(DispatchError::InvalidConfig(_))));
    }
}
