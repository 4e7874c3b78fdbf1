//! A single worker lane: one OS thread draining one bounded queue.
//!
//! Each lane owns a single-threaded tokio runtime so async executors run on
//! the lane thread without touching the caller's runtime. Items are executed
//! strictly one at a time, in queue order.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{debug, Span};

use crate::core::executor::QueryExecutor;
use crate::core::observer::DispatchObserver;
use crate::core::{DispatchError, WorkItem};

/// Lifecycle of a lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneState {
    /// Spawned but not yet consuming.
    Idle,
    /// Consuming from an open queue.
    Running,
    /// Queue closed; executing what is left.
    Draining,
    /// The thread has returned, or panicked, and will run nothing more.
    Stopped,
}

impl LaneState {
    const fn to_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Running => 1,
            Self::Draining => 2,
            Self::Stopped => 3,
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Running,
            2 => Self::Draining,
            _ => Self::Stopped,
        }
    }
}

/// Atomic holder for a lane's state, shared between pool and lane thread.
#[derive(Debug)]
pub(crate) struct LaneStateCell(AtomicU8);

impl LaneStateCell {
    fn new() -> Self {
        Self(AtomicU8::new(LaneState::Idle.to_u8()))
    }

    pub(crate) fn get(&self) -> LaneState {
        LaneState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn set(&self, state: LaneState) {
        self.0.store(state.to_u8(), Ordering::Release);
    }

    fn mark_running(&self) {
        // Stays Draining if the pool was stopped before the thread got going.
        let _ = self.0.compare_exchange(
            LaneState::Idle.to_u8(),
            LaneState::Running.to_u8(),
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    pub(crate) fn begin_drain(&self) {
        let _ = self.0.fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
            match LaneState::from_u8(current) {
                LaneState::Idle | LaneState::Running => Some(LaneState::Draining.to_u8()),
                LaneState::Draining | LaneState::Stopped => None,
            }
        });
    }
}

/// Pool-side handle of a running lane.
pub(crate) struct LaneHandle<P> {
    pub(crate) sender: Sender<WorkItem<P>>,
    pub(crate) state: Arc<LaneStateCell>,
    pub(crate) thread: JoinHandle<Vec<Duration>>,
}

/// Everything a lane thread needs, bundled to keep `spawn_lane` readable.
pub(crate) struct LaneSpec<E> {
    pub(crate) lane: usize,
    pub(crate) capacity: usize,
    pub(crate) stack_size: usize,
    pub(crate) executor: E,
    pub(crate) observer: Arc<dyn DispatchObserver>,
    pub(crate) span: Span,
}

/// Spawn a lane thread with its own bounded queue and runtime.
pub(crate) fn spawn_lane<P, E>(spec: LaneSpec<E>) -> Result<LaneHandle<P>, DispatchError>
where
    P: Send + Sync + 'static,
    E: QueryExecutor<P>,
{
    let LaneSpec {
        lane,
        capacity,
        stack_size,
        executor,
        observer,
        span,
    } = spec;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|source| DispatchError::LaneSpawn { lane, source })?;

    let (sender, receiver) = bounded::<WorkItem<P>>(capacity);
    let state = Arc::new(LaneStateCell::new());
    let thread_state = Arc::clone(&state);

    let thread = thread::Builder::new()
        .name(format!("dispatch-lane-{lane}"))
        .stack_size(stack_size)
        .spawn(move || {
            let _entered = span.entered();
            run_lane(lane, &receiver, &runtime, &executor, observer.as_ref(), &thread_state)
        })
        .map_err(|source| DispatchError::LaneSpawn { lane, source })?;

    Ok(LaneHandle {
        sender,
        state,
        thread,
    })
}

/// Lane loop: block on the queue, execute, time, repeat until closed and empty.
fn run_lane<P, E>(
    lane: usize,
    receiver: &Receiver<WorkItem<P>>,
    runtime: &tokio::runtime::Runtime,
    executor: &E,
    observer: &dyn DispatchObserver,
    state: &LaneStateCell,
) -> Vec<Duration>
where
    P: Send + Sync + 'static,
    E: QueryExecutor<P>,
{
    state.mark_running();
    debug!(lane, "lane started");

    let mut durations = Vec::new();

    // recv() keeps yielding buffered items after the senders are dropped and
    // only errors once the queue is both closed and empty.
    while let Ok(item) = receiver.recv() {
        let started = Instant::now();
        let outcome = runtime.block_on(executor.execute(lane, &item));
        let elapsed = started.elapsed();

        if let Err(err) = outcome {
            debug!(lane, routing_key = item.routing_key(), error = %err, "executor reported failure");
        }
        observer.on_executed(lane, item.routing_key(), elapsed);
        durations.push(elapsed);
    }

    state.set(LaneState::Stopped);
    debug!(lane, executed = durations.len(), "lane stopped");
    durations
}
