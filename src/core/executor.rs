//! Execution callback abstraction.

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::WorkItem;

/// Runs one query for a work item.
///
/// The pool treats the executor as an opaque, possibly slow operation. It is
/// called sequentially within a lane and concurrently across lanes, so it must
/// be safe to share between threads. Failures are the executor's concern: the
/// lane records the elapsed time of every call whatever the outcome.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use tsdb_dispatch::core::{QueryExecutor, WorkItem};
///
/// #[derive(Clone)]
/// struct PrintExecutor;
///
/// #[async_trait]
/// impl QueryExecutor<String> for PrintExecutor {
///     type Error = std::convert::Infallible;
///
///     async fn execute(&self, lane: usize, item: &WorkItem<String>) -> Result<(), Self::Error> {
///         println!("lane {lane}: {}", item.payload());
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait QueryExecutor<P>: Send + Sync + Clone + 'static
where
    P: Send + Sync + 'static,
{
    /// Error reported by a failed execution.
    type Error: fmt::Display + Send;

    /// Execute the query described by `item`.
    ///
    /// # Threading
    ///
    /// Called from the lane's dedicated OS thread, inside that lane's
    /// single-threaded tokio runtime.
    async fn execute(&self, lane: usize, item: &WorkItem<P>) -> Result<(), Self::Error>;
}

/// Adapter turning a synchronous closure into a [`QueryExecutor`].
///
/// The closure receives the lane index and the item; handy for stubs in tests
/// and benchmarks.
pub struct FnExecutor<F> {
    func: Arc<F>,
}

impl<F> FnExecutor<F> {
    /// Wrap `func`.
    pub fn new(func: F) -> Self {
        Self {
            func: Arc::new(func),
        }
    }
}

impl<F> Clone for FnExecutor<F> {
    fn clone(&self) -> Self {
        Self {
            func: Arc::clone(&self.func),
        }
    }
}

#[async_trait]
impl<P, F> QueryExecutor<P> for FnExecutor<F>
where
    P: Send + Sync + 'static,
    F: Fn(usize, &WorkItem<P>) + Send + Sync + 'static,
{
    type Error = Infallible;

    async fn execute(&self, lane: usize, item: &WorkItem<P>) -> Result<(), Self::Error> {
        (self.func)(lane, item);
        Ok(())
    }
}
