//! Query parameters for one time-range CPU usage query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{DispatchError, WorkItem};

/// Host and half-open time range `[start_time, end_time)` to query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    /// Host identifier; also the routing key.
    pub host: String,
    /// Inclusive range start.
    pub start_time: DateTime<Utc>,
    /// Exclusive range end.
    pub end_time: DateTime<Utc>,
}

impl QueryParams {
    /// Key routing these params to a lane.
    #[must_use]
    pub fn routing_key(&self) -> &str {
        &self.host
    }

    /// Wrap into a work item keyed by host.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::EmptyRoutingKey` if `host` is empty.
    pub fn into_work_item(self) -> Result<WorkItem<Self>, DispatchError> {
        let key = self.host.clone();
        WorkItem::new(key, self)
    }
}
