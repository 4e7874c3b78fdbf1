//! Immutable unit of work routed by key.

use serde::{Deserialize, Serialize};

use super::DispatchError;

/// One query to run, tagged with the key that decides its lane.
///
/// Every item sharing a routing key is executed by the same lane, in the
/// order it was submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem<P> {
    routing_key: String,
    payload: P,
}

impl<P> WorkItem<P> {
    /// Create a work item.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::EmptyRoutingKey` if `routing_key` is empty.
    pub fn new(routing_key: impl Into<String>, payload: P) -> Result<Self, DispatchError> {
        let routing_key = routing_key.into();
        if routing_key.is_empty() {
            return Err(DispatchError::EmptyRoutingKey);
        }
        Ok(Self {
            routing_key,
            payload,
        })
    }

    /// Key used to pick the lane.
    #[must_use]
    pub fn routing_key(&self) -> &str {
        &self.routing_key
    }

    /// Parameters handed to the executor.
    #[must_use]
    pub const fn payload(&self) -> &P {
        &self.payload
    }

    /// Consume the item, returning its payload.
    #[must_use]
    pub fn into_payload(self) -> P {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_routing_key_rejected() {
        let err = WorkItem::new("", 1u32).unwrap_err();
        assert!(matches!(err, DispatchError::EmptyRoutingKey));
    }

    #[test]
    fn test_accessors() {
        let item = WorkItem::new("host_000001", (1, 2)).unwrap();
        assert_eq!(item.routing_key(), "host_000001");
        assert_eq!(item.payload(), &(1, 2));
        assert_eq!(item.into_payload(), (1, 2));
    }
}
