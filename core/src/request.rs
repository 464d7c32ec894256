//! Request types for dispatched calls

use serde::{Deserialize, Serialize};

/// Unique call identifier, assigned by the driver when the request is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RequestId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A single outbound call request
///
/// The payload is opaque to the engine: the driver that built the request is
/// the only component that interprets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRequest {
    /// Unique request identifier
    pub id: RequestId,

    /// Protocol payload produced by the driver
    pub payload: Vec<u8>,
}

impl CallRequest {
    /// Create a new request
    pub fn new(id: impl Into<RequestId>, payload: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            payload,
        }
    }
}
