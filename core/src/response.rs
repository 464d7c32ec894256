//! Call outcomes and per-call result records

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::driver::DriverError;
use crate::request::RequestId;

/// Response returned by a driver call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallResponse {
    /// Identifier of the request this response answers
    pub request_id: RequestId,

    /// Protocol payload, opaque to the engine
    pub payload: Vec<u8>,
}

/// Terminal status of a single call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    /// The call completed and the driver accepted the response
    Success,
    /// The call failed at the protocol or transport layer
    Failed,
    /// The call did not complete within its timeout
    TimedOut,
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallStatus::Success => write!(f, "success"),
            CallStatus::Failed => write!(f, "failed"),
            CallStatus::TimedOut => write!(f, "timed_out"),
        }
    }
}

/// Outcome of one completed call
///
/// Created by the driver once per call, immutable after construction, and
/// consumed exactly once by the result consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallResult {
    /// Identifier of the dispatched request
    pub request_id: RequestId,

    /// Terminal status; failures are encoded here by the driver, never
    /// propagated as errors past the dispatch layer
    pub status: CallStatus,

    /// Wall-clock time from dispatch to completion
    pub elapsed: Duration,

    /// Response carried for successful calls
    pub response: Option<CallResponse>,

    /// When the call finished
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

impl CallResult {
    /// Build a result from a call outcome, mapping errors onto the status
    ///
    /// Drivers with no protocol-specific result shape can delegate their
    /// result construction here.
    pub fn from_outcome(
        request_id: RequestId,
        outcome: Result<CallResponse, DriverError>,
        elapsed: Duration,
    ) -> Self {
        let (status, response) = match outcome {
            Ok(response) => (CallStatus::Success, Some(response)),
            Err(DriverError::CallTimeout(_)) => (CallStatus::TimedOut, None),
            Err(_) => (CallStatus::Failed, None),
        };

        Self {
            request_id,
            status,
            elapsed,
            response,
            completed_at: chrono::Utc::now(),
        }
    }

    /// Whether the call completed successfully
    pub fn is_success(&self) -> bool {
        self.status == CallStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_status_display() {
        assert_eq!(CallStatus::Success.to_string(), "success");
        assert_eq!(CallStatus::Failed.to_string(), "failed");
        assert_eq!(CallStatus::TimedOut.to_string(), "timed_out");
    }

    #[test]
    fn test_from_outcome_success() {
        let response = CallResponse {
            request_id: RequestId(1),
            payload: vec![0xAB],
        };
        let result =
            CallResult::from_outcome(RequestId(1), Ok(response), Duration::from_millis(3));

        assert!(result.is_success());
        assert_eq!(result.response.as_ref().unwrap().payload, vec![0xAB]);
    }

    #[test]
    fn test_from_outcome_timeout() {
        let result = CallResult::from_outcome(
            RequestId(2),
            Err(DriverError::CallTimeout(Duration::from_secs(2))),
            Duration::from_secs(2),
        );

        assert_eq!(result.status, CallStatus::TimedOut);
        assert!(result.response.is_none());
    }

    #[test]
    fn test_from_outcome_failure() {
        let result = CallResult::from_outcome(
            RequestId(3),
            Err(DriverError::Call("connection reset".into())),
            Duration::from_millis(1),
        );

        assert_eq!(result.status, CallStatus::Failed);
        assert!(!result.is_success());
    }
}
