//! In-process no-op driver
//!
//! Completes every call locally after a configurable synthetic latency.
//! Useful for dry-running the engine — pacing, shutdown, and result
//! collection behave exactly as with a real backend, without a server to
//! point at.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use loadgen_core::{
    CallRequest, CallResponse, CallResult, ConnectOptions, Connection, Driver, DriverConfig,
    DriverError, RequestId,
};

/// Driver that answers every call in-process
pub struct NoopDriver {
    latency: Duration,
    calls: AtomicU64,
}

struct NoopConnection;

impl Connection for NoopConnection {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl NoopDriver {
    /// Create a driver with the given synthetic call latency
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            calls: AtomicU64::new(0),
        }
    }

    /// Create a driver from registry selection options
    ///
    /// The target host and port are ignored; calls never leave the process.
    pub fn from_config(_config: &DriverConfig) -> Self {
        Self::new(Duration::from_millis(1))
    }
}

impl Default for NoopDriver {
    fn default() -> Self {
        Self::new(Duration::from_millis(1))
    }
}

#[async_trait]
impl Driver for NoopDriver {
    fn name(&self) -> &str {
        "noop"
    }

    async fn create_connection(
        &self,
        _options: &ConnectOptions,
    ) -> Result<Arc<dyn Connection>, DriverError> {
        Ok(Arc::new(NoopConnection))
    }

    fn build_request(&self) -> Result<CallRequest, DriverError> {
        let id = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(CallRequest::new(id, id.to_be_bytes().to_vec()))
    }

    async fn call(
        &self,
        _connection: &dyn Connection,
        request: CallRequest,
    ) -> Result<CallResponse, DriverError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        Ok(CallResponse {
            request_id: request.id,
            payload: request.payload,
        })
    }

    fn build_result(
        &self,
        request_id: RequestId,
        outcome: Result<CallResponse, DriverError>,
        elapsed: Duration,
    ) -> CallResult {
        CallResult::from_outcome(request_id, outcome, elapsed)
    }

    fn total_calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for NoopDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoopDriver")
            .field("latency", &self.latency)
            .field("total_calls", &self.total_calls())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadgen_core::CallStatus;

    #[tokio::test]
    async fn test_noop_round_trip() {
        let driver = NoopDriver::new(Duration::ZERO);
        let connection = driver
            .create_connection(&ConnectOptions::default())
            .await
            .expect("connection failed");

        let request = driver.build_request().expect("build failed");
        let id = request.id;
        let payload = request.payload.clone();

        let outcome = driver.call(connection.as_ref(), request).await;
        let result = driver.build_result(id, outcome, Duration::from_micros(10));

        assert_eq!(result.status, CallStatus::Success);
        assert_eq!(result.response.unwrap().payload, payload);
    }

    #[tokio::test]
    async fn test_noop_counts_issued_calls() {
        let driver = NoopDriver::new(Duration::ZERO);
        assert_eq!(driver.total_calls(), 0);

        let first = driver.build_request().unwrap();
        let second = driver.build_request().unwrap();

        assert_eq!(first.id, RequestId(0));
        assert_eq!(second.id, RequestId(1));
        assert_eq!(driver.total_calls(), 2);
    }

    #[test]
    fn test_noop_encodes_timeout_status() {
        let driver = NoopDriver::default();
        let result = driver.build_result(
            RequestId(9),
            Err(DriverError::CallTimeout(Duration::from_secs(2))),
            Duration::from_secs(2),
        );
        assert_eq!(result.status, CallStatus::TimedOut);
    }
}
