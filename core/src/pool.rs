//! Connection pool construction

use std::sync::Arc;

use crate::driver::{ConnectOptions, Connection, Driver, DriverError};
use crate::error::{CoreError, CoreResult};

/// A fixed-size set of live connections
///
/// Built once during setup; connections live for the whole run (there is no
/// reconnection logic). Construction is all-or-nothing: a partial pool would
/// silently change the offered load, so the first creation failure aborts
/// the run before any traffic is generated.
pub struct ConnectionPool {
    connections: Vec<Arc<dyn Connection>>,
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("connections", &self.connections.len())
            .finish()
    }
}

impl ConnectionPool {
    /// Create exactly `count` connections or fail the whole run
    ///
    /// Each creation runs under the creation timeout in `options`.
    pub async fn build(
        driver: &Arc<dyn Driver>,
        count: usize,
        options: &ConnectOptions,
    ) -> CoreResult<Self> {
        let mut connections = Vec::with_capacity(count);

        for index in 0..count {
            let created =
                tokio::time::timeout(options.timeout, driver.create_connection(options)).await;

            let connection = match created {
                Ok(Ok(connection)) => connection,
                Ok(Err(source)) => return Err(CoreError::ConnectionSetup { index, source }),
                Err(_) => {
                    return Err(CoreError::ConnectionSetup {
                        index,
                        source: DriverError::ConnectTimeout(options.timeout),
                    })
                }
            };

            connections.push(connection);
        }

        tracing::info!(
            count,
            driver = driver.name(),
            "connection pool ready"
        );

        Ok(Self { connections })
    }

    /// Number of connections in the pool
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether the pool is empty
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Consume the pool, yielding its connections
    pub fn into_connections(self) -> Vec<Arc<dyn Connection>> {
        self.connections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{CallRequest, RequestId};
    use crate::response::{CallResponse, CallResult};
    use async_trait::async_trait;
    use std::any::Any;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct TestConnection;

    impl Connection for TestConnection {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    /// Driver whose `fail_at` creation (if set) returns an error, and whose
    /// creations optionally hang longer than any sane timeout.
    struct FlakyDriver {
        created: AtomicUsize,
        fail_at: Option<usize>,
        hang: bool,
    }

    impl FlakyDriver {
        fn reliable() -> Self {
            Self {
                created: AtomicUsize::new(0),
                fail_at: None,
                hang: false,
            }
        }

        fn failing_at(index: usize) -> Self {
            Self {
                fail_at: Some(index),
                ..Self::reliable()
            }
        }

        fn hanging() -> Self {
            Self {
                hang: true,
                ..Self::reliable()
            }
        }
    }

    #[async_trait]
    impl Driver for FlakyDriver {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn create_connection(
            &self,
            _options: &ConnectOptions,
        ) -> Result<Arc<dyn Connection>, DriverError> {
            let index = self.created.fetch_add(1, Ordering::SeqCst);

            if self.hang {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }

            if self.fail_at == Some(index) {
                return Err(DriverError::Connect(format!(
                    "simulated failure at {index}"
                )));
            }

            Ok(Arc::new(TestConnection))
        }

        fn build_request(&self) -> Result<CallRequest, DriverError> {
            Ok(CallRequest::new(0u64, Vec::new()))
        }

        async fn call(
            &self,
            _connection: &dyn Connection,
            request: CallRequest,
        ) -> Result<CallResponse, DriverError> {
            Ok(CallResponse {
                request_id: request.id,
                payload: Vec::new(),
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
            0
        }
    }

    #[tokio::test]
    async fn test_pool_builds_exactly_n_connections() {
        let driver: Arc<dyn Driver> = Arc::new(FlakyDriver::reliable());
        let pool = ConnectionPool::build(&driver, 3, &ConnectOptions::default())
            .await
            .expect("pool construction failed");

        assert_eq!(pool.len(), 3);
        assert!(!pool.is_empty());
        assert_eq!(pool.into_connections().len(), 3);
    }

    #[tokio::test]
    async fn test_pool_fails_fast_on_creation_error() {
        let flaky = Arc::new(FlakyDriver::failing_at(1));
        let driver: Arc<dyn Driver> = Arc::clone(&flaky) as Arc<dyn Driver>;

        let err = ConnectionPool::build(&driver, 3, &ConnectOptions::default())
            .await
            .unwrap_err();

        match err {
            CoreError::ConnectionSetup { index, .. } => assert_eq!(index, 1),
            other => panic!("expected ConnectionSetup, got {other:?}"),
        }

        // construction stopped at the failure; the third connection was
        // never attempted
        assert_eq!(flaky.created.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pool_creation_timeout() {
        let driver: Arc<dyn Driver> = Arc::new(FlakyDriver::hanging());
        let options = ConnectOptions {
            timeout: Duration::from_millis(50),
        };

        let err = ConnectionPool::build(&driver, 1, &options).await.unwrap_err();

        match err {
            CoreError::ConnectionSetup {
                index,
                source: DriverError::ConnectTimeout(timeout),
            } => {
                assert_eq!(index, 0);
                assert_eq!(timeout, Duration::from_millis(50));
            }
            other => panic!("expected ConnectTimeout, got {other:?}"),
        }
    }
}
