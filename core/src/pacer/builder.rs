//! Builder pattern for Pacer construction

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::driver::{Connection, Driver};
use crate::error::{CoreError, CoreResult};
use crate::sink::ResultSink;
use crate::status::StatusMachine;

use super::executor::Pacer;

/// Builder for creating Pacer instances
///
/// # Example
/// ```ignore
/// let pacer = PacerBuilder::new(0)
///     .driver(driver)
///     .connection(connection)
///     .qps(10)
///     .sink(sink)
///     .status(status)
///     .build()?;
/// ```
pub struct PacerBuilder {
    id: usize,
    driver: Option<Arc<dyn Driver>>,
    connection: Option<Arc<dyn Connection>>,
    qps: Option<u32>,
    tick: Duration,
    call_timeout: Duration,
    drain_grace: Duration,
    sink: Option<ResultSink>,
    status: Option<Arc<StatusMachine>>,
}

impl PacerBuilder {
    /// Create a new builder with the given pacer ID
    pub fn new(id: usize) -> Self {
        Self {
            id,
            driver: None,
            connection: None,
            qps: None,
            tick: Duration::from_secs(1),
            call_timeout: Duration::from_secs(2),
            drain_grace: Duration::from_secs(2),
            sink: None,
            status: None,
        }
    }

    /// Set the protocol driver
    pub fn driver(mut self, driver: Arc<dyn Driver>) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Set the connection to drive
    pub fn connection(mut self, connection: Arc<dyn Connection>) -> Self {
        self.connection = Some(connection);
        self
    }

    /// Set the calls attempted per tick
    pub fn qps(mut self, qps: u32) -> Self {
        self.qps = Some(qps);
        self
    }

    /// Set the tick period
    pub fn tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Set the per-call timeout
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Set the shutdown drain grace
    pub fn drain_grace(mut self, grace: Duration) -> Self {
        self.drain_grace = grace;
        self
    }

    /// Set the result sink
    pub fn sink(mut self, sink: ResultSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Set the shared status machine
    pub fn status(mut self, status: Arc<StatusMachine>) -> Self {
        self.status = Some(status);
        self
    }

    /// Build the Pacer
    ///
    /// # Errors
    /// Returns an error if any required field is missing or `qps` is zero.
    pub fn build(self) -> CoreResult<Pacer> {
        let driver = self.driver.ok_or(CoreError::missing_config("driver"))?;
        let connection = self
            .connection
            .ok_or(CoreError::missing_config("connection"))?;
        let qps = self.qps.ok_or(CoreError::missing_config("qps"))?;
        let sink = self.sink.ok_or(CoreError::missing_config("sink"))?;
        let status = self.status.ok_or(CoreError::missing_config("status"))?;

        if qps == 0 {
            return Err(CoreError::Config("qps must be at least 1".into()));
        }

        Ok(Pacer {
            id: self.id,
            driver,
            connection,
            qps,
            tick: self.tick,
            call_timeout: self.call_timeout,
            drain_grace: self.drain_grace,
            sink,
            status,
            inflight: Arc::new(Semaphore::new(qps as usize)),
        })
    }
}
