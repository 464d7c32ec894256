//! Builder pattern for Orchestrator construction

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::channel::ChannelConfig;
use crate::config::LoadConfig;
use crate::driver::Driver;
use crate::error::{CoreError, CoreResult};
use crate::sink::result_channel;
use crate::status::StatusMachine;

use super::executor::Orchestrator;

/// Builder for creating an Orchestrator with proper configuration
///
/// # Example
///
/// ```ignore
/// let orchestrator = OrchestratorBuilder::new()
///     .connections(2)
///     .qps(5)
///     .duration(Duration::from_secs(30))
///     .driver(driver)
///     .build()?;
/// ```
pub struct OrchestratorBuilder {
    config: LoadConfig,
    channel_config: ChannelConfig,
    driver: Option<Arc<dyn Driver>>,
}

impl OrchestratorBuilder {
    /// Create a new orchestrator builder with default configuration
    pub fn new() -> Self {
        Self {
            config: LoadConfig::default(),
            channel_config: ChannelConfig::default(),
            driver: None,
        }
    }

    /// Set the full run configuration
    pub fn config(mut self, config: LoadConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the connection count
    pub fn connections(mut self, connections: usize) -> Self {
        self.config.connections = connections;
        self
    }

    /// Set the per-connection call rate
    pub fn qps(mut self, qps: u32) -> Self {
        self.config.qps = qps;
        self
    }

    /// Set the run duration
    pub fn duration(mut self, duration: std::time::Duration) -> Self {
        self.config.duration = duration;
        self
    }

    /// Set the per-call timeout
    pub fn call_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config.call_timeout = timeout;
        self
    }

    /// Set the channel configuration
    pub fn channel_config(mut self, config: ChannelConfig) -> Self {
        self.channel_config = config;
        self
    }

    /// Set the protocol driver
    pub fn driver(mut self, driver: Arc<dyn Driver>) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Build the orchestrator
    ///
    /// # Errors
    ///
    /// Returns an error if the driver is not set or if configuration
    /// validation fails.
    pub fn build(self) -> CoreResult<Orchestrator> {
        let driver = self
            .driver
            .ok_or_else(|| CoreError::missing_config("driver"))?;

        self.config
            .validate()
            .map_err(|e| CoreError::Config(e.to_string()))?;

        let status = Arc::new(StatusMachine::new());
        let (sink, consumer) =
            result_channel(self.channel_config.result_buffer, Arc::clone(&status));
        let (shutdown_tx, _) = broadcast::channel(1);

        Ok(Orchestrator {
            config: self.config,
            driver,
            status,
            sink,
            consumer,
            shutdown_tx,
        })
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
