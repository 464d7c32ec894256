//! Run configuration types

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a load-generation run
///
/// Defines the offered load (connections, per-connection call rate, run
/// duration) and the timing knobs of the engine itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    /// Number of parallel connections; one pacer runs per connection
    pub connections: usize,

    /// Calls dispatched per connection on every pacing tick
    pub qps: u32,

    /// How long load is generated before the deadline fires
    pub duration: Duration,

    /// Per-call timeout, scoped independently of the run deadline
    pub call_timeout: Duration,

    /// Timeout for each connection creation during pool construction
    pub connect_timeout: Duration,

    /// Extra time past `duration` before shutdown is triggered
    pub shutdown_grace: Duration,

    /// How long a stopping pacer waits for its in-flight batch before
    /// abandoning it
    pub drain_grace: Duration,

    /// Pacing tick period. Drift is not compensated: the engine targets one
    /// batch per tick, not an exact aggregate rate.
    pub tick: Duration,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            connections: 1,
            qps: 10,
            duration: Duration::from_secs(60),
            call_timeout: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(5),
            shutdown_grace: Duration::from_secs(1),
            drain_grace: Duration::from_secs(2),
            tick: Duration::from_secs(1),
        }
    }
}

impl LoadConfig {
    /// Create a new config with the given connection count and per-connection rate
    pub fn new(connections: usize, qps: u32) -> Self {
        Self {
            connections,
            qps,
            ..Default::default()
        }
    }

    /// Set the run duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the per-call timeout
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Set the connection-creation timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the shutdown grace added on top of the run duration
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Set the in-flight drain grace applied by stopping pacers
    pub fn with_drain_grace(mut self, grace: Duration) -> Self {
        self.drain_grace = grace;
        self
    }

    /// Set the pacing tick period
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connections == 0 {
            return Err(ConfigError::InvalidConnections(
                "connection count must be at least 1".into(),
            ));
        }

        if self.qps == 0 {
            return Err(ConfigError::InvalidQps("qps must be at least 1".into()));
        }

        if self.duration.is_zero() {
            return Err(ConfigError::InvalidDuration(
                "run duration must be positive".into(),
            ));
        }

        if self.call_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "call timeout must be positive".into(),
            ));
        }

        if self.tick.is_zero() {
            return Err(ConfigError::InvalidTick(
                "tick period must be positive".into(),
            ));
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid connection count
    #[error("Invalid connection count: {0}")]
    InvalidConnections(String),

    /// Invalid per-connection rate
    #[error("Invalid qps: {0}")]
    InvalidQps(String),

    /// Invalid run duration
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// Invalid call timeout
    #[error("Invalid call timeout: {0}")]
    InvalidTimeout(String),

    /// Invalid tick period
    #[error("Invalid tick: {0}")]
    InvalidTick(String),
}
