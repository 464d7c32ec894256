//! Pluggable protocol driver capability and registry
//!
//! The engine never touches a wire protocol itself. Everything
//! protocol-specific — opening a connection, shaping a request, performing
//! the call, translating the outcome — lives behind the [`Driver`] trait.
//! Backends are selected by name from an explicit [`DriverRegistry`]: a
//! mapping from driver name to constructor, populated by registration calls
//! at startup. Nothing registers itself as a side effect of being linked in.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::request::{CallRequest, RequestId};
use crate::response::{CallResponse, CallResult};

/// Errors produced by protocol drivers
#[derive(Debug, Error)]
pub enum DriverError {
    /// The requested driver name is not registered
    #[error("unknown driver {name:?} (registered: {registered:?})")]
    UnknownDriver {
        /// The name that failed to resolve
        name: String,
        /// Names that are registered
        registered: Vec<String>,
    },

    /// Connection establishment failed
    #[error("connection failed: {0}")]
    Connect(String),

    /// Connection establishment did not finish within the creation timeout
    #[error("connection creation timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// Request construction failed; the call is abandoned without a result
    #[error("failed to build request: {0}")]
    BuildRequest(String),

    /// The call failed at the protocol or transport layer
    #[error("call failed: {0}")]
    Call(String),

    /// The call did not complete within its timeout
    #[error("call timed out after {0:?}")]
    CallTimeout(Duration),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Options for selecting and constructing a driver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Server to connect to
    pub host: String,

    /// Port to connect to
    pub port: u16,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 50051,
        }
    }
}

/// Options for creating a single connection
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConnectOptions {
    /// Budget for one connection creation
    pub timeout: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
        }
    }
}

/// Opaque connection handle owned by a driver
///
/// Connections are created once during setup and shared read-only by many
/// concurrent calls; the engine never touches connection state. Drivers
/// recover their concrete type through [`Connection::as_any`].
pub trait Connection: Send + Sync {
    /// Downcast support for driver implementations
    fn as_any(&self) -> &dyn Any;
}

/// The pluggable protocol capability consumed by the engine
///
/// A driver is owned for the process lifetime and shared across every pacer
/// and in-flight call; implementations must be stateless between calls apart
/// from their internal call counter.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Driver name, matching its registry entry
    fn name(&self) -> &str;

    /// Open one connection to the target
    async fn create_connection(
        &self,
        options: &ConnectOptions,
    ) -> Result<Arc<dyn Connection>, DriverError>;

    /// Construct the next request, assigning it a fresh id
    fn build_request(&self) -> Result<CallRequest, DriverError>;

    /// Perform one call on the given connection
    async fn call(
        &self,
        connection: &dyn Connection,
        request: CallRequest,
    ) -> Result<CallResponse, DriverError>;

    /// Translate a call outcome into a result record
    ///
    /// Failures are encoded into the result's status here; the dispatch
    /// layer never interprets call errors itself.
    fn build_result(
        &self,
        request_id: RequestId,
        outcome: Result<CallResponse, DriverError>,
        elapsed: Duration,
    ) -> CallResult;

    /// Total calls issued so far, for the terminal summary
    fn total_calls(&self) -> u64;
}

/// Factory producing a driver from selection options
pub type DriverFactory =
    Arc<dyn Fn(&DriverConfig) -> Result<Arc<dyn Driver>, DriverError> + Send + Sync>;

/// Explicit name-to-factory mapping for driver selection
#[derive(Clone, Default)]
pub struct DriverRegistry {
    factories: HashMap<String, DriverFactory>,
}

impl DriverRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a driver factory under the given name
    ///
    /// Re-registering a name replaces the previous factory.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&DriverConfig) -> Result<Arc<dyn Driver>, DriverError> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Construct the driver registered under `name`
    pub fn create(
        &self,
        name: &str,
        config: &DriverConfig,
    ) -> Result<Arc<dyn Driver>, DriverError> {
        match self.factories.get(name) {
            Some(factory) => factory(config),
            None => Err(DriverError::UnknownDriver {
                name: name.to_string(),
                registered: self.names(),
            }),
        }
    }

    /// Whether a driver is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered driver names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("drivers", &self.names())
            .finish()
    }
}
