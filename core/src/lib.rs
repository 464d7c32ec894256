//! loadgen-core: Concurrency and lifecycle engine for paced load generation
//!
//! This crate provides the engine that drives a configurable number of
//! parallel connections against a remote service, including:
//!
//! - Connection pool construction (fail-fast)
//! - Per-connection rate pacing and bounded concurrent dispatch
//! - Bounded result collection with drop-on-full backpressure
//! - A monotonic status state machine coordinating graceful shutdown
//! - The pluggable protocol driver contract and registry
//!
//! Everything protocol-specific lives behind the [`Driver`] trait; this
//! crate never touches a wire format, never retries, and paces by tick
//! rather than token bucket.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod config;
pub mod driver;
pub mod error;
pub mod orchestrator;
pub mod pacer;
pub mod pool;
pub mod request;
pub mod response;
pub mod sink;
pub mod status;

pub use channel::ChannelConfig;
pub use config::{ConfigError, LoadConfig};
pub use driver::{
    ConnectOptions, Connection, Driver, DriverConfig, DriverError, DriverFactory, DriverRegistry,
};
pub use error::{CoreError, CoreResult};
pub use orchestrator::{
    aggregate_pacer_stats, AggregatedPacerStats, Orchestrator, OrchestratorBuilder, RunSummary,
    StopHandle,
};
pub use pacer::{Pacer, PacerBuilder, PacerStats};
pub use pool::ConnectionPool;
pub use request::{CallRequest, RequestId};
pub use response::{CallResponse, CallResult, CallStatus};
pub use sink::{result_channel, ResultConsumer, ResultHandler, ResultSink, SinkPush};
pub use status::{Status, StatusMachine};
