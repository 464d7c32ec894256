//! Orchestrator for run lifecycle management
//!
//! The Orchestrator coordinates a complete load run:
//! - Building the connection pool (fatal on the first failure)
//! - Advancing the status machine before any pacer starts
//! - Spawning one pacer task per connection
//! - Consuming results until the deadline or an early stop trigger
//! - Waiting for every pacer to exit, draining the sink, and producing the
//!   terminal summary
//!
//! # Example
//!
//! ```ignore
//! use loadgen_core::{LoadConfig, OrchestratorBuilder};
//!
//! let orchestrator = OrchestratorBuilder::new()
//!     .config(LoadConfig::new(2, 5))
//!     .driver(driver)
//!     .build()?;
//!
//! let summary = orchestrator
//!     .run(&mut |result| println!("{}", result.request_id))
//!     .await?;
//! println!("total calls:{}", summary.total_calls);
//! ```

mod builder;
mod executor;
mod summary;

pub use builder::OrchestratorBuilder;
pub use executor::{Orchestrator, StopHandle};
pub use summary::{aggregate_pacer_stats, AggregatedPacerStats, RunSummary};
