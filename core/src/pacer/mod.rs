//! Per-connection pacing and call dispatch
//!
//! One Pacer runs per connection as an independent tokio task. Its loop is
//! deliberately simple: **wait for tick -> dispatch batch -> repeat** until
//! the shutdown signal is observed. Each tick triggers one batch of `qps`
//! dispatch attempts; every dispatched call runs as its own short-lived task
//! under its own timeout, so batches may overlap in flight and a tick never
//! waits on the previous batch.
//!
//! A per-connection semaphore with `qps` permits bounds how many calls can
//! be in flight at once: when the backend is slower than the tick period,
//! batch slots without a free permit are suppressed and counted instead of
//! spawned, so concurrency cannot grow without bound across overlapping
//! ticks.
//!
//! # Example
//!
//! ```ignore
//! use loadgen_core::pacer::PacerBuilder;
//!
//! let pacer = PacerBuilder::new(0)
//!     .driver(driver)
//!     .connection(connection)
//!     .qps(10)
//!     .sink(sink)
//!     .status(status)
//!     .build()?;
//!
//! let stats = pacer.run(shutdown_rx).await;
//! println!("batches: {}", stats.batches);
//! ```

mod builder;
mod executor;
mod stats;

pub use builder::PacerBuilder;
pub use executor::Pacer;
pub use stats::PacerStats;
