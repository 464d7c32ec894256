//! Orchestrator execution logic

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast;

use crate::config::LoadConfig;
use crate::driver::{ConnectOptions, Driver};
use crate::error::CoreResult;
use crate::pacer::PacerBuilder;
use crate::pool::ConnectionPool;
use crate::sink::{ResultConsumer, ResultHandler, ResultSink};
use crate::status::StatusMachine;

use super::summary::{aggregate_pacer_stats, RunSummary};

/// Orchestrator manages the run lifecycle
///
/// Responsible for pool construction, spawning pacers, coordinating the
/// deadline-driven shutdown, and collecting the terminal summary.
pub struct Orchestrator {
    /// Run configuration
    pub(crate) config: LoadConfig,

    /// Protocol driver (shared across pacers)
    pub(crate) driver: Arc<dyn Driver>,

    /// Shared run lifecycle word
    pub(crate) status: Arc<StatusMachine>,

    /// Producer side of the result channel (cloned into every call)
    pub(crate) sink: ResultSink,

    /// The single consumer side of the result channel
    pub(crate) consumer: ResultConsumer,

    /// Shutdown signal sender
    pub(crate) shutdown_tx: broadcast::Sender<()>,
}

/// Handle that triggers the Running -> Stopping transition from outside
///
/// Cheap to clone; the transition is idempotent, so any number of handles
/// may fire concurrently.
#[derive(Clone)]
pub struct StopHandle {
    status: Arc<StatusMachine>,
    shutdown_tx: broadcast::Sender<()>,
}

impl StopHandle {
    /// Trigger shutdown
    pub fn stop(&self, reason: &str) {
        if self.status.begin_stopping() {
            tracing::info!(reason, "stopping load run");
        }
        let _ = self.shutdown_tx.send(());
    }
}

impl Orchestrator {
    /// Get a handle onto the shared status machine
    pub fn status(&self) -> Arc<StatusMachine> {
        Arc::clone(&self.status)
    }

    /// Get the run configuration
    pub fn config(&self) -> &LoadConfig {
        &self.config
    }

    /// Get a stop handle for triggering shutdown externally
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            status: Arc::clone(&self.status),
            shutdown_tx: self.shutdown_tx.clone(),
        }
    }

    /// Run the load generation to completion
    ///
    /// `handler` is invoked once per consumed result, both while the run is
    /// live and during the final drain pass. Returns the terminal summary.
    ///
    /// # Errors
    ///
    /// Fails fast if the connection pool cannot be fully built; no traffic
    /// is generated in that case.
    pub async fn run<H>(mut self, handler: &mut H) -> CoreResult<RunSummary>
    where
        H: ResultHandler + ?Sized,
    {
        let start = Instant::now();

        tracing::info!(
            connections = self.config.connections,
            qps = self.config.qps,
            duration_secs = self.config.duration.as_secs(),
            driver = self.driver.name(),
            "starting load run"
        );

        let options = ConnectOptions {
            timeout: self.config.connect_timeout,
        };
        let pool = ConnectionPool::build(&self.driver, self.config.connections, &options).await?;

        // Running must be entered before the first pacer spawns so that no
        // result can race the transition.
        self.status.start_running();

        let mut handles = Vec::with_capacity(self.config.connections);
        for (id, connection) in pool.into_connections().into_iter().enumerate() {
            let pacer = PacerBuilder::new(id)
                .driver(Arc::clone(&self.driver))
                .connection(connection)
                .qps(self.config.qps)
                .tick(self.config.tick)
                .call_timeout(self.config.call_timeout)
                .drain_grace(self.config.drain_grace)
                .sink(self.sink.clone())
                .status(Arc::clone(&self.status))
                .build()?;

            let shutdown_rx = self.shutdown_tx.subscribe();
            handles.push(tokio::spawn(async move { pacer.run(shutdown_rx).await }));
        }

        // Consume results opportunistically until the deadline fires or an
        // early stop trigger lands.
        let deadline = self.config.duration + self.config.shutdown_grace;
        let mut early_stop = self.shutdown_tx.subscribe();
        let stop_wait = async move {
            tokio::select! {
                _ = tokio::time::sleep(deadline) => {}
                _ = early_stop.recv() => {}
            }
        };
        let consumed = self.consumer.consume_until(stop_wait, handler).await;

        // Deadline expiry and pacer-observed triggers collapse on one CAS.
        if self.status.begin_stopping() {
            tracing::info!(
                elapsed_secs = start.elapsed().as_secs_f64(),
                "deadline reached, stopping load run"
            );
        }
        let _ = self.shutdown_tx.send(());

        // Fan-in: every pacer must exit before the final drain.
        let mut pacer_stats = Vec::with_capacity(handles.len());
        for (id, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(stats) => pacer_stats.push(stats),
                Err(error) => {
                    tracing::error!(pacer_id = id, %error, "pacer task panicked");
                }
            }
        }

        // No writer can succeed once the run left Running, so this pass
        // terminates as soon as the buffer is empty.
        let drained = self.consumer.drain(handler);

        self.status.finish_stopping();

        let summary = RunSummary {
            total_calls: self.driver.total_calls(),
            consumed,
            drained,
            dropped: self.sink.dropped(),
            rejected: self.sink.rejected(),
            pacers: aggregate_pacer_stats(&pacer_stats),
            elapsed: start.elapsed(),
        };

        tracing::info!(
            total_calls = summary.total_calls,
            consumed = summary.consumed,
            drained = summary.drained,
            dropped = summary.dropped,
            rejected = summary.rejected,
            "load run finished"
        );

        Ok(summary)
    }

    /// Run with Ctrl+C signal handling
    ///
    /// Automatically triggers graceful shutdown on Ctrl+C.
    pub async fn run_with_signal_handling<H>(self, handler: &mut H) -> CoreResult<RunSummary>
    where
        H: ResultHandler + ?Sized,
    {
        let stop = self.stop_handle();

        // Spawn signal handler task
        let signal_handle = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => stop.stop("ctrl-c"),
                Err(error) => {
                    tracing::error!(%error, "failed to listen for ctrl-c");
                }
            }
        });

        let result = self.run(handler).await;

        // Abort signal handler if still running
        signal_handle.abort();

        result
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("driver", &self.driver.name())
            .field("status", &self.status.current())
            .finish()
    }
}
