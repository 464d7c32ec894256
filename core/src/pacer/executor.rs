//! Pacer execution loop and call dispatch

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::driver::{Connection, Driver, DriverError};
use crate::sink::ResultSink;
use crate::status::StatusMachine;

use super::stats::PacerStats;

/// Per-connection timer-driven loop that triggers batches of calls
///
/// Pacers are independent tokio tasks managed by the Orchestrator. They
/// share the driver, the status machine, and the result sink; each owns one
/// connection and a `qps`-permit semaphore bounding its in-flight calls.
pub struct Pacer {
    /// Pacer identifier (the connection index)
    pub(crate) id: usize,

    /// Protocol driver (shared across pacers via Arc)
    pub(crate) driver: Arc<dyn Driver>,

    /// The connection this pacer drives
    pub(crate) connection: Arc<dyn Connection>,

    /// Calls attempted per tick
    pub(crate) qps: u32,

    /// Tick period; drift is not compensated
    pub(crate) tick: Duration,

    /// Per-call timeout, independent of the run deadline
    pub(crate) call_timeout: Duration,

    /// How long to wait for the in-flight batch at shutdown
    pub(crate) drain_grace: Duration,

    /// Result sink written by every dispatched call
    pub(crate) sink: ResultSink,

    /// Shared run lifecycle word
    pub(crate) status: Arc<StatusMachine>,

    /// In-flight bound: `qps` permits
    pub(crate) inflight: Arc<Semaphore>,
}

impl Pacer {
    /// Run the pacing loop until the shutdown signal is observed
    ///
    /// The first batch fires one tick period after start. On shutdown the
    /// pacer invokes the shared stop transition, then waits up to the drain
    /// grace for its in-flight calls before abandoning the stragglers.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> PacerStats {
        let mut stats = PacerStats::new();
        stats.start();

        let mut batch = JoinSet::new();
        let mut ticker = time::interval_at(Instant::now() + self.tick, self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::debug!(pacer_id = self.id, qps = self.qps, "pacer started");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.recv() => {
                    if self.status.begin_stopping() {
                        tracing::info!(pacer_id = self.id, "shutdown observed, stopping run");
                    }
                    break;
                }

                _ = ticker.tick() => {
                    stats.record_batch();
                    self.dispatch_batch(&mut batch, &mut stats);
                }
            }
        }

        self.drain_batch(&mut batch, &mut stats).await;

        stats.stop();
        tracing::debug!(
            pacer_id = self.id,
            batches = stats.batches,
            dispatched = stats.dispatched,
            suppressed = stats.suppressed,
            abandoned = stats.abandoned,
            "pacer finished"
        );

        stats
    }

    /// Launch one batch of `qps` dispatch attempts
    ///
    /// The batch is not awaited; ticks never block on in-flight calls.
    fn dispatch_batch(&self, batch: &mut JoinSet<()>, stats: &mut PacerStats) {
        // Reap calls that finished since the last tick so the set stays small.
        while batch.try_join_next().is_some() {}

        let mut suppressed_now = 0u32;
        for _ in 0..self.qps {
            match Arc::clone(&self.inflight).try_acquire_owned() {
                Ok(permit) => {
                    stats.record_dispatched();
                    batch.spawn(dispatch(
                        Arc::clone(&self.driver),
                        Arc::clone(&self.connection),
                        self.call_timeout,
                        self.sink.clone(),
                        permit,
                    ));
                }
                Err(_) => {
                    suppressed_now += 1;
                    stats.record_suppressed();
                }
            }
        }

        if suppressed_now > 0 {
            tracing::warn!(
                pacer_id = self.id,
                suppressed = suppressed_now,
                "in-flight limit reached, suppressing batch slots"
            );
        }
    }

    /// Wait for the in-flight batch at shutdown, bounded by the drain grace
    ///
    /// Results completing after the stop transition are rejected by the sink
    /// regardless; the bounded wait exists so in-flight calls terminate
    /// inside the run and are accounted for.
    async fn drain_batch(&self, batch: &mut JoinSet<()>, stats: &mut PacerStats) {
        if batch.is_empty() {
            return;
        }

        let wait = async {
            while batch.join_next().await.is_some() {}
        };

        if time::timeout(self.drain_grace, wait).await.is_err() {
            let stragglers = batch.len() as u64;
            stats.record_abandoned(stragglers);
            batch.abort_all();
            tracing::warn!(
                pacer_id = self.id,
                abandoned = stragglers,
                "in-flight calls exceeded drain grace, aborting"
            );
        }
    }
}

impl std::fmt::Debug for Pacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pacer")
            .field("id", &self.id)
            .field("driver", &self.driver.name())
            .field("qps", &self.qps)
            .field("tick", &self.tick)
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}

/// Issue one call: build the request, execute it under its own timeout, and
/// publish the driver-built result
///
/// The permit is held for the whole call lifetime; dropping it on exit
/// releases the in-flight slot.
async fn dispatch(
    driver: Arc<dyn Driver>,
    connection: Arc<dyn Connection>,
    call_timeout: Duration,
    sink: ResultSink,
    _permit: OwnedSemaphorePermit,
) {
    let request = match driver.build_request() {
        Ok(request) => request,
        Err(error) => {
            on_build_error(&error);
            return;
        }
    };
    let request_id = request.id;

    let start = std::time::Instant::now();
    let outcome = match time::timeout(call_timeout, driver.call(connection.as_ref(), request)).await
    {
        Ok(outcome) => outcome,
        Err(_) => Err(DriverError::CallTimeout(call_timeout)),
    };

    let result = driver.build_result(request_id, outcome, start.elapsed());
    sink.push(result);
}

/// Hook for recoverable request-construction failures
///
/// The call is abandoned without a result and without a retry.
fn on_build_error(error: &DriverError) {
    tracing::debug!(%error, "request construction failed, abandoning call");
}
