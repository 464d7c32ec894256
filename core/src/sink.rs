//! Bounded, lossy result collection
//!
//! Every in-flight call publishes its outcome through a [`ResultSink`];
//! exactly one [`ResultConsumer`] reads. The channel is the concurrency
//! primitive: writes are non-blocking and the capacity bound is enforced by
//! the channel itself, so producers never take a lock and never stall the
//! offered load. When the run is not in the `Running` phase the write is
//! rejected outright; when the buffer is full the newest result is dropped
//! with a warning. Slow consumption degrades observability, never load.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};

use crate::response::CallResult;
use crate::status::StatusMachine;

/// Verdict of a non-blocking sink write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkPush {
    /// The result was enqueued
    Accepted,
    /// The run is not in the `Running` phase; the result was discarded
    NotRunning,
    /// The buffer was at capacity; this (newest) result was discarded
    Full,
}

#[derive(Debug, Default)]
struct SinkCounters {
    dropped: AtomicU64,
    rejected: AtomicU64,
}

/// Multi-producer write handle for completed call results
///
/// Cheap to clone; every dispatched call holds one.
#[derive(Clone)]
pub struct ResultSink {
    tx: mpsc::Sender<CallResult>,
    status: Arc<StatusMachine>,
    counters: Arc<SinkCounters>,
}

impl ResultSink {
    /// Publish a result without blocking
    pub fn push(&self, result: CallResult) -> SinkPush {
        if !self.status.is_running() {
            self.counters.rejected.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                request_id = %result.request_id,
                status = %self.status.current(),
                "result rejected, run no longer accepting results"
            );
            return SinkPush::NotRunning;
        }

        match self.tx.try_send(result) {
            Ok(()) => SinkPush::Accepted,
            Err(TrySendError::Full(result)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    request_id = %result.request_id,
                    "result channel full, dropping result"
                );
                SinkPush::Full
            }
            Err(TrySendError::Closed(result)) => {
                // Consumer gone; indistinguishable from shutdown for producers.
                self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    request_id = %result.request_id,
                    "result channel closed, discarding result"
                );
                SinkPush::NotRunning
            }
        }
    }

    /// Results dropped because the buffer was full
    pub fn dropped(&self) -> u64 {
        self.counters.dropped.load(Ordering::Relaxed)
    }

    /// Results rejected because the run was not accepting them
    pub fn rejected(&self) -> u64 {
        self.counters.rejected.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for ResultSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultSink")
            .field("capacity", &self.tx.max_capacity())
            .field("dropped", &self.dropped())
            .field("rejected", &self.rejected())
            .finish()
    }
}

/// Handler invoked once for every consumed result
pub trait ResultHandler {
    /// Process one result
    fn handle(&mut self, result: CallResult);
}

impl<F: FnMut(CallResult)> ResultHandler for F {
    fn handle(&mut self, result: CallResult) {
        self(result)
    }
}

/// The single consumer end of the result channel
///
/// One abstraction, two modes: [`consume_until`](Self::consume_until) reads
/// opportunistically while the run is live, and [`drain`](Self::drain)
/// empties whatever is buffered without waiting for more — safe after
/// shutdown because no writer can succeed once the run left `Running`.
pub struct ResultConsumer {
    rx: mpsc::Receiver<CallResult>,
}

/// Build a connected sink/consumer pair gated on `status`
pub fn result_channel(
    capacity: usize,
    status: Arc<StatusMachine>,
) -> (ResultSink, ResultConsumer) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let sink = ResultSink {
        tx,
        status,
        counters: Arc::new(SinkCounters::default()),
    };
    (sink, ResultConsumer { rx })
}

impl ResultConsumer {
    /// Consume results until `stop` completes or every producer is gone
    ///
    /// Returns the number of results handled.
    pub async fn consume_until<S, H>(&mut self, stop: S, handler: &mut H) -> usize
    where
        S: std::future::Future<Output = ()>,
        H: ResultHandler + ?Sized,
    {
        tokio::pin!(stop);
        let mut consumed = 0;

        loop {
            tokio::select! {
                _ = &mut stop => break,
                next = self.rx.recv() => match next {
                    Some(result) => {
                        handler.handle(result);
                        consumed += 1;
                    }
                    None => break,
                },
            }
        }

        consumed
    }

    /// Drain everything currently buffered, returning immediately on empty
    pub fn drain<H>(&mut self, handler: &mut H) -> usize
    where
        H: ResultHandler + ?Sized,
    {
        let mut drained = 0;

        loop {
            match self.rx.try_recv() {
                Ok(result) => {
                    handler.handle(result);
                    drained += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        drained
    }
}

impl std::fmt::Debug for ResultConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultConsumer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestId;
    use crate::response::{CallResult, CallStatus};
    use std::time::Duration;

    fn sample_result(id: u64) -> CallResult {
        CallResult {
            request_id: RequestId(id),
            status: CallStatus::Success,
            elapsed: Duration::from_millis(1),
            response: None,
            completed_at: chrono::Utc::now(),
        }
    }

    fn running_machine() -> Arc<StatusMachine> {
        let status = Arc::new(StatusMachine::new());
        status.start_running();
        status
    }

    #[test]
    fn test_push_rejected_before_running() {
        let status = Arc::new(StatusMachine::new());
        let (sink, mut consumer) = result_channel(16, status);

        assert_eq!(sink.push(sample_result(1)), SinkPush::NotRunning);
        assert_eq!(sink.rejected(), 1);
        assert_eq!(consumer.drain(&mut |_r: CallResult| {}), 0);
    }

    #[test]
    fn test_push_rejected_after_stopping() {
        let status = running_machine();
        let (sink, mut consumer) = result_channel(16, Arc::clone(&status));

        assert_eq!(sink.push(sample_result(1)), SinkPush::Accepted);
        status.begin_stopping();
        assert_eq!(sink.push(sample_result(2)), SinkPush::NotRunning);

        // only the accepted result is buffered
        assert_eq!(consumer.drain(&mut |_r: CallResult| {}), 1);
    }

    #[test]
    fn test_push_drops_newest_when_full() {
        let status = running_machine();
        let (sink, mut consumer) = result_channel(1, status);

        assert_eq!(sink.push(sample_result(1)), SinkPush::Accepted);
        assert_eq!(sink.push(sample_result(2)), SinkPush::Full);
        assert_eq!(sink.dropped(), 1);

        let mut seen = Vec::new();
        consumer.drain(&mut |r: CallResult| seen.push(r.request_id));
        // the oldest entry survives; the newest was the one dropped
        assert_eq!(seen, vec![RequestId(1)]);
    }

    #[test]
    fn test_capacity_is_never_exceeded() {
        let status = running_machine();
        let capacity = 8;
        let (sink, mut consumer) = result_channel(capacity, status);

        let mut accepted = 0;
        for id in 0..capacity as u64 + 5 {
            if sink.push(sample_result(id)) == SinkPush::Accepted {
                accepted += 1;
            }
        }

        assert_eq!(accepted, capacity);
        assert_eq!(sink.dropped(), 5);
        assert_eq!(consumer.drain(&mut |_r: CallResult| {}), capacity);
    }

    #[test]
    fn test_concurrent_writers_one_slot() {
        let status = running_machine();
        let (sink, mut consumer) = result_channel(1, status);

        let writers: Vec<_> = (0..2)
            .map(|id| {
                let sink = sink.clone();
                std::thread::spawn(move || sink.push(sample_result(id)))
            })
            .collect();

        let verdicts: Vec<SinkPush> = writers.into_iter().map(|h| h.join().unwrap()).collect();

        let accepted = verdicts.iter().filter(|v| **v == SinkPush::Accepted).count();
        let dropped = verdicts.iter().filter(|v| **v == SinkPush::Full).count();
        assert_eq!(accepted, 1);
        assert_eq!(dropped, 1);
        assert_eq!(sink.dropped(), 1);
        assert_eq!(consumer.drain(&mut |_r: CallResult| {}), 1);
    }

    #[tokio::test]
    async fn test_consume_until_stop_future() {
        let status = running_machine();
        let (sink, mut consumer) = result_channel(16, status);

        for id in 0..3 {
            assert_eq!(sink.push(sample_result(id)), SinkPush::Accepted);
        }

        let mut seen = 0;
        let consumed = consumer
            .consume_until(tokio::time::sleep(Duration::from_millis(20)), &mut |_r: CallResult| {
                seen += 1;
            })
            .await;

        assert_eq!(consumed, 3);
        assert_eq!(seen, 3);
    }

    #[test]
    fn test_drain_on_empty_returns_immediately() {
        let status = running_machine();
        let (_sink, mut consumer) = result_channel(4, status);
        assert_eq!(consumer.drain(&mut |_r: CallResult| {}), 0);
    }
}
