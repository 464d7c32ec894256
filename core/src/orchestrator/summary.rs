//! Run summary and pacer stat aggregation

use std::time::Duration;

use crate::pacer::PacerStats;

/// Aggregated statistics from all pacers
#[derive(Debug, Clone, Default)]
pub struct AggregatedPacerStats {
    /// Number of pacers that ran
    pub total_pacers: usize,

    /// Total pacing ticks across all pacers
    pub total_batches: u64,

    /// Total calls dispatched
    pub total_dispatched: u64,

    /// Total batch slots suppressed by the in-flight limit
    pub total_suppressed: u64,

    /// Total in-flight calls abandoned at shutdown
    pub total_abandoned: u64,

    /// Maximum elapsed time across all pacers
    pub total_duration: Duration,

    /// Overall dispatched calls per second
    pub dispatch_rate: f64,
}

/// Aggregate statistics from multiple pacers
pub fn aggregate_pacer_stats(stats: &[PacerStats]) -> AggregatedPacerStats {
    if stats.is_empty() {
        return AggregatedPacerStats::default();
    }

    let total_batches: u64 = stats.iter().map(|s| s.batches).sum();
    let total_dispatched: u64 = stats.iter().map(|s| s.dispatched).sum();
    let total_suppressed: u64 = stats.iter().map(|s| s.suppressed).sum();
    let total_abandoned: u64 = stats.iter().map(|s| s.abandoned).sum();

    // Use the maximum elapsed time across all pacers
    let total_duration = stats
        .iter()
        .filter_map(|s| s.elapsed())
        .max()
        .unwrap_or(Duration::ZERO);

    let secs = total_duration.as_secs_f64();
    let dispatch_rate = if secs > 0.0 {
        total_dispatched as f64 / secs
    } else {
        0.0
    };

    AggregatedPacerStats {
        total_pacers: stats.len(),
        total_batches,
        total_dispatched,
        total_suppressed,
        total_abandoned,
        total_duration,
        dispatch_rate,
    }
}

/// Terminal summary of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Total calls issued, as reported by the driver's internal counter
    pub total_calls: u64,

    /// Results consumed while the run was live
    pub consumed: usize,

    /// Results recovered by the final drain pass
    pub drained: usize,

    /// Results dropped because the buffer was full
    pub dropped: u64,

    /// Results rejected after the run left the Running phase
    pub rejected: u64,

    /// Aggregated pacer statistics
    pub pacers: AggregatedPacerStats,

    /// Wall-clock duration of the whole run, setup included
    pub elapsed: Duration,
}

impl RunSummary {
    /// Results that reached the consumer, live or drained
    pub fn delivered(&self) -> usize {
        self.consumed + self.drained
    }
}
