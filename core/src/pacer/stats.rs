//! Pacer statistics tracking

use std::time::Instant;

/// Statistics tracked by each pacer
#[derive(Debug, Default, Clone)]
pub struct PacerStats {
    /// Number of pacing ticks that fired
    pub batches: u64,

    /// Calls actually dispatched
    pub dispatched: u64,

    /// Batch slots suppressed because the in-flight limit was reached
    pub suppressed: u64,

    /// In-flight calls aborted because they outlived the drain grace at
    /// shutdown
    pub abandoned: u64,

    /// Pacer start time
    pub started_at: Option<Instant>,

    /// Pacer end time
    pub ended_at: Option<Instant>,
}

impl PacerStats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking (records start time)
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// Stop tracking (records end time)
    pub fn stop(&mut self) {
        self.ended_at = Some(Instant::now());
    }

    /// Total dispatch attempts (dispatched + suppressed)
    pub fn attempts(&self) -> u64 {
        self.dispatched + self.suppressed
    }

    /// Record one pacing tick
    pub fn record_batch(&mut self) {
        self.batches += 1;
    }

    /// Record one dispatched call
    pub fn record_dispatched(&mut self) {
        self.dispatched += 1;
    }

    /// Record one suppressed batch slot
    pub fn record_suppressed(&mut self) {
        self.suppressed += 1;
    }

    /// Record calls abandoned at shutdown
    pub fn record_abandoned(&mut self, count: u64) {
        self.abandoned += count;
    }

    /// Elapsed time since start
    pub fn elapsed(&self) -> Option<std::time::Duration> {
        self.started_at.map(|start| {
            self.ended_at
                .map(|end| end.duration_since(start))
                .unwrap_or_else(|| start.elapsed())
        })
    }

    /// Dispatched calls per second
    pub fn dispatch_rate(&self) -> f64 {
        self.elapsed()
            .map(|d| {
                let secs = d.as_secs_f64();
                if secs > 0.0 {
                    self.dispatched as f64 / secs
                } else {
                    0.0
                }
            })
            .unwrap_or(0.0)
    }

    /// Merge stats from another pacer
    pub fn merge(&mut self, other: &PacerStats) {
        self.batches += other.batches;
        self.dispatched += other.dispatched;
        self.suppressed += other.suppressed;
        self.abandoned += other.abandoned;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pacer_stats_defaults() {
        let stats = PacerStats::default();
        assert_eq!(stats.batches, 0);
        assert_eq!(stats.dispatched, 0);
        assert_eq!(stats.suppressed, 0);
        assert_eq!(stats.abandoned, 0);
        assert!(stats.started_at.is_none());
        assert!(stats.elapsed().is_none());
    }

    #[test]
    fn test_pacer_stats_attempts() {
        let mut stats = PacerStats::new();
        stats.record_dispatched();
        stats.record_dispatched();
        stats.record_suppressed();
        assert_eq!(stats.attempts(), 3);
    }

    #[test]
    fn test_pacer_stats_merge() {
        let mut a = PacerStats::new();
        a.batches = 3;
        a.dispatched = 30;
        a.suppressed = 2;

        let mut b = PacerStats::new();
        b.batches = 2;
        b.dispatched = 18;
        b.abandoned = 4;

        a.merge(&b);

        assert_eq!(a.batches, 5);
        assert_eq!(a.dispatched, 48);
        assert_eq!(a.suppressed, 2);
        assert_eq!(a.abandoned, 4);
    }

    #[test]
    fn test_pacer_stats_start_stop() {
        let mut stats = PacerStats::new();
        stats.start();
        std::thread::sleep(std::time::Duration::from_millis(5));
        stats.stop();

        assert!(stats.elapsed().unwrap() >= std::time::Duration::from_millis(5));
    }
}
