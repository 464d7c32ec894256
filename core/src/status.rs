//! Run lifecycle state machine
//!
//! The run status is a single process-wide word advanced strictly forward:
//! Starting -> Running -> Stopping -> Stopped. Every transition goes through
//! a compare-and-swap so concurrent triggers collapse to one winner; the
//! losers observe a no-op. The machine is owned by the orchestrator and
//! handed to components as an `Arc<StatusMachine>` — there is no global.

use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle phase of a load run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Setup: connections are being created, no pacer has started
    Starting,
    /// Load is being generated and results are accepted
    Running,
    /// Shutdown was triggered; pacers are winding down
    Stopping,
    /// All pacers exited and the final drain pass completed
    Stopped,
}

impl Status {
    fn from_u8(value: u8) -> Status {
        match value {
            0 => Status::Starting,
            1 => Status::Running,
            2 => Status::Stopping,
            _ => Status::Stopped,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Status::Starting => 0,
            Status::Running => 1,
            Status::Stopping => 2,
            Status::Stopped => 3,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Starting => write!(f, "starting"),
            Status::Running => write!(f, "running"),
            Status::Stopping => write!(f, "stopping"),
            Status::Stopped => write!(f, "stopped"),
        }
    }
}

/// CAS-guarded lifecycle word shared by every component of a run
///
/// Only the three named transitions exist; re-entering `Running` or skipping
/// `Stopping` is unrepresentable through this API.
#[derive(Debug)]
pub struct StatusMachine {
    state: AtomicU8,
}

impl StatusMachine {
    /// Create a new machine in the `Starting` phase
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(Status::Starting.as_u8()),
        }
    }

    /// Read the current phase
    pub fn current(&self) -> Status {
        Status::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Whether the run currently accepts results
    pub fn is_running(&self) -> bool {
        self.current() == Status::Running
    }

    fn transition(&self, from: Status, to: Status) -> bool {
        self.state
            .compare_exchange(
                from.as_u8(),
                to.as_u8(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    /// Starting -> Running. Performed once, before any pacer starts.
    ///
    /// Returns `false` if the machine already advanced, which indicates a
    /// programming error in the caller.
    pub fn start_running(&self) -> bool {
        let ok = self.transition(Status::Starting, Status::Running);
        debug_assert!(ok, "start_running called with status already advanced");
        ok
    }

    /// Running -> Stopping. Safe to call from any number of concurrent
    /// shutdown triggers; exactly one caller wins and the rest are no-ops.
    pub fn begin_stopping(&self) -> bool {
        self.transition(Status::Running, Status::Stopping)
    }

    /// Stopping -> Stopped. Performed once, after the pacer fan-in and the
    /// final drain pass.
    pub fn finish_stopping(&self) -> bool {
        let ok = self.transition(Status::Stopping, Status::Stopped);
        debug_assert!(ok, "finish_stopping called outside the Stopping phase");
        ok
    }
}

impl Default for StatusMachine {
    fn default() -> Self {
        Self::new()
    }
}
