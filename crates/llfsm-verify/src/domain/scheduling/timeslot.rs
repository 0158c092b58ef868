//! Timeslots
//!
//! A [`Timeslot`] is a window of schedule time in which one executable
//! (plus anything it calls) runs exactly one ringlet.
//!
//! ```text
//!   starting_time            end_time = starting_time + duration
//!        │◀──────── duration ────────▶│
//! ───────┼────────────────────────────┼─────▶ schedule time
//! ```
//!
//! Ranges are closed: two timeslots that touch at an endpoint overlap.

use crate::domain::call::CallChain;
use llfsm_core::{ExecutableId, TimeNs};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// Scheduled time window
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timeslot {
    /// Executables active in this window
    pub executables: BTreeSet<ExecutableId>,
    /// Calls active while the window executes
    pub call_chain: CallChain,
    /// Offset from the start of the cycle
    pub starting_time: TimeNs,
    /// Length of the window
    pub duration: TimeNs,
    /// Consecutive ringlets of the root that did not transition
    pub cycles_executed: u64,
}

impl Timeslot {
    /// Timeslot running `executable` alone
    #[must_use]
    pub fn new(executable: ExecutableId, starting_time: TimeNs, duration: TimeNs) -> Self {
        Self {
            executables: BTreeSet::from([executable]),
            call_chain: CallChain::new(executable),
            starting_time,
            duration,
            cycles_executed: 0,
        }
    }

    /// Root executable of the call chain
    #[must_use]
    pub const fn executable(&self) -> ExecutableId {
        self.call_chain.root()
    }

    /// End of the window, saturating at `TimeNs::MAX`
    #[must_use]
    pub const fn end_time(&self) -> TimeNs {
        self.starting_time.saturating_add(self.duration)
    }

    /// Closed range covered by the window
    #[must_use]
    pub const fn time_range(&self) -> RangeInclusive<TimeNs> {
        self.starting_time..=self.end_time()
    }

    /// Whether the closed ranges intersect
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.starting_time <= other.end_time() && other.starting_time <= self.end_time()
    }

    /// Copy with a different cycle counter
    #[must_use]
    pub fn with_cycles_executed(&self, cycles_executed: u64) -> Self {
        Self {
            cycles_executed,
            ..self.clone()
        }
    }

    /// Time from the end of this window until `time` in a cycle of length
    /// `cycle_length`, wrapping into the next cycle if `time` is earlier
    #[must_use]
    pub const fn after_executing_time_until(&self, time: TimeNs, cycle_length: TimeNs) -> TimeNs {
        let current = self.end_time();
        if time >= current {
            time - current
        } else {
            cycle_length.saturating_sub(current).saturating_add(time)
        }
    }

    /// Time from the end of this window until `other` starts
    #[must_use]
    pub const fn after_executing_time_until_timeslot(&self, other: &Self, cycle_length: TimeNs) -> TimeNs {
        self.after_executing_time_until(other.starting_time, cycle_length)
    }
}
