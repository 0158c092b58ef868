//! Stepped Clock
//!
//! A clock whose elapsed time is set by its owner rather than measured.
//! Both the verifier and the live scheduler drive machines with it; the
//! verifier additionally reads back the thresholds queried during a step.

use super::{Clock, ScheduleTiming};
use llfsm_core::{ExecutableId, TimeNs};
use std::collections::BTreeSet;

/// Clock with a forced elapsed time
#[derive(Debug, Clone)]
pub struct SteppedClock<'t> {
    timing: &'t ScheduleTiming,
    elapsed: TimeNs,
    queried: BTreeSet<TimeNs>,
}

impl<'t> SteppedClock<'t> {
    /// Create a clock reporting `elapsed`
    #[must_use]
    pub const fn new(timing: &'t ScheduleTiming, elapsed: TimeNs) -> Self {
        Self {
            timing,
            elapsed,
            queried: BTreeSet::new(),
        }
    }

    /// Thresholds passed to [`Clock::after`] so far
    #[must_use]
    pub const fn queried(&self) -> &BTreeSet<TimeNs> {
        &self.queried
    }

    /// Consumes the clock, returning the queried thresholds
    #[must_use]
    pub fn into_queried(self) -> BTreeSet<TimeNs> {
        self.queried
    }
}

impl Clock for SteppedClock<'_> {
    fn after(&mut self, duration: TimeNs) -> bool {
        self.queried.insert(duration);
        self.elapsed > duration
    }

    fn elapsed(&self) -> TimeNs {
        self.elapsed
    }

    fn ringlet_length(&self, id: ExecutableId) -> Option<TimeNs> {
        self.timing.ringlet_length(id)
    }

    fn schedule_length(&self) -> TimeNs {
        self.timing.schedule_length
    }
}
