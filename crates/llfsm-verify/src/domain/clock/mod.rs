//! Clock Module
//!
//! # Overview
//!
//! Machines read time only through the [`Clock`] trait. The question they
//! ask is always of the form "has more than `d` elapsed since I entered my
//! current state?" which makes a guard a step function of elapsed time.
//!
//! ```text
//!   after(5)   ────────┐
//!   after(15)  ────────┼────────┐
//!                      ▼        ▼
//!   elapsed ──────────5────────15──────────▶
//!              false  │  true   │  true
//! ```
//!
//! # Architecture
//!
//! - [`SteppedClock`]: elapsed time is forced from outside. Every threshold
//!   passed to `after` is recorded so the time-aware ringlet builder can
//!   find the discontinuities of a guard.
//! - [`ScheduleTiming`]: the static timing facts of a schedule (per
//!   executable ringlet length and cycle length).

mod stepped;

pub use stepped::SteppedClock;

use llfsm_core::{ExecutableId, TimeNs};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Elapsed-time oracle consumed by machine actions
pub trait Clock {
    /// True iff more than `duration` has elapsed in the current state
    fn after(&mut self, duration: TimeNs) -> bool;

    /// Time elapsed in the current state
    fn elapsed(&self) -> TimeNs;

    /// Length of the timeslot `id` is scheduled in
    fn ringlet_length(&self, id: ExecutableId) -> Option<TimeNs>;

    /// Length of one full schedule cycle
    fn schedule_length(&self) -> TimeNs;
}

/// Static timing facts derived from a schedule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTiming {
    /// Duration of the timeslot each executable runs in
    pub ringlet_lengths: BTreeMap<ExecutableId, TimeNs>,
    /// Cycle length
    pub schedule_length: TimeNs,
}

impl ScheduleTiming {
    /// Create timing information
    #[must_use]
    pub const fn new(ringlet_lengths: BTreeMap<ExecutableId, TimeNs>, schedule_length: TimeNs) -> Self {
        Self {
            ringlet_lengths,
            schedule_length,
        }
    }

    /// Ringlet length of `id`
    #[must_use]
    pub fn ringlet_length(&self, id: ExecutableId) -> Option<TimeNs> {
        self.ringlet_lengths.get(&id).copied()
    }
}
