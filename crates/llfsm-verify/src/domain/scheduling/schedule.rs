//! Schedules
//!
//! # Overview
//!
//! A [`Schedule`] is the full, resolved input to both the live scheduler
//! and the verifier: one [`ScheduleThread`] per scheduler slot.
//!
//! ```text
//! thread 0: ├─[A 0..10]─┤      ├─[B 20..30]─┤
//! thread 1:      ├──[C 5..25]──┤
//!           0                                30 = cycle_length
//! ```
//!
//! # Validation Rules
//!
//! - every thread is valid (no overlapping timeslots inside a thread)
//! - every timeslot has executables and its call-chain root is one of them
//! - every referenced executable is registered in the pool
//! - no executable runs on two threads
//! - sections of different threads that share dependencies never overlap

use super::thread::{share_dependencies, ScheduleThread};
use super::timeslot::Timeslot;
use crate::domain::clock::ScheduleTiming;
use crate::domain::pool::ExecutablePool;
use crate::error::ConfigurationError;
use llfsm_core::TimeNs;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A set of threads forming one scheduling cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Schedule {
    /// One thread per scheduler slot
    pub threads: Vec<ScheduleThread>,
}

impl Schedule {
    /// Create a schedule
    #[must_use]
    pub const fn new(threads: Vec<ScheduleThread>) -> Self {
        Self { threads }
    }

    /// Every timeslot of every thread
    pub fn timeslots(&self) -> impl Iterator<Item = &Timeslot> {
        self.threads.iter().flat_map(ScheduleThread::timeslots)
    }

    /// Latest timeslot end
    #[must_use]
    pub fn cycle_length(&self) -> TimeNs {
        self.timeslots().map(Timeslot::end_time).max().unwrap_or(0)
    }

    /// Ringlet lengths and cycle length
    #[must_use]
    pub fn timing(&self) -> ScheduleTiming {
        let mut ringlet_lengths = BTreeMap::new();
        for slot in self.timeslots() {
            for id in &slot.executables {
                let length = ringlet_lengths.entry(*id).or_insert(slot.duration);
                *length = (*length).max(slot.duration);
            }
        }
        ScheduleTiming::new(ringlet_lengths, self.cycle_length())
    }

    /// Whether some executable occupies more than one timeslot
    #[must_use]
    pub fn has_repeated_executables(&self) -> bool {
        let mut seen = BTreeSet::new();
        self.timeslots().any(|slot| !seen.insert(slot.executable()))
    }

    /// Checks the schedule against `pool`.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UnknownExecutable`] for an unregistered
    /// executable, [`ConfigurationError::MalformedSchedule`] for any other
    /// rule violation.
    pub fn validate(&self, pool: &ExecutablePool) -> Result<(), ConfigurationError> {
        let malformed = |reason: String| Err(ConfigurationError::MalformedSchedule(reason));

        for (index, thread) in self.threads.iter().enumerate() {
            if !thread.is_valid() {
                return malformed(format!("thread {index} has overlapping or empty sections"));
            }
            for slot in thread.timeslots() {
                if slot.executables.is_empty() {
                    return malformed(format!("thread {index} has a timeslot with no executables"));
                }
                if !slot.executables.contains(&slot.executable()) {
                    return malformed(format!(
                        "call chain root {} is not scheduled in its own timeslot",
                        slot.executable()
                    ));
                }
                if let Some(missing) = slot.executables.iter().find(|id| !pool.has(**id)) {
                    return Err(ConfigurationError::UnknownExecutable(*missing));
                }
            }
        }

        for (i, lhs) in self.threads.iter().enumerate() {
            for (j, rhs) in self.threads.iter().enumerate().skip(i + 1) {
                if let Some(id) = lhs.executables().intersection(&rhs.executables()).next() {
                    return malformed(format!("{id} is scheduled on threads {i} and {j}"));
                }
                for a in &lhs.sections {
                    for b in &rhs.sections {
                        if a.overlaps(b) && share_dependencies(&a.executables(), &b.executables(), pool) {
                            return malformed(format!(
                                "threads {i} and {j} run dependent sections at the same time"
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// [`validate`](Self::validate) as a predicate
    #[must_use]
    pub fn is_valid(&self, pool: &ExecutablePool) -> bool {
        self.validate(pool).is_ok()
    }
}
