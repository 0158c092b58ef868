//! Schedule Threads
//!
//! A [`ScheduleThread`] is a sequential list of sections run by one
//! scheduler slot. Nothing inside a thread runs concurrently.

use super::section::SnapshotSection;
use super::timeslot::Timeslot;
use crate::domain::pool::ExecutablePool;
use llfsm_core::ExecutableId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Sequential sections of one scheduler slot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleThread {
    /// Sections sorted by start time
    pub sections: Vec<SnapshotSection>,
}

impl ScheduleThread {
    /// Create a thread, sorting its sections
    #[must_use]
    pub fn new(mut sections: Vec<SnapshotSection>) -> Self {
        sections.sort_by_key(SnapshotSection::starting_time);
        Self { sections }
    }

    /// Every timeslot in order
    pub fn timeslots(&self) -> impl Iterator<Item = &Timeslot> {
        self.sections.iter().flat_map(|section| section.timeslots.iter())
    }

    /// Every section is valid and no two timeslots overlap
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let slots: Vec<_> = self.timeslots().collect();
        self.sections.iter().all(SnapshotSection::is_valid)
            && slots
                .iter()
                .enumerate()
                .all(|(i, a)| slots[i + 1..].iter().all(|b| !a.overlaps(b)))
    }

    /// Root executables of every timeslot
    #[must_use]
    pub fn executables(&self) -> BTreeSet<ExecutableId> {
        self.timeslots().map(Timeslot::executable).collect()
    }

    /// Whether any section of `self` overlaps any section of `other`
    #[must_use]
    pub fn will_overlap(&self, other: &Self) -> bool {
        self.sections
            .iter()
            .any(|a| other.sections.iter().any(|b| a.overlaps(b)))
    }

    /// Whether the threads run a common executable or touch a common
    /// external or dependency
    #[must_use]
    pub fn shares_dependencies(&self, other: &Self, pool: &ExecutablePool) -> bool {
        share_dependencies(&self.executables(), &other.executables(), pool)
    }

    /// Sections of both threads in start order
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        Self::new(self.sections.iter().chain(&other.sections).cloned().collect())
    }
}

pub(crate) fn share_dependencies(
    lhs: &BTreeSet<ExecutableId>,
    rhs: &BTreeSet<ExecutableId>,
    pool: &ExecutablePool,
) -> bool {
    if !lhs.is_disjoint(rhs) {
        return true;
    }
    let names = |ids: &BTreeSet<ExecutableId>| -> BTreeSet<String> {
        ids.iter().flat_map(|id| pool.dependencies_of(*id)).collect()
    };
    !names(lhs).is_disjoint(&names(rhs))
}
