//! Snapshot Sections
//!
//! A [`SnapshotSection`] groups the timeslots that share one environment
//! snapshot: inputs are read once before its first timeslot and outputs
//! are written once after its last.
//!
//! ```text
//!   R ─▶ [ slot 0 ] ─▶ E ─▶ [ slot 1 ] ─▶ W
//!   read                                 write
//! ```

use super::timeslot::Timeslot;
use llfsm_core::{ExecutableId, TimeNs};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// Timeslots sharing one environment snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotSection {
    /// Timeslots sorted by start time, then executable
    pub timeslots: Vec<Timeslot>,
}

impl SnapshotSection {
    /// Create a section, sorting its timeslots
    #[must_use]
    pub fn new(mut timeslots: Vec<Timeslot>) -> Self {
        timeslots.sort_by_key(|slot| (slot.starting_time, slot.executable()));
        Self { timeslots }
    }

    /// Earliest start
    #[must_use]
    pub fn starting_time(&self) -> TimeNs {
        self.timeslots.first().map_or(0, |slot| slot.starting_time)
    }

    /// Latest end
    #[must_use]
    pub fn end_time(&self) -> TimeNs {
        self.timeslots.iter().map(Timeslot::end_time).max().unwrap_or(0)
    }

    /// Time from first start to last end
    #[must_use]
    pub fn duration(&self) -> TimeNs {
        self.end_time().saturating_sub(self.starting_time())
    }

    /// Closed range covered
    #[must_use]
    pub fn time_range(&self) -> RangeInclusive<TimeNs> {
        self.starting_time()..=self.end_time()
    }

    /// Non-empty with pairwise non-overlapping timeslots
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.timeslots.is_empty()
            && self.timeslots.iter().enumerate().all(|(i, a)| {
                self.timeslots[i + 1..].iter().all(|b| !a.overlaps(b))
            })
    }

    /// Whether the closed ranges intersect
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.starting_time() <= other.end_time() && other.starting_time() <= self.end_time()
    }

    /// Root executables of every timeslot
    #[must_use]
    pub fn executables(&self) -> BTreeSet<ExecutableId> {
        self.timeslots.iter().map(Timeslot::executable).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: usize, start: TimeNs, duration: TimeNs) -> Timeslot {
        Timeslot::new(ExecutableId::new(id), start, duration)
    }

    #[test]
    fn test_sorted_and_bounds() {
        let section = SnapshotSection::new(vec![slot(1, 20, 10), slot(0, 0, 10)]);
        assert_eq!(section.timeslots[0].executable(), ExecutableId::new(0));
        assert_eq!(section.starting_time(), 0);
        assert_eq!(section.end_time(), 30);
        assert_eq!(section.duration(), 30);
        assert!(section.is_valid());
    }

    #[test]
    fn test_overlapping_timeslots_invalid() {
        let section = SnapshotSection::new(vec![slot(0, 0, 10), slot(1, 10, 10)]);
        assert!(!section.is_valid());
        assert!(!SnapshotSection::new(Vec::new()).is_valid());
    }

    #[test]
    fn test_section_overlap() {
        let a = SnapshotSection::new(vec![slot(0, 0, 10)]);
        let b = SnapshotSection::new(vec![slot(1, 5, 10)]);
        let c = SnapshotSection::new(vec![slot(2, 16, 1)]);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }
}
