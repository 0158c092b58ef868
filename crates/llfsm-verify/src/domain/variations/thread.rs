//! Schedule Thread Variations
//!
//! Composes section variations along a thread. A [`Pathway`] picks one
//! path per section, each section starting from the pool the previous one
//! finished with:
//!
//! ```text
//! entry ─▶ section 0 path ─▶ section 1 path ─▶ ... ─▶ after
//! ```
//!
//! The number of pathways is the product of the per-section path counts
//! along each branch.

use super::section::{SnapshotSectionPath, SnapshotSectionVariations};
use crate::domain::clock::ScheduleTiming;
use crate::domain::pool::ExecutablePool;
use crate::domain::scheduling::{ScheduleThread, SnapshotSection};
use crate::error::ConfigurationError;

/// One consistent choice of path for every section of a thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pathway {
    /// Pool the thread started from
    pub entry: ExecutablePool,
    /// Chosen path per section, in order
    pub sections: Vec<SnapshotSectionPath>,
}

impl Pathway {
    /// Pool the thread started from
    #[must_use]
    pub const fn before(&self) -> &ExecutablePool {
        &self.entry
    }

    /// Pool after the last section
    #[must_use]
    pub fn after(&self) -> &ExecutablePool {
        self.sections.last().map_or(&self.entry, |path| &path.after)
    }

    /// Thread with the cycle counters produced by this pathway
    #[must_use]
    pub fn thread(&self) -> ScheduleThread {
        ScheduleThread::new(
            self.sections
                .iter()
                .map(|path| {
                    SnapshotSection::new(path.steps.iter().map(|step| step.timeslot.clone()).collect())
                })
                .collect(),
        )
    }
}

/// Every pathway through a thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleThreadVariations {
    /// Pathways in depth-first order
    pub pathways: Vec<Pathway>,
}

impl ScheduleThreadVariations {
    /// Expands `thread` starting from `pool`.
    ///
    /// # Errors
    ///
    /// Errors from [`SnapshotSectionVariations::new`].
    pub fn new(
        pool: &ExecutablePool,
        thread: &ScheduleThread,
        timing: &ScheduleTiming,
    ) -> Result<Self, ConfigurationError> {
        let mut pathways = Vec::new();
        let mut stack: Vec<(ExecutablePool, Vec<SnapshotSectionPath>)> = vec![(pool.cloned(), Vec::new())];

        while let Some((current, sections)) = stack.pop() {
            let Some(section) = thread.sections.get(sections.len()) else {
                pathways.push(Pathway {
                    entry: pool.cloned(),
                    sections,
                });
                continue;
            };
            let variations = SnapshotSectionVariations::new(&current, section, timing)?;
            let children: Vec<_> = variations
                .into_iter()
                .map(|path| {
                    let mut chosen = sections.clone();
                    let next = path.after.clone();
                    chosen.push(path);
                    (next, chosen)
                })
                .collect();
            stack.extend(children.into_iter().rev());
        }
        Ok(Self { pathways })
    }

    /// Number of pathways
    #[must_use]
    pub fn len(&self) -> usize {
        self.pathways.len()
    }

    /// True when there are no pathways
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pathways.is_empty()
    }
}

impl IntoIterator for ScheduleThreadVariations {
    type Item = Pathway;
    type IntoIter = std::vec::IntoIter<Pathway>;

    fn into_iter(self) -> Self::IntoIter {
        self.pathways.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::machine::{ExecutableInformation, ExecutableType, Llfsm, State};
    use crate::domain::scheduling::Timeslot;
    use llfsm_core::{ExecutableId, Value, ValueType};

    fn pool() -> ExecutablePool {
        let toggle = |name: &str, sensor: &'static str| {
            Llfsm::builder(name)
                .sensor(sensor, ValueType::Bool)
                .state(State::new("Low").transition("High", move |ctx| ctx.bool_external(sensor)))
                .state(State::new("High").transition("Low", move |ctx| !ctx.bool_external(sensor)))
                .build()
                .unwrap()
        };
        ExecutablePool::new(vec![
            (
                ExecutableInformation::new(ExecutableId::new(0), "A"),
                ExecutableType::Controllable(toggle("A", "a")),
            ),
            (
                ExecutableInformation::new(ExecutableId::new(1), "B"),
                ExecutableType::Controllable(toggle("B", "b")),
            ),
        ])
        .unwrap()
    }

    fn two_section_thread() -> ScheduleThread {
        ScheduleThread::new(vec![
            SnapshotSection::new(vec![Timeslot::new(ExecutableId::new(0), 0, 10)]),
            SnapshotSection::new(vec![Timeslot::new(ExecutableId::new(1), 20, 10)]),
        ])
    }

    #[test]
    fn test_pathway_count_is_product() {
        let variations =
            ScheduleThreadVariations::new(&pool(), &two_section_thread(), &ScheduleTiming::default()).unwrap();
        assert_eq!(variations.len(), 4);
        assert!(variations.pathways.iter().all(|p| p.sections.len() == 2));
    }

    #[test]
    fn test_pool_carries_forward() {
        let variations =
            ScheduleThreadVariations::new(&pool(), &two_section_thread(), &ScheduleTiming::default()).unwrap();
        for pathway in &variations.pathways {
            assert_eq!(
                pathway.sections[1].before().snapshot().lookup("A"),
                pathway.sections[0].after.snapshot().lookup("A")
            );
            assert_eq!(pathway.after(), &pathway.sections[1].after);
        }
        let last = variations.pathways.last().unwrap();
        assert_eq!(
            last.after().snapshot().lookup("A.currentState"),
            Some(&Value::from("High"))
        );
    }

    #[test]
    fn test_thread_updates_cycle_counters() {
        let variations =
            ScheduleThreadVariations::new(&pool(), &two_section_thread(), &ScheduleTiming::default()).unwrap();
        let first = &variations.pathways[0];
        let counters: Vec<_> = first.thread().timeslots().map(|slot| slot.cycles_executed).collect();
        assert_eq!(counters, vec![1, 1]);
    }
}
