//! Snapshot Section Variations
//!
//! # Overview
//!
//! Expands one [`SnapshotSection`] into every legal sequence of ringlets.
//! Timeslots run in ascending start order. Before each one, the inputs its
//! machine observes are enumerated; after it, every time-aware outcome
//! forks a branch.
//!
//! ```text
//!                 section entry
//!                ┌──────┴──────┐
//!          button=false    button=true        (inputs of slot 0)
//!               │           ┌──┴──┐
//!            c >= 0       c<=5   c>5          (ringlets of slot 0)
//!               │           │     │
//!              ...         ...   ...          (slot 1, ...)
//! ```
//!
//! # Inputs
//!
//! An input name fixed earlier in the branch keeps its value: every
//! timeslot of a section reads the same environment snapshot.
//!
//! The expansion uses an explicit stack, so depth is bounded by heap
//! rather than call-stack size.

use crate::domain::clock::ScheduleTiming;
use crate::domain::combinations::Combinations;
use crate::domain::pool::ExecutablePool;
use crate::domain::ringlet::{ConditionalRinglet, TimeAwareRinglets};
use crate::domain::scheduling::{SnapshotSection, Timeslot};
use crate::error::ConfigurationError;
use llfsm_core::{ExecutableId, PropertyList, Value};
use std::collections::BTreeSet;

/// One executed timeslot inside a section path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionStep {
    /// Timeslot with its updated cycle counter
    pub timeslot: Timeslot,
    /// Outcome chosen for this branch
    pub ringlet: ConditionalRinglet,
    /// Inputs assigned to the machine before it ran
    pub assignments: PropertyList,
}

impl SectionStep {
    /// Consecutive non-transitioning ringlets after this step
    #[must_use]
    pub const fn cycles_executed(&self) -> u64 {
        self.timeslot.cycles_executed
    }

    /// Root executable
    #[must_use]
    pub const fn executable(&self) -> ExecutableId {
        self.timeslot.executable()
    }
}

/// One complete branch through a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotSectionPath {
    /// Steps in execution order
    pub steps: Vec<SectionStep>,
    /// Entry pool with every input assignment of the branch applied
    pub snapshot: ExecutablePool,
    /// Pool after the last step
    pub after: ExecutablePool,
}

impl SnapshotSectionPath {
    /// Pool the first step ran on
    #[must_use]
    pub fn before(&self) -> &ExecutablePool {
        self.steps
            .first()
            .map_or(&self.snapshot, |step| &step.ringlet.ringlet.before)
    }

    /// Pool after the last step
    #[must_use]
    pub const fn after(&self) -> &ExecutablePool {
        &self.after
    }

    /// Pool after step `index` as seen under this path's environment
    /// snapshot.
    ///
    /// A step's own ringlet only carries the inputs assigned up to that
    /// step. Machines whose timeslot comes later in the section receive
    /// their assignments here, so every pool of the path agrees with
    /// [`snapshot`](Self::snapshot) on the inputs.
    ///
    /// # Errors
    ///
    /// `UnknownExecutable` if a later step's machine is missing.
    pub fn observed_after(&self, index: usize) -> Result<ExecutablePool, ConfigurationError> {
        let Some(step) = self.steps.get(index) else {
            return Ok(self.after.cloned());
        };
        let mut pool = step.ringlet.ringlet.after.cloned();
        let ran: BTreeSet<ExecutableId> = self.steps[..=index].iter().map(SectionStep::executable).collect();
        for later in &self.steps[index + 1..] {
            if !ran.contains(&later.executable()) {
                assign(&mut pool, later.executable(), &later.assignments)?;
            }
        }
        Ok(pool)
    }
}

/// Every path through a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotSectionVariations {
    /// Paths in depth-first order
    pub paths: Vec<SnapshotSectionPath>,
}

struct Branch {
    index: usize,
    pool: ExecutablePool,
    snapshot: ExecutablePool,
    fixed: PropertyList,
    steps: Vec<SectionStep>,
}

impl SnapshotSectionVariations {
    /// Expands `section` starting from `pool`.
    ///
    /// # Errors
    ///
    /// - `MalformedSchedule` for an empty section
    /// - `UnenumerableDomain` if an observed input cannot be enumerated
    /// - any error raised while executing a ringlet
    pub fn new(
        pool: &ExecutablePool,
        section: &SnapshotSection,
        timing: &ScheduleTiming,
    ) -> Result<Self, ConfigurationError> {
        if section.timeslots.is_empty() {
            return Err(ConfigurationError::MalformedSchedule(
                "snapshot section has no timeslots".into(),
            ));
        }

        let mut paths = Vec::new();
        let mut stack = vec![Branch {
            index: 0,
            pool: pool.cloned(),
            snapshot: pool.cloned(),
            fixed: PropertyList::new(),
            steps: Vec::new(),
        }];

        while let Some(branch) = stack.pop() {
            let Some(timeslot) = section.timeslots.get(branch.index) else {
                paths.push(SnapshotSectionPath {
                    steps: branch.steps,
                    snapshot: branch.snapshot,
                    after: branch.pool,
                });
                continue;
            };
            let children = expand(&branch, timeslot, timing)?;
            stack.extend(children.into_iter().rev());
        }
        Ok(Self { paths })
    }

    /// Number of paths
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// True when there are no paths
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl IntoIterator for SnapshotSectionVariations {
    type Item = SnapshotSectionPath;
    type IntoIter = std::vec::IntoIter<SnapshotSectionPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

fn expand(
    branch: &Branch,
    timeslot: &Timeslot,
    timing: &ScheduleTiming,
) -> Result<Vec<Branch>, ConfigurationError> {
    let root = timeslot.executable();
    let machine = branch
        .pool
        .get(root)
        .ok_or(ConfigurationError::UnknownExecutable(root))?
        .machine();

    let observed = machine.observed_inputs();
    let shared: PropertyList = observed
        .iter()
        .filter_map(|external| {
            branch
                .fixed
                .get(&external.name)
                .map(|value| (external.name.clone(), value.clone()))
        })
        .collect();
    let free: Vec<_> = observed
        .iter()
        .filter(|external| !branch.fixed.contains_key(&external.name))
        .map(|external| (external.name.clone(), external.value_type.clone()))
        .collect();
    let names: Vec<String> = free.iter().map(|(name, _)| name.clone()).collect();

    let mut children = Vec::new();
    for combination in Combinations::named(free)? {
        let mut assignments = shared.clone();
        assignments.extend(names.iter().cloned().zip(combination));

        let mut pool = branch.pool.cloned();
        let mut snapshot = branch.snapshot.cloned();
        assign(&mut pool, root, &assignments)?;
        assign(&mut snapshot, root, &assignments)?;

        let mut fixed = branch.fixed.clone();
        fixed.extend(assignments.iter().map(|(k, v)| (k.clone(), v.clone())));

        for ringlet in TimeAwareRinglets::new(&pool, timeslot, timing, 0)? {
            let cycles = if ringlet.ringlet.transitioned {
                0
            } else {
                timeslot.cycles_executed.saturating_add(1)
            };
            let mut steps = branch.steps.clone();
            steps.push(SectionStep {
                timeslot: timeslot.with_cycles_executed(cycles),
                assignments: assignments.clone(),
                ringlet: ringlet.clone(),
            });
            children.push(Branch {
                index: branch.index + 1,
                pool: ringlet.ringlet.after,
                snapshot: snapshot.cloned(),
                fixed: fixed.clone(),
                steps,
            });
        }
    }
    Ok(children)
}

fn assign(
    pool: &mut ExecutablePool,
    id: ExecutableId,
    assignments: &PropertyList,
) -> Result<(), ConfigurationError> {
    let machine = pool
        .get_mut(id)
        .ok_or(ConfigurationError::UnknownExecutable(id))?
        .machine_mut();
    for (name, value) in assignments {
        machine.set_external(name, Value::clone(value))?;
    }
    Ok(())
}
