//! Time-Aware Ringlets
//!
//! # Overview
//!
//! A guard such as `after(5) || after(15)` is a step function of elapsed
//! time. Instead of sampling every instant, the builder runs the step,
//! collects the thresholds the guards asked about and re-runs the step
//! just past each one:
//!
//! ```text
//!   run at s      run at 5+1         run at 15+1
//!  ├───────────┤├─────────────────┤├─────────────────▶
//!   c <= 5       (c > 5) && (c <= 15)  c > 15
//! ```
//!
//! # Invariants
//!
//! The conditions of the produced [`ConditionalRinglet`]s partition
//! `[starting_time, ∞)`: no gaps and no overlaps. A guard that never
//! consults the clock yields exactly one ringlet.

use super::step::Ringlet;
use crate::domain::clock::ScheduleTiming;
use crate::domain::pool::ExecutablePool;
use crate::domain::scheduling::Timeslot;
use crate::error::ConfigurationError;
use llfsm_core::{Constraint, TimeNs};
use std::collections::BTreeSet;

/// Where in an interval a ringlet was sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Timing {
    /// At `t`, the start of the interval
    BeforeOrEqual(TimeNs),
    /// Just past the threshold `t`
    After(TimeNs),
}

impl Timing {
    /// Elapsed time the ringlet ran at
    #[must_use]
    pub const fn time_value(self) -> TimeNs {
        match self {
            Self::BeforeOrEqual(time) => time,
            Self::After(time) => time.saturating_add(1),
        }
    }
}

/// A ringlet valid only while its condition holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalRinglet {
    /// The step
    pub ringlet: Ringlet,
    /// Elapsed-time interval the step is valid for
    pub condition: Constraint,
    /// Sample point inside the interval
    pub timing: Timing,
}

impl ConditionalRinglet {
    /// Condition to put on a Kripke edge, `None` if it always holds
    #[must_use]
    pub fn edge_constraint(&self) -> Option<Constraint> {
        (!self.condition.is_trivial()).then(|| self.condition.clone())
    }
}

/// Every distinct outcome of a timeslot across elapsed time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeAwareRinglets {
    /// Ringlets in ascending interval order
    pub ringlets: Vec<ConditionalRinglet>,
}

impl TimeAwareRinglets {
    /// Builds the ringlets of `timeslot` for elapsed times from
    /// `starting_time` onwards.
    ///
    /// # Errors
    ///
    /// Configuration errors raised by any of the executions.
    pub fn new(
        pool: &ExecutablePool,
        timeslot: &Timeslot,
        timing: &ScheduleTiming,
        starting_time: TimeNs,
    ) -> Result<Self, ConfigurationError> {
        let first = Ringlet::execute(pool, timeslot, timing, starting_time)?;
        let mut pending: BTreeSet<TimeNs> = first.queried.range(starting_time..).copied().collect();
        let mut samples = vec![(Timing::BeforeOrEqual(starting_time), first)];

        while let Some(boundary) = pending.pop_first() {
            if boundary == TimeNs::MAX {
                break;
            }
            let time = boundary + 1;
            let ringlet = Ringlet::execute(pool, timeslot, timing, time)?;
            pending.extend(ringlet.queried.range(time..).copied());
            samples.push((Timing::After(boundary), ringlet));
        }

        let uppers: Vec<Option<TimeNs>> = samples
            .iter()
            .skip(1)
            .map(|(timing, _)| match timing {
                Timing::After(boundary) => Some(*boundary),
                Timing::BeforeOrEqual(_) => None,
            })
            .chain(std::iter::once(None))
            .collect();

        let ringlets = samples
            .into_iter()
            .zip(uppers)
            .map(|((timing, ringlet), upper)| ConditionalRinglet {
                condition: interval(timing, upper),
                ringlet,
                timing,
            })
            .collect();
        Ok(Self { ringlets })
    }

    /// Number of distinct intervals
    #[must_use]
    pub fn len(&self) -> usize {
        self.ringlets.len()
    }

    /// Never true for a successfully built value
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ringlets.is_empty()
    }
}

impl IntoIterator for TimeAwareRinglets {
    type Item = ConditionalRinglet;
    type IntoIter = std::vec::IntoIter<ConditionalRinglet>;

    fn into_iter(self) -> Self::IntoIter {
        self.ringlets.into_iter()
    }
}

fn interval(timing: Timing, upper: Option<TimeNs>) -> Constraint {
    let lower = match timing {
        Timing::BeforeOrEqual(0) => None,
        Timing::BeforeOrEqual(start) => Some(Constraint::GreaterThanEqual(start)),
        Timing::After(boundary) => Some(Constraint::GreaterThan(boundary)),
    };
    match (lower, upper.map(Constraint::LessThanEqual)) {
        (Some(lower), Some(upper)) => Constraint::and(lower, upper),
        (Some(lower), None) => lower,
        (None, Some(upper)) => upper,
        (None, None) => Constraint::GreaterThanEqual(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::machine::{ExecutableInformation, ExecutableType, Llfsm, State};
    use llfsm_core::ExecutableId;

    fn pool(machine: Llfsm) -> ExecutablePool {
        ExecutablePool::new(vec![(
            ExecutableInformation::new(ExecutableId::new(0), machine.name().to_owned()),
            ExecutableType::Controllable(machine),
        )])
        .unwrap()
    }

    fn build(machine: Llfsm, start: TimeNs) -> TimeAwareRinglets {
        let slot = Timeslot::new(ExecutableId::new(0), 0, 10);
        TimeAwareRinglets::new(&pool(machine), &slot, &ScheduleTiming::default(), start).unwrap()
    }

    fn staged() -> Llfsm {
        Llfsm::builder("Staged")
            .state(
                State::new("Wait")
                    .transition("Late", |ctx| ctx.after(15))
                    .transition("Early", |ctx| ctx.after(5)),
            )
            .state(State::new("Early"))
            .state(State::new("Late"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_untimed_guard_yields_one_trivial_ringlet() {
        let machine = Llfsm::builder("Plain")
            .state(State::new("A").transition("B", |_| true))
            .state(State::new("B"))
            .build()
            .unwrap();
        let ringlets = build(machine, 0);
        assert_eq!(ringlets.len(), 1);
        assert_eq!(ringlets.ringlets[0].edge_constraint(), None);
        assert_eq!(ringlets.ringlets[0].timing, Timing::BeforeOrEqual(0));
    }

    #[test]
    fn test_thresholds_partition_time() {
        let ringlets = build(staged(), 0);
        let conditions: Vec<_> = ringlets.ringlets.iter().map(|r| r.condition.to_string()).collect();
        assert_eq!(
            conditions,
            vec!["c <= 5", "(c > 5) && (c <= 15)", "c > 15"]
        );

        let states: Vec<_> = ringlets
            .ringlets
            .iter()
            .map(|r| r.ringlet.after.snapshot().lookup("Staged.currentState").cloned())
            .collect();
        assert_eq!(
            states,
            vec![Some("Wait".into()), Some("Early".into()), Some("Late".into())]
        );

        for value in 0..30 {
            let holding = ringlets
                .ringlets
                .iter()
                .filter(|r| r.condition.is_satisfied_by(value))
                .count();
            assert_eq!(holding, 1, "exactly one condition holds at {value}");
        }
    }

    #[test]
    fn test_nonzero_start_excludes_earlier_thresholds() {
        let ringlets = build(staged(), 10);
        let conditions: Vec<_> = ringlets.ringlets.iter().map(|r| r.condition.to_string()).collect();
        assert_eq!(conditions, vec!["(c >= 10) && (c <= 15)", "c > 15"]);
    }

    #[test]
    fn test_time_value() {
        assert_eq!(Timing::BeforeOrEqual(4).time_value(), 4);
        assert_eq!(Timing::After(4).time_value(), 5);
    }
}
