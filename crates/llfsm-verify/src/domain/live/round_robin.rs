//! Round-Robin Scheduler
//!
//! Executes a [`Schedule`] one cycle at a time. Sections of all threads
//! run in `(start, thread)` order; inside a section every timeslot runs
//! exactly once against the same environment snapshot.
//!
//! # Example
//!
//! ```rust
//! use llfsm_core::{ExecutableId, Value, ValueType};
//! use llfsm_verify::domain::live::{Environment, RoundRobinScheduler, SharedEnvironment};
//! use llfsm_verify::domain::machine::{ExecutableInformation, ExecutableType, Llfsm, State};
//! use llfsm_verify::domain::pool::ExecutablePool;
//! use llfsm_verify::domain::scheduling::{Schedule, ScheduleThread, SnapshotSection, Timeslot};
//!
//! let lamp = Llfsm::builder("Lamp")
//!     .sensor("button", ValueType::Bool)
//!     .actuator("light", ValueType::Bool)
//!     .state(State::new("Off").transition("On", |ctx| ctx.bool_external("button")))
//!     .state(State::new("On").on_entry(|ctx| {
//!         ctx.set_external("light", Value::Bool(true));
//!     }))
//!     .build()
//!     .unwrap();
//! let id = ExecutableId::new(0);
//! let pool = ExecutablePool::new(vec![(
//!     ExecutableInformation::new(id, "Lamp"),
//!     ExecutableType::Controllable(lamp),
//! )])
//! .unwrap();
//! let schedule = Schedule::new(vec![ScheduleThread::new(vec![SnapshotSection::new(vec![
//!     Timeslot::new(id, 0, 10),
//! ])])]);
//!
//! let env = SharedEnvironment::new();
//! env.write("button", Value::Bool(true));
//! let mut scheduler = RoundRobinScheduler::new(schedule, pool).unwrap();
//! scheduler.run(&env, 2).unwrap();
//! assert_eq!(env.read("light"), Some(Value::Bool(true)));
//! ```

use super::environment::Environment;
use crate::domain::clock::{ScheduleTiming, SteppedClock};
use crate::domain::pool::ExecutablePool;
use crate::domain::ringlet::execute_timeslot;
use crate::domain::scheduling::{Schedule, SnapshotSection};
use crate::error::ConfigurationError;
use llfsm_core::{ExecutableId, TimeNs};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// What happened during one cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Zero-based cycle number
    pub cycle: u64,
    /// Virtual time the cycle started at
    pub started_at: TimeNs,
    /// Timeslots executed
    pub ringlets: usize,
    /// Root executables that transitioned, in execution order
    pub transitioned: Vec<ExecutableId>,
    /// Calls dispatched during the cycle
    pub calls: usize,
}

/// Deterministic executor for a validated schedule
#[derive(Debug)]
pub struct RoundRobinScheduler {
    pool: ExecutablePool,
    timing: ScheduleTiming,
    sections: Vec<SnapshotSection>,
    cycle_length: TimeNs,
    now: TimeNs,
    cycles: u64,
    /// Virtual time each executable entered its current state
    entered: BTreeMap<ExecutableId, TimeNs>,
}

impl RoundRobinScheduler {
    /// Scheduler for `schedule` over `pool`.
    ///
    /// # Errors
    ///
    /// Errors from [`Schedule::validate`].
    pub fn new(schedule: Schedule, pool: ExecutablePool) -> Result<Self, ConfigurationError> {
        schedule.validate(&pool)?;
        let timing = schedule.timing();
        let cycle_length = schedule.cycle_length();

        let mut ordered: Vec<(TimeNs, usize, SnapshotSection)> = schedule
            .threads
            .into_iter()
            .enumerate()
            .flat_map(|(thread, t)| {
                t.sections
                    .into_iter()
                    .map(move |section| (section.starting_time(), thread, section))
            })
            .collect();
        ordered.sort_by_key(|(start, thread, _)| (*start, *thread));

        Ok(Self {
            pool,
            timing,
            sections: ordered.into_iter().map(|(_, _, section)| section).collect(),
            cycle_length,
            now: 0,
            cycles: 0,
            entered: BTreeMap::new(),
        })
    }

    /// Executes one full schedule cycle against `env`.
    ///
    /// # Errors
    ///
    /// Configuration errors raised while executing, including a value in
    /// `env` that does not match the declared type of an input.
    pub fn run_cycle(&mut self, env: &impl Environment) -> Result<CycleReport, ConfigurationError> {
        let mut report = CycleReport {
            cycle: self.cycles,
            started_at: self.now,
            ..CycleReport::default()
        };

        for section in &self.sections {
            for slot in &section.timeslots {
                take_snapshot(&mut self.pool, slot.executable(), env)?;
            }

            for slot in &section.timeslots {
                let id = slot.executable();
                let start = self.now.saturating_add(slot.starting_time);
                let entered = self.entered.get(&id).copied().unwrap_or(0);
                let mut clock = SteppedClock::new(&self.timing, start.saturating_sub(entered));
                let execution = execute_timeslot(&mut self.pool, slot, &mut clock)?;

                trace!(executable = %id, transitioned = execution.transitioned, "Executed ringlet");
                report.ringlets += 1;
                report.calls += execution.calls.len();
                if execution.transitioned {
                    self.entered.insert(id, self.now.saturating_add(slot.end_time()));
                    report.transitioned.push(id);
                }
            }

            for slot in &section.timeslots {
                save_snapshot(&self.pool, slot.executable(), env)?;
            }
        }

        self.now = self.now.saturating_add(self.cycle_length);
        self.cycles += 1;
        debug!(
            cycle = report.cycle,
            ringlets = report.ringlets,
            transitions = report.transitioned.len(),
            "Completed schedule cycle"
        );
        Ok(report)
    }

    /// Runs up to `cycles` cycles, stopping early once every controllable
    /// machine has finished.
    ///
    /// # Errors
    ///
    /// Errors from [`run_cycle`](Self::run_cycle).
    pub fn run(&mut self, env: &impl Environment, cycles: u64) -> Result<Vec<CycleReport>, ConfigurationError> {
        let mut reports = Vec::new();
        for _ in 0..cycles {
            if self.has_finished() {
                break;
            }
            reports.push(self.run_cycle(env)?);
        }
        Ok(reports)
    }

    /// Current pool
    #[must_use]
    pub const fn pool(&self) -> &ExecutablePool {
        &self.pool
    }

    /// Virtual time
    #[must_use]
    pub const fn now(&self) -> TimeNs {
        self.now
    }

    /// Completed cycles
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Whether every controllable machine reached its exit state
    #[must_use]
    pub fn has_finished(&self) -> bool {
        self.pool
            .executables()
            .filter(|executable| !executable.is_parameterised())
            .all(|executable| executable.machine().has_finished())
    }
}

fn take_snapshot(
    pool: &mut ExecutablePool,
    id: ExecutableId,
    env: &impl Environment,
) -> Result<(), ConfigurationError> {
    let machine = pool
        .get_mut(id)
        .ok_or(ConfigurationError::UnknownExecutable(id))?
        .machine_mut();
    let readings: Vec<_> = machine
        .observed_inputs()
        .into_iter()
        .filter_map(|input| env.read(&input.name).map(|value| (input.name.clone(), value)))
        .collect();
    for (name, value) in readings {
        machine.set_external(&name, value)?;
    }
    Ok(())
}

fn save_snapshot(pool: &ExecutablePool, id: ExecutableId, env: &impl Environment) -> Result<(), ConfigurationError> {
    let machine = pool
        .get(id)
        .ok_or(ConfigurationError::UnknownExecutable(id))?
        .machine();
    for output in machine.outputs() {
        env.write(&output.name, output.value.clone());
    }
    Ok(())
}
