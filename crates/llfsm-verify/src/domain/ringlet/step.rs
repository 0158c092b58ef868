//! Ringlets
//!
//! A [`Ringlet`] captures everything observable about one timeslot
//! executing once at a fixed elapsed time: the pool before and after, the
//! root machine's snapshots, whether it transitioned, the calls it made
//! and the clock thresholds its guards asked about.

use super::execution::execute_timeslot;
use crate::domain::call::Call;
use crate::domain::clock::{ScheduleTiming, SteppedClock};
use crate::domain::pool::ExecutablePool;
use crate::domain::scheduling::Timeslot;
use crate::error::ConfigurationError;
use llfsm_core::{ExecutableId, PropertyList, TimeNs, Value};
use std::collections::BTreeSet;

/// One executed step of one timeslot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ringlet {
    /// Timeslot executed
    pub timeslot: Timeslot,
    /// Pool before the step
    pub before: ExecutablePool,
    /// Pool after the step
    pub after: ExecutablePool,
    /// Whether the root transitioned
    pub transitioned: bool,
    /// Inputs the root observed
    pub externals_pre_snapshot: PropertyList,
    /// Outputs the root produced
    pub externals_post_snapshot: PropertyList,
    /// Root snapshot before the step
    pub pre_snapshot: Value,
    /// Root snapshot after the step
    pub post_snapshot: Value,
    /// Calls dispatched, nested ones included
    pub calls: Vec<Call>,
    /// Executables that received a call
    pub after_calls: BTreeSet<ExecutableId>,
    /// State the root was in when it executed
    pub executed_state: String,
    /// Elapsed time the step ran at
    pub elapsed: TimeNs,
    /// Thresholds queried through the clock
    pub queried: BTreeSet<TimeNs>,
}

impl Ringlet {
    /// Executes `timeslot` on a copy of `pool` with `elapsed` time in the
    /// current state.
    ///
    /// # Errors
    ///
    /// Configuration errors raised by the step or its calls.
    pub fn execute(
        pool: &ExecutablePool,
        timeslot: &Timeslot,
        timing: &ScheduleTiming,
        elapsed: TimeNs,
    ) -> Result<Self, ConfigurationError> {
        let root = timeslot.executable();
        let executable = pool
            .get(root)
            .ok_or(ConfigurationError::UnknownExecutable(root))?;
        let machine = executable.machine();
        let executed_state = machine.current_state().to_owned();
        let pre_snapshot = executable.snapshot();
        let externals_pre_snapshot = machine
            .observed_inputs()
            .into_iter()
            .map(|external| (external.name.clone(), external.value.clone()))
            .collect();

        let mut after = pool.cloned();
        let mut clock = SteppedClock::new(timing, elapsed);
        let execution = execute_timeslot(&mut after, timeslot, &mut clock)?;

        let executable = after
            .get(root)
            .ok_or(ConfigurationError::UnknownExecutable(root))?;
        let post_snapshot = executable.snapshot();
        let externals_post_snapshot = executable
            .machine()
            .outputs()
            .map(|external| (external.name.clone(), external.value.clone()))
            .collect();
        let after_calls = execution.calls.iter().map(|call| call.callee).collect();

        Ok(Self {
            timeslot: timeslot.clone(),
            before: pool.cloned(),
            after,
            transitioned: execution.transitioned,
            externals_pre_snapshot,
            externals_post_snapshot,
            pre_snapshot,
            post_snapshot,
            calls: execution.calls,
            after_calls,
            executed_state,
            elapsed,
            queried: clock.into_queried(),
        })
    }

    /// Root executable
    #[must_use]
    pub const fn executable(&self) -> ExecutableId {
        self.timeslot.executable()
    }

    /// State the root was in when it executed
    #[must_use]
    pub fn executed_state(&self) -> &str {
        &self.executed_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::call::{CallMethod, Parameters};
    use crate::domain::machine::{ExecutableInformation, ExecutableType, Llfsm, ParameterisedMachine, State};
    use llfsm_core::ValueType;

    fn timed_pool() -> ExecutablePool {
        let machine = Llfsm::builder("Timer")
            .state(State::new("Wait").transition("Done", |ctx| ctx.after(10)))
            .state(State::new("Done"))
            .build()
            .unwrap();
        ExecutablePool::new(vec![(
            ExecutableInformation::new(ExecutableId::new(0), "Timer"),
            ExecutableType::Controllable(machine),
        )])
        .unwrap()
    }

    #[test]
    fn test_execute_leaves_input_pool_untouched() {
        let pool = timed_pool();
        let slot = Timeslot::new(ExecutableId::new(0), 0, 5);
        let ringlet = Ringlet::execute(&pool, &slot, &ScheduleTiming::default(), 11).unwrap();

        assert!(ringlet.transitioned);
        assert_eq!(ringlet.before, pool);
        assert_ne!(ringlet.after, pool);
        assert_eq!(ringlet.executed_state(), "Wait");
        assert_eq!(ringlet.queried, BTreeSet::from([10]));
        assert_eq!(
            ringlet.post_snapshot.lookup("currentState"),
            Some(&Value::from("Done"))
        );
    }

    fn ask(ctx: &mut crate::domain::machine::MachineContext<'_>, n: u8) {
        let mut parameters = Parameters::new();
        parameters.insert("n".into(), Some(Value::U8(n)));
        ctx.call("Callee", parameters);
    }

    fn with_callee(caller: Llfsm) -> ExecutablePool {
        let callee = Llfsm::builder("Callee")
            .variable("seen", ValueType::U8, 0u8)
            .state(State::new("Run").on_entry(|ctx| {
                if let Some(n) = ctx.parameter("n").cloned() {
                    ctx.set_variable("seen", n);
                }
            }))
            .build()
            .unwrap();
        ExecutablePool::new(vec![
            (
                ExecutableInformation::new(ExecutableId::new(0), "Caller"),
                ExecutableType::Controllable(caller),
            ),
            (
                ExecutableInformation::new(ExecutableId::new(1), "Callee"),
                ExecutableType::Parameterised(ParameterisedMachine::new(
                    callee,
                    vec![("n".into(), ValueType::U8)],
                )),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_sync_call_runs_callee_in_same_ringlet() {
        let caller = Llfsm::builder("Caller")
            .state(State::new("Ask").on_entry(|ctx| ask(ctx, 3)))
            .build()
            .unwrap();
        let pool = with_callee(caller);

        let slot = Timeslot::new(ExecutableId::new(0), 0, 10);
        let ringlet = Ringlet::execute(&pool, &slot, &ScheduleTiming::default(), 0).unwrap();
        assert_eq!(ringlet.calls.len(), 1);
        assert_eq!(ringlet.calls[0].method, CallMethod::Synchronous);
        assert!(ringlet.after_calls.contains(&ExecutableId::new(1)));
        assert_eq!(
            ringlet.after.snapshot().lookup("Callee.variables.seen"),
            Some(&Value::U8(3))
        );
    }

    #[test]
    fn test_call_from_on_exit_belongs_to_exiting_ringlet() {
        let caller = Llfsm::builder("Caller")
            .state(
                State::new("Ask")
                    .transition("Done", |_| true)
                    .on_exit(|ctx| ask(ctx, 5)),
            )
            .state(State::new("Done"))
            .build()
            .unwrap();
        let pool = with_callee(caller);

        let slot = Timeslot::new(ExecutableId::new(0), 0, 10);
        let ringlet = Ringlet::execute(&pool, &slot, &ScheduleTiming::default(), 0).unwrap();
        assert!(ringlet.transitioned);
        assert_eq!(ringlet.executed_state(), "Ask");
        assert_eq!(ringlet.calls.len(), 1);
        assert_eq!(ringlet.calls[0].callee, ExecutableId::new(1));
        assert_eq!(
            ringlet.post_snapshot.lookup("currentState"),
            Some(&Value::from("Done"))
        );
        assert_eq!(
            ringlet.after.snapshot().lookup("Callee.variables.seen"),
            Some(&Value::U8(5)),
            "callee ran inside the exiting ringlet"
        );
    }

    #[test]
    fn test_unknown_callee_is_fatal() {
        let caller = Llfsm::builder("Caller")
            .state(State::new("Ask").on_entry(|ctx| {
                ctx.invoke("Ghost", Parameters::new());
            }))
            .build()
            .unwrap();
        let pool = ExecutablePool::new(vec![(
            ExecutableInformation::new(ExecutableId::new(0), "Caller"),
            ExecutableType::Controllable(caller),
        )])
        .unwrap();
        let slot = Timeslot::new(ExecutableId::new(0), 0, 10);
        let err = Ringlet::execute(&pool, &slot, &ScheduleTiming::default(), 0).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownCallee {
                caller: "Caller".into(),
                callee: "Ghost".into()
            }
        );
    }
}
