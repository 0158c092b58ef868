//! Shared fixtures for the integration tests

#![allow(dead_code)]

use llfsm_core::{ExecutableId, TimeNs, Value, ValueType};
use llfsm_verify::domain::machine::{ExecutableInformation, ExecutableType, Llfsm, State};
use llfsm_verify::domain::pool::ExecutablePool;
use llfsm_verify::domain::scheduling::{Schedule, ScheduleThread, SnapshotSection, Timeslot};
use llfsm_verify::KripkeState;

/// Installs a test-writer subscriber once; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Pool whose ids follow the order of `executables`
pub fn pool_of(executables: Vec<ExecutableType>) -> ExecutablePool {
    ExecutablePool::new(
        executables
            .into_iter()
            .enumerate()
            .map(|(i, executable)| {
                (
                    ExecutableInformation::new(ExecutableId::new(i), executable.name().to_owned()),
                    executable,
                )
            })
            .collect(),
    )
    .expect("fixture pool is valid")
}

/// One boolean sensor; moves to its exit state once the sensor is true
pub fn switch() -> Llfsm {
    Llfsm::builder("Switch")
        .sensor("button", ValueType::Bool)
        .state(State::new("Initial").transition("Exit", |ctx| ctx.bool_external("button")))
        .state(State::new("Exit").observing(Vec::<String>::new()))
        .exit_state("Exit")
        .build()
        .expect("switch fixture is valid")
}

/// A machine with no inputs that never leaves its only state
pub fn idle(name: &str) -> Llfsm {
    Llfsm::builder(name)
        .state(State::new("Idle"))
        .build()
        .expect("idle fixture is valid")
}

/// Thread with a single one-slot section
pub fn one_slot(id: usize, start: TimeNs, duration: TimeNs) -> ScheduleThread {
    ScheduleThread::new(vec![SnapshotSection::new(vec![Timeslot::new(
        ExecutableId::new(id),
        start,
        duration,
    )])])
}

/// Schedule with a single thread holding a single slot
pub fn single_slot_schedule(id: usize, start: TimeNs, duration: TimeNs) -> Schedule {
    Schedule::new(vec![one_slot(id, start, duration)])
}

/// Value at `path` inside the `fsms` property of `state`
pub fn fsm_field<'s>(state: &'s KripkeState, path: &str) -> Option<&'s Value> {
    state.properties.get("fsms").and_then(|fsms| fsms.lookup(path))
}
