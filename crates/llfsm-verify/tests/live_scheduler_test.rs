//! Integration Test: Live Round-Robin Execution
//!
//! Machines exchange values only through the environment, at section
//! boundaries, so execution order within the cycle decides when a write
//! becomes visible.

mod common;

use common::{one_slot, pool_of};
use llfsm_core::{ExecutableId, Value, ValueType};
use llfsm_verify::domain::live::{Environment, SharedEnvironment};
use llfsm_verify::domain::machine::{ExecutableType, Llfsm, State};
use llfsm_verify::{ConfigurationError, RoundRobinScheduler, Schedule};

fn producer() -> Llfsm {
    Llfsm::builder("Producer")
        .actuator("signal", ValueType::Bool)
        .state(State::new("Emit").on_entry(|ctx| {
            ctx.set_external("signal", true);
        }))
        .build()
        .expect("producer fixture is valid")
}

fn consumer() -> Llfsm {
    Llfsm::builder("Consumer")
        .sensor("signal", ValueType::Bool)
        .state(State::new("Wait").transition("Got", |ctx| ctx.bool_external("signal")))
        .state(State::new("Got"))
        .exit_state("Got")
        .build()
        .expect("consumer fixture is valid")
}

fn scheduler(producer_start: u64, consumer_start: u64) -> anyhow::Result<RoundRobinScheduler> {
    let pool = pool_of(vec![
        ExecutableType::Controllable(producer()),
        ExecutableType::Controllable(consumer()),
    ]);
    let schedule = Schedule::new(vec![
        one_slot(0, producer_start, 10),
        one_slot(1, consumer_start, 10),
    ]);
    Ok(RoundRobinScheduler::new(schedule, pool)?)
}

/// Writer scheduled before the reader
///
/// # Scenario
///
/// Producer runs at 0, Consumer at 20.
///
/// # Expected
///
/// The Consumer sees the signal in the same cycle.
#[test]
fn test_write_visible_later_in_cycle() -> anyhow::Result<()> {
    let mut scheduler = scheduler(0, 20)?;
    let env = SharedEnvironment::new();

    let report = scheduler.run_cycle(&env)?;
    assert_eq!(env.read("signal"), Some(Value::Bool(true)));
    assert_eq!(report.transitioned, vec![ExecutableId::new(1)]);
    assert_eq!(report.ringlets, 2);
    Ok(())
}

/// Reader scheduled before the writer
///
/// # Scenario
///
/// Consumer runs at 0, Producer at 20.
///
/// # Expected
///
/// The Consumer only sees the signal one cycle later.
#[test]
fn test_write_visible_next_cycle() -> anyhow::Result<()> {
    let mut scheduler = scheduler(20, 0)?;
    let env = SharedEnvironment::new();

    let first = scheduler.run_cycle(&env)?;
    assert!(first.transitioned.is_empty());
    let second = scheduler.run_cycle(&env)?;
    assert_eq!(second.transitioned, vec![ExecutableId::new(1)]);
    assert_eq!(second.started_at, 30);
    Ok(())
}

/// Running until every machine finishes
///
/// # Scenario
///
/// The Producer never finishes, so `run` uses every cycle it is given.
///
/// # Expected
///
/// Exactly the requested number of cycles and virtual time advanced by
/// one cycle length per cycle.
#[test]
fn test_run_bounded_by_cycles() -> anyhow::Result<()> {
    let mut scheduler = scheduler(0, 20)?;
    let reports = scheduler.run(&SharedEnvironment::new(), 4)?;

    assert_eq!(reports.len(), 4);
    assert_eq!(scheduler.cycles(), 4);
    assert_eq!(scheduler.now(), 4 * 30);
    assert!(!scheduler.has_finished());
    let got = scheduler
        .pool()
        .get(ExecutableId::new(1))
        .map(|executable| executable.machine().current_state().to_owned());
    assert_eq!(got.as_deref(), Some("Got"));
    Ok(())
}

/// Preloaded environment values
///
/// # Scenario
///
/// The environment already holds `signal = true` before the first cycle.
///
/// # Expected
///
/// The Consumer transitions in cycle 0 even though it runs first.
#[test]
fn test_preloaded_environment() -> anyhow::Result<()> {
    let mut scheduler = scheduler(20, 0)?;
    let mut values = llfsm_core::PropertyList::new();
    values.insert("signal".into(), Value::Bool(true));
    let env = SharedEnvironment::with_values(values);

    let report = scheduler.run_cycle(&env)?;
    assert_eq!(report.transitioned, vec![ExecutableId::new(1)]);
    Ok(())
}

/// Invalid schedules are rejected at construction
///
/// # Scenario
///
/// A timeslot for an id that is not in the pool.
///
/// # Expected
///
/// `UnknownExecutable`.
#[test]
fn test_invalid_schedule_rejected() {
    let pool = pool_of(vec![ExecutableType::Controllable(producer())]);
    let schedule = Schedule::new(vec![one_slot(5, 0, 10)]);
    assert!(matches!(
        RoundRobinScheduler::new(schedule, pool),
        Err(ConfigurationError::UnknownExecutable(_))
    ));
}
