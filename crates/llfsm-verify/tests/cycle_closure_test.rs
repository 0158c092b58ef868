//! Integration Test: Exploration Termination
//!
//! Exploration must stop on its own once every branch closes a cycle,
//! and must stop on request (cancellation, job limit) without finishing
//! the view.

mod common;

use common::{idle, init_tracing, one_slot, pool_of, single_slot_schedule, switch};
use llfsm_core::ValueType;
use llfsm_verify::domain::machine::{ExecutableType, Llfsm, State};
use llfsm_verify::domain::verifier::LivenessViolation;
use llfsm_verify::{
    CancellationToken, KripkeStructure, PersistentStore, RecordingView, Schedule, ScheduleVerifier,
    VerificationError, VerifierConfig,
};
use std::collections::HashSet;

fn two_buttons() -> Llfsm {
    Llfsm::builder("Pair")
        .sensor("left", ValueType::Bool)
        .sensor("right", ValueType::Bool)
        .state(State::new("Watch"))
        .build()
        .expect("pair fixture is valid")
}

/// Every state is committed exactly once
///
/// # Scenario
///
/// Explore the switch and record every commit.
///
/// # Expected
///
/// No property list is committed twice and `finish` runs once.
#[test]
fn test_no_duplicate_commits() -> anyhow::Result<()> {
    init_tracing();
    let pool = pool_of(vec![ExecutableType::Controllable(switch())]);
    let verifier = ScheduleVerifier::new(single_slot_schedule(0, 0, 30), VerifierConfig::default());
    let mut view = RecordingView::new();
    let mut store = KripkeStructure::new();
    verifier.verify(&pool, &mut view, &mut store)?;

    let unique: HashSet<_> = view.states().iter().map(|state| state.properties.clone()).collect();
    assert_eq!(unique.len(), view.states().len());
    assert_eq!(view.states().len(), store.len());
    assert_eq!(view.finish_count(), 1);
    Ok(())
}

/// Views are reset at the start of every run
///
/// # Scenario
///
/// Run the same verifier twice into the same view, first without and
/// then with clocks.
///
/// # Expected
///
/// The second run does not see states from the first and the recorded
/// resets follow the configuration.
#[test]
fn test_view_reset_between_runs() -> anyhow::Result<()> {
    let pool = pool_of(vec![ExecutableType::Controllable(idle("M"))]);
    let mut view = RecordingView::new();

    let untimed = VerifierConfig::builder().using_clocks(false).build();
    ScheduleVerifier::new(single_slot_schedule(0, 0, 10), untimed).verify(
        &pool,
        &mut view,
        &mut KripkeStructure::new(),
    )?;
    let first = view.states().len();

    ScheduleVerifier::new(single_slot_schedule(0, 0, 10), VerifierConfig::default()).verify(
        &pool,
        &mut view,
        &mut KripkeStructure::new(),
    )?;

    assert_eq!(view.states().len(), first);
    assert_eq!(view.resets(), &[false, true]);
    assert_eq!(view.finish_count(), 1);
    Ok(())
}

/// Every combination of independent sensors
///
/// # Scenario
///
/// A machine observing two booleans that never transitions.
///
/// # Expected
///
/// Four initial states, one per combination. Every later cycle reads
/// the sensors again, adding four read states that no longer execute
/// onEntry.
#[test]
fn test_two_sensors_four_initial_states() -> anyhow::Result<()> {
    let pool = pool_of(vec![ExecutableType::Controllable(two_buttons())]);
    let verifier = ScheduleVerifier::new(single_slot_schedule(0, 0, 10), VerifierConfig::default());
    let mut store = KripkeStructure::new();
    verifier.verify(&pool, &mut RecordingView::new(), &mut store)?;

    assert_eq!(store.initial_states().count(), 4);
    let reads = store
        .iter()
        .filter(|state| state.pc() == Some("Pair.Watch.R"))
        .count();
    assert_eq!(reads, 8);
    assert!(store.initial_states().all(|state| state.edges.len() == 1));
    Ok(())
}

/// A machine without inputs has one history
///
/// # Scenario
///
/// An idle machine with no externals.
///
/// # Expected
///
/// One initial state; the whole structure is a single R → W → R loop.
#[test]
fn test_no_inputs_single_history() -> anyhow::Result<()> {
    let pool = pool_of(vec![ExecutableType::Controllable(idle("M"))]);
    let verifier = ScheduleVerifier::new(single_slot_schedule(0, 0, 10), VerifierConfig::default());
    let mut store = KripkeStructure::new();
    let report = verifier.verify(&pool, &mut RecordingView::new(), &mut store)?;

    assert_eq!(store.initial_states().count(), 1);
    assert!(store.iter().all(|state| state.edges.len() == 1));
    assert!(report.stats.cycles_closed >= 1);
    Ok(())
}

/// Cancellation stops before the first job
///
/// # Scenario
///
/// Cancel the token before calling `verify`.
///
/// # Expected
///
/// `Cancelled { jobs: 0 }`; the view was reset but never finished.
#[test]
fn test_cancelled_before_start() {
    let token = CancellationToken::new();
    token.cancel();
    let config = VerifierConfig::builder().cancellation(token).build();
    let pool = pool_of(vec![ExecutableType::Controllable(switch())]);
    let mut view = RecordingView::new();

    let result = ScheduleVerifier::new(single_slot_schedule(0, 0, 30), config).verify(
        &pool,
        &mut view,
        &mut KripkeStructure::new(),
    );

    assert!(matches!(result, Err(VerificationError::Cancelled { jobs: 0 })));
    assert_eq!(view.finish_count(), 0);
    assert_eq!(view.resets().len(), 1);
}

/// Job limit
///
/// # Scenario
///
/// The switch needs four jobs; allow two.
///
/// # Expected
///
/// `JobLimitExceeded { limit: 2 }` and no `finish`.
#[test]
fn test_job_limit_exceeded() {
    let config = VerifierConfig::builder().max_jobs(2).build();
    let pool = pool_of(vec![ExecutableType::Controllable(switch())]);
    let mut view = RecordingView::new();

    let result = ScheduleVerifier::new(single_slot_schedule(0, 0, 30), config).verify(
        &pool,
        &mut view,
        &mut KripkeStructure::new(),
    );

    assert!(matches!(
        result,
        Err(VerificationError::JobLimitExceeded { limit: 2 })
    ));
    assert_eq!(view.finish_count(), 0);
}

/// A sufficient job limit is not an error
///
/// # Scenario
///
/// Allow exactly the four jobs the switch needs.
///
/// # Expected
///
/// The run completes.
#[test]
fn test_job_limit_exactly_met() -> anyhow::Result<()> {
    let config = VerifierConfig::builder().max_jobs(4).build();
    let pool = pool_of(vec![ExecutableType::Controllable(switch())]);
    let report = ScheduleVerifier::new(single_slot_schedule(0, 0, 30), config).verify(
        &pool,
        &mut RecordingView::new(),
        &mut KripkeStructure::new(),
    )?;
    assert_eq!(report.stats.jobs_processed, 4);
    Ok(())
}

/// Starvation is reported, not fatal
///
/// # Scenario
///
/// An idle machine never transitions; lower the starvation limit to 0.
///
/// # Expected
///
/// Exactly one `Stuck` violation for the machine and a complete run.
#[test]
fn test_stuck_machine_reported_once() -> anyhow::Result<()> {
    let config = VerifierConfig::builder().starvation_limit(0).build();
    let pool = pool_of(vec![ExecutableType::Controllable(idle("M"))]);
    let mut view = RecordingView::new();
    let report = ScheduleVerifier::new(single_slot_schedule(0, 0, 10), config).verify(
        &pool,
        &mut view,
        &mut KripkeStructure::new(),
    )?;

    assert_eq!(report.liveness.len(), 1);
    assert!(matches!(report.liveness[0], LivenessViolation::Stuck { cycles, .. } if cycles >= 1));
    assert_eq!(view.finish_count(), 1);
    Ok(())
}

/// Unknown executables are rejected up front
///
/// # Scenario
///
/// Schedule a timeslot for an id that is not in the pool, next to a
/// valid thread.
///
/// # Expected
///
/// A configuration error and an untouched view.
#[test]
fn test_unknown_executable_rejected() {
    let pool = pool_of(vec![ExecutableType::Controllable(idle("M"))]);
    let schedule = Schedule::new(vec![one_slot(0, 0, 10), one_slot(7, 20, 10)]);
    let mut view = RecordingView::new();

    let result = ScheduleVerifier::new(schedule, VerifierConfig::default()).verify(
        &pool,
        &mut view,
        &mut KripkeStructure::new(),
    );

    assert!(matches!(result, Err(VerificationError::Configuration(_))));
    assert!(view.resets().is_empty());
}
