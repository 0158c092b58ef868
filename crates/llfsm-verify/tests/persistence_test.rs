//! Integration Test: Persistent Kripke Store
//!
//! Verifying into a sled database must produce the same structure as the
//! in-memory arena and survive a reopen. Schedules and configurations
//! load from JSON.

mod common;

use common::{init_tracing, pool_of, single_slot_schedule, switch};
use llfsm_verify::domain::machine::ExecutableType;
use llfsm_verify::{
    KripkeStructure, PersistentStore, RecordingView, Schedule, ScheduleVerifier, SledKripkeStore,
    VerificationReport, VerifierConfig,
};
use std::collections::BTreeMap;
use tempfile::TempDir;

/// `pc` → outgoing edge count, which identifies the switch structure up
/// to id assignment
fn shape(states: &[llfsm_verify::KripkeState]) -> BTreeMap<(String, usize), usize> {
    let mut shape = BTreeMap::new();
    for state in states {
        let key = (state.pc().unwrap_or_default().to_owned(), state.edges.len());
        *shape.entry(key).or_insert(0) += 1;
    }
    shape
}

/// Sled and in-memory stores agree
///
/// # Scenario
///
/// Verify the switch once into a [`KripkeStructure`] and once into a
/// [`SledKripkeStore`] in a temporary directory.
///
/// # Expected
///
/// Same number of states and edges and the same shape.
#[test]
fn test_sled_matches_memory() -> anyhow::Result<()> {
    init_tracing();
    let dir = TempDir::new()?;
    let pool = pool_of(vec![ExecutableType::Controllable(switch())]);
    let verifier = ScheduleVerifier::new(single_slot_schedule(0, 0, 30), VerifierConfig::default());

    let mut memory = KripkeStructure::new();
    verifier.verify(&pool, &mut RecordingView::new(), &mut memory)?;

    let mut sled = SledKripkeStore::open(dir.path().join("kripke"))?;
    let report = verifier.verify(&pool, &mut RecordingView::new(), &mut sled)?;

    assert_eq!(sled.len(), memory.len());
    assert_eq!(sled.edge_count()?, memory.edge_count());
    assert_eq!(report.stats.states_committed, sled.len());
    assert_eq!(shape(&sled.states()?), shape(&memory.states()?));
    Ok(())
}

/// Reopening a database
///
/// # Scenario
///
/// Verify into a sled store, drop it, then open the same path again.
///
/// # Expected
///
/// Every state, edge and initial flag is still there, and new states
/// continue the id sequence instead of reusing ids.
#[test]
fn test_reopen_preserves_structure() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("kripke");
    let pool = pool_of(vec![ExecutableType::Controllable(switch())]);
    let verifier = ScheduleVerifier::new(single_slot_schedule(0, 0, 30), VerifierConfig::default());

    let before = {
        let mut store = SledKripkeStore::open(&path)?;
        verifier.verify(&pool, &mut RecordingView::new(), &mut store)?;
        store.states()?
    };

    let mut reopened = SledKripkeStore::open(&path)?;
    let after = reopened.states()?;
    assert_eq!(after.len(), before.len());
    for (old, new) in before.iter().zip(&after) {
        assert_eq!(old.id, new.id);
        assert_eq!(old.properties, new.properties);
        assert_eq!(old.is_initial, new.is_initial);
        assert_eq!(old.edges, new.edges);
    }
    for state in &before {
        assert_eq!(reopened.id(&state.properties)?, Some(state.id));
    }

    let mut fresh = llfsm_core::PropertyList::new();
    fresh.insert("pc".into(), llfsm_core::Value::from("Other.S.R"));
    let (id, _) = reopened.add(fresh, false)?;
    assert_eq!(id.as_usize(), before.len());
    Ok(())
}

/// Schedules load from JSON
///
/// # Scenario
///
/// Serialize a schedule, parse it back and verify with the parsed copy.
///
/// # Expected
///
/// The parsed schedule equals the original and explores the same number
/// of states.
#[test]
fn test_schedule_from_json() -> anyhow::Result<()> {
    let schedule = single_slot_schedule(0, 0, 30);
    let json = serde_json::to_string(&schedule)?;
    let parsed: Schedule = serde_json::from_str(&json)?;
    assert_eq!(parsed, schedule);

    let pool = pool_of(vec![ExecutableType::Controllable(switch())]);
    let mut store = KripkeStructure::new();
    ScheduleVerifier::new(parsed, VerifierConfig::default()).verify(
        &pool,
        &mut RecordingView::new(),
        &mut store,
    )?;
    assert_eq!(store.len(), 9);
    Ok(())
}

/// Configuration and reports as JSON
///
/// # Scenario
///
/// Parse a partial configuration and serialize a finished report.
///
/// # Expected
///
/// Missing configuration fields take their defaults; the report decodes
/// to an equal value.
#[test]
fn test_config_and_report_json() -> anyhow::Result<()> {
    let config = VerifierConfig::from_json(r#"{"workers": 3, "max_jobs": 100}"#)?;
    assert_eq!(config.workers, 3);
    assert_eq!(config.max_jobs, Some(100));
    assert!(config.using_clocks);
    assert_eq!(config.starvation_limit, VerifierConfig::default().starvation_limit);

    let pool = pool_of(vec![ExecutableType::Controllable(switch())]);
    let report = ScheduleVerifier::new(single_slot_schedule(0, 0, 30), config).verify(
        &pool,
        &mut RecordingView::new(),
        &mut KripkeStructure::new(),
    )?;
    let decoded: VerificationReport = serde_json::from_str(&serde_json::to_string(&report)?)?;
    assert_eq!(decoded, report);
    Ok(())
}
