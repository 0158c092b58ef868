//! LLFSM Schedule Verifier
//!
//! # Overview
//!
//! `llfsm-verify` schedules collections of low-level finite-state machines
//! deterministically and exhaustively enumerates every execution history
//! of a schedule, producing a Kripke structure for external model
//! checkers.
//!
//! # Trinity Architecture
//!
//! This crate follows the Trinity Architecture pattern:
//!
//! - **Domain**: machines, schedules, ringlets, variations, the verifier
//!   and the live scheduler
//! - **Infrastructure**: the sled-backed persistent store
//! - **Adapters**: views that consume the discovered states
//!
//! # Guarantees
//!
//! ## Enumeration
//! - Every input combination of every observed external is explored,
//!   each exactly once
//! - Time-aware ringlets partition elapsed time without gaps or overlaps
//!
//! ## Exploration
//! - A state is committed to the view at most once
//! - `View::finish` is called exactly once per completed run
//! - The only silently closed branches are cycle closures
//!
//! # Usage
//!
//! ```rust
//! use llfsm_core::{ExecutableId, ValueType};
//! use llfsm_verify::{
//!     ExecutableInformation, ExecutablePool, ExecutableType, KripkeStructure, Llfsm, RecordingView,
//!     Schedule, ScheduleThread, ScheduleVerifier, SnapshotSection, State, Timeslot, VerifierConfig,
//! };
//!
//! // 1. Describe the machine
//! let switch = Llfsm::builder("Switch")
//!     .sensor("button", ValueType::Bool)
//!     .state(State::new("Off").transition("On", |ctx| ctx.bool_external("button")))
//!     .state(State::new("On").observing(Vec::<String>::new()))
//!     .exit_state("On")
//!     .build()
//!     .unwrap();
//!
//! // 2. Put it in a pool and give it a timeslot
//! let id = ExecutableId::new(0);
//! let pool = ExecutablePool::new(vec![(
//!     ExecutableInformation::new(id, "Switch"),
//!     ExecutableType::Controllable(switch),
//! )])
//! .unwrap();
//! let schedule = Schedule::new(vec![ScheduleThread::new(vec![SnapshotSection::new(vec![
//!     Timeslot::new(id, 0, 30),
//! ])])]);
//!
//! // 3. Explore
//! let mut view = RecordingView::new();
//! let mut store = KripkeStructure::new();
//! let report = ScheduleVerifier::new(schedule, VerifierConfig::default())
//!     .verify(&pool, &mut view, &mut store)
//!     .unwrap();
//!
//! // 4. Inspect
//! assert_eq!(view.states().len(), report.stats.states_committed);
//! assert_eq!(store.initial_states().count(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

// Trinity Architecture Layers
pub mod adapters;
pub mod domain;
pub mod error;
pub mod infrastructure;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Re-export Primary Types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

// Machines and pool
pub use domain::{
    ExecutableInformation,
    ExecutablePool,
    ExecutableType,
    Llfsm,
    ParameterisedMachine,
    State,
};

// Schedule model
pub use domain::{Schedule, ScheduleThread, SnapshotSection, Timeslot};

// Verification
pub use domain::{
    CancellationToken,
    KripkeEdge,
    KripkeState,
    KripkeStructure,
    PersistentStore,
    ScheduleVerifier,
    VerificationReport,
    VerifierConfig,
    View,
};

// Live scheduling
pub use domain::{RoundRobinScheduler, SharedEnvironment};

// Sinks and storage
pub use adapters::{JsonLinesView, RecordingView};
pub use infrastructure::SledKripkeStore;

// Errors
pub use error::{ConfigurationError, StoreError, VerificationError, VerificationResult, ViewError};

/// Library version
pub const LLFSM_VERIFY_VERSION: &str = env!("CARGO_PKG_VERSION");
