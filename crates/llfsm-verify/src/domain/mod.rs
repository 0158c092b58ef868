//! Domain Layer
//!
//! # Architecture Overview
//!
//! Leaf-to-root, every component only depends on the ones above it:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Domain Layer                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  call          Call, CallChain, Gateway, PoolGateway        │
//! │  clock         Clock, SteppedClock, ScheduleTiming          │
//! │  machine       Llfsm, ExecutableType, MachineContext        │
//! │  pool          ExecutablePool                               │
//! │  scheduling    Timeslot, SnapshotSection, Schedule          │
//! │                                                             │
//! │  ringlet       Ringlet, ConditionalRinglet                  │
//! │  combinations  Spinner, Combinations                        │
//! │  variations    SnapshotSectionVariations,                   │
//! │                ScheduleThreadVariations                     │
//! │                                                             │
//! │  kripke        KripkeState, PersistentStore, View           │
//! │  verifier      ScheduleVerifier, CycleDetector              │
//! │                                                             │
//! │  live          RoundRobinScheduler, Environment             │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Two Execution Modes
//!
//! - **Verification**: every branch owns a cloned [`ExecutablePool`]; the
//!   verifier is the only place where branches meet (cycle detector and
//!   sinks).
//! - **Live**: one pool, advanced cycle by cycle against an
//!   [`Environment`](live::Environment).
//!
//! ```rust
//! use llfsm_core::{ExecutableId, ValueType};
//! use llfsm_verify::domain::*;
//!
//! let machine = Llfsm::builder("Switch")
//!     .sensor("button", ValueType::Bool)
//!     .state(State::new("Off").transition("On", |ctx| ctx.bool_external("button")))
//!     .state(State::new("On").observing(Vec::<String>::new()))
//!     .exit_state("On")
//!     .build()
//!     .unwrap();
//! let id = ExecutableId::new(0);
//! let pool = ExecutablePool::new(vec![(
//!     ExecutableInformation::new(id, "Switch"),
//!     ExecutableType::Controllable(machine),
//! )])
//! .unwrap();
//! let schedule = Schedule::new(vec![ScheduleThread::new(vec![SnapshotSection::new(vec![
//!     Timeslot::new(id, 0, 30),
//! ])])]);
//!
//! let mut store = KripkeStructure::new();
//! let mut view = llfsm_verify::adapters::RecordingView::new();
//! let report = ScheduleVerifier::new(schedule, VerifierConfig::default())
//!     .verify(&pool, &mut view, &mut store)
//!     .unwrap();
//!
//! assert_eq!(report.stats.states_committed, store.len());
//! assert_eq!(view.finish_count(), 1);
//! ```

pub mod call;
pub mod clock;
pub mod combinations;
pub mod kripke;
pub mod live;
pub mod machine;
pub mod pool;
pub mod ringlet;
pub mod scheduling;
pub mod variations;
pub mod verifier;

// Re-export calls
pub use call::{Call, CallChain, CallMethod, Gateway, Parameters, PoolGateway, Promise};

// Re-export clock types
pub use clock::{Clock, ScheduleTiming, SteppedClock};

// Re-export machine types
pub use machine::{
    CallStatus,
    Dependency,
    ExecutableInformation,
    ExecutableType,
    ExternalKind,
    ExternalVariable,
    Llfsm,
    MachineContext,
    ParameterisedMachine,
    State,
};

// Re-export the pool and schedule model
pub use pool::ExecutablePool;
pub use scheduling::{Schedule, ScheduleThread, SnapshotSection, Timeslot};

// Re-export exploration types
pub use combinations::{Combinations, Spinner};
pub use ringlet::{ConditionalRinglet, Ringlet, TimeAwareRinglets, Timing};
pub use variations::{Pathway, ScheduleThreadVariations, SnapshotSectionPath, SnapshotSectionVariations};

// Re-export Kripke model and verifier
pub use kripke::{KripkeEdge, KripkeState, KripkeStructure, PersistentStore, StepKind, StepMarker, View};
pub use verifier::{
    CancellationToken,
    CycleDetector,
    HashTableCycleDetector,
    LivenessViolation,
    ScheduleVerifier,
    VerificationReport,
    VerificationStats,
    VerifierConfig,
};

// Re-export live scheduling
pub use live::{CycleReport, Environment, RoundRobinScheduler, SharedEnvironment};
