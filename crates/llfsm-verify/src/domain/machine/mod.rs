//! Machines
//!
//! # Overview
//!
//! Low-level finite-state machines and the executable wrapper the pool
//! stores them in.
//!
//! # Architecture
//!
//! ```text
//! ExecutableType ──┬── Controllable(Llfsm)
//!                  └── Parameterised(ParameterisedMachine ── Llfsm)
//!
//! Llfsm ──Arc──▶ MachineDefinition ── State ── Transition
//!   │
//!   └── step(clock, gateway) ──▶ MachineContext ──▶ actions / guards
//! ```
//!
//! Machines never expose runtime types to the engine. Each one declares
//! the shape of its data and produces a [`Value`](llfsm_core::Value)
//! snapshot on demand.

mod context;
mod definition;
mod executable;
mod external;
mod llfsm;

pub use context::MachineContext;
pub use definition::{Action, Guard, LlfsmBuilder, MachineDefinition, State, Transition};
pub use executable::{CallStatus, Dependency, ExecutableInformation, ExecutableType, ParameterisedMachine};
pub use external::{ExternalKind, ExternalVariable};
pub use llfsm::{Llfsm, StepOutcome, INITIAL_PREVIOUS_STATE};
