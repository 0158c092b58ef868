//! # LLFSM Core
//!
//! Shared value model between the scheduler and the verification engine.
//! Everything in here is plain data: identifiers, the schema-driven value
//! representation machines snapshot into, and the clock constraints that
//! label Kripke edges.
//!
//! ## Module Organization
//!
//! - `domain::ids`: stable identifiers (`ExecutableId`, `StateId`) and `TimeNs`
//! - `domain::value`: `Value`, `ValueType`, `PropertyList`
//! - `domain::constraint`: `Constraint`, the clock-constraint algebra

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod domain;

// Re-export commonly used types
pub use domain::{Constraint, ExecutableId, PropertyList, StateId, TimeNs, Value, ValueType};

/// Library version
pub const LLFSM_CORE_VERSION: &str = env!("CARGO_PKG_VERSION");
