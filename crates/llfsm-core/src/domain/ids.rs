//! Identifier Types
//!
//! Newtype identifiers used across the scheduler and the verifier.
//!
//! # Design Notes
//!
//! Both identifiers wrap a plain `usize`. An `ExecutableId` names a machine
//! registered in an executable pool; a `StateId` names a Kripke state in an
//! arena. Keeping them distinct types means an edge target can never be
//! confused with the machine that produced it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Time measured in nanoseconds of schedule time.
///
/// Timeslot offsets, durations and clock thresholds all use this unit.
pub type TimeNs = u64;

/// Executable identifier
///
/// Uniquely identifies an executable (a plain or parameterised machine)
/// within an executable pool. Pools are kept sorted by this id.
///
/// # Example
///
/// ```rust
/// use llfsm_core::ExecutableId;
///
/// let sensor = ExecutableId::new(0);
/// let actuator = ExecutableId::new(1);
///
/// assert!(sensor < actuator);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutableId(pub usize);

impl ExecutableId {
    /// Create a new ExecutableId
    #[inline(always)]
    #[must_use]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    /// Get the raw numeric ID
    #[inline(always)]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for ExecutableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Executable({})", self.0)
    }
}

/// Kripke state identifier
///
/// Stable index of a state inside a Kripke arena. Edges reference their
/// target through this id rather than through a structural pointer, which
/// keeps cyclic graphs (including self-loops) plain data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(pub usize);

impl StateId {
    /// Create a new StateId
    #[inline(always)]
    #[must_use]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    /// Get the raw numeric ID
    #[inline(always)]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "State({})", self.0)
    }
}
