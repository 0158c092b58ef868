//! Ringlets
//!
//! The atomic unit of execution: one timeslot advancing its machine from
//! a pre-state to a post-state.
//!
//! # Architecture
//!
//! ```text
//! TimeAwareRinglets ──▶ ConditionalRinglet* ──▶ Ringlet ──▶ execute_timeslot
//!   (per interval)        (condition)            (snapshots)   (step + calls)
//! ```

mod conditional;
mod execution;
mod step;

pub use conditional::{ConditionalRinglet, TimeAwareRinglets, Timing};
pub use execution::{execute_timeslot, Execution};
pub use step::Ringlet;
