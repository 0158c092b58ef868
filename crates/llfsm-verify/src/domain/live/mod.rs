//! Live Scheduling
//!
//! # Overview
//!
//! A conventional round-robin executor for the same schedules the
//! verifier explores. Where the verifier enumerates every input value,
//! the live scheduler reads the one value the [`Environment`] holds.
//!
//! # Architecture
//!
//! ```text
//! for each section, in (start, thread) order:
//!     Environment ──read inputs──▶ pool
//!     execute every timeslot once (SteppedClock at virtual time)
//!     pool ──write outputs──▶ Environment
//! ```
//!
//! Time is virtual: each cycle advances the scheduler's clock by the
//! schedule's cycle length. Real-time guarantees are not provided.

mod environment;
mod round_robin;

pub use environment::{Environment, SharedEnvironment};
pub use round_robin::{CycleReport, RoundRobinScheduler};
