//! Verifier
//!
//! # Overview
//!
//! The top-level fixed-point driver. [`ScheduleVerifier`] explores every
//! schedule variation reachable from an initial pool, using a
//! [`CycleDetector`] to stop at states it has already expanded.
//!
//! # Architecture
//!
//! ```text
//! Initial ──▶ Exploring ──┬──▶ Committed ───▶ queue next job
//!                         └──▶ CycleClosed ─▶ branch ends
//! ```
//!
//! The run ends when the job queue drains; `View::finish` is then called
//! exactly once.

mod config;
mod cycle;
mod engine;
mod report;

pub use config::{CancellationToken, VerifierConfig, VerifierConfigBuilder, DEFAULT_STARVATION_LIMIT};
pub use cycle::{CycleDetector, HashTableCycleDetector};
pub use engine::ScheduleVerifier;
pub use report::{LivenessViolation, VerificationReport, VerificationStats};
