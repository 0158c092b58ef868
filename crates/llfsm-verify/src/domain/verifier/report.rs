//! Verification Report

use llfsm_core::ExecutableId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Counters collected during a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationStats {
    /// Jobs fully processed
    pub jobs_processed: usize,
    /// Schedule variations walked
    pub schedule_variations: usize,
    /// States handed to the view
    pub states_committed: usize,
    /// Branches closed by the cycle detector
    pub cycles_closed: usize,
    /// Longest the job queue got
    pub max_queue_length: usize,
}

/// Liveness finding
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LivenessViolation {
    /// A machine ran more consecutive ringlets without transitioning than
    /// the configured limit
    Stuck {
        /// Machine that is stuck
        executable: ExecutableId,
        /// Consecutive ringlets without a transition
        cycles: u64,
    },
}

impl fmt::Display for LivenessViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stuck { executable, cycles } => {
                write!(f, "{executable} did not transition for {cycles} ringlets")
            }
        }
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Counters
    pub stats: VerificationStats,
    /// At most one finding per executable
    pub liveness: Vec<LivenessViolation>,
}
