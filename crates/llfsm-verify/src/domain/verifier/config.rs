//! Verifier Configuration
//!
//! Every switch that influences a run is carried by [`VerifierConfig`] and
//! lives exactly as long as the run.
//!
//! ```rust
//! use llfsm_verify::domain::verifier::{CancellationToken, VerifierConfig};
//!
//! let token = CancellationToken::new();
//! let config = VerifierConfig::builder()
//!     .workers(4)
//!     .max_jobs(10_000)
//!     .cancellation(token.clone())
//!     .build();
//!
//! assert_eq!(config.workers, 4);
//! assert!(!token.is_cancelled());
//! ```

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Consecutive non-transitioning ringlets tolerated before a machine is
/// reported as stuck
pub const DEFAULT_STARVATION_LIMIT: u64 = 10;

/// Shared flag for stopping a run between two job expansions
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Fresh, uncancelled token
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl PartialEq for CancellationToken {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for CancellationToken {}

/// Settings of one verification run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Forwarded to [`View::reset`](crate::domain::kripke::View::reset)
    pub using_clocks: bool,
    /// Jobs expanded concurrently per batch
    pub workers: usize,
    /// Hard cap on processed jobs
    pub max_jobs: Option<usize>,
    /// See [`DEFAULT_STARVATION_LIMIT`]
    pub starvation_limit: u64,
    /// Cancellation handle
    #[serde(skip)]
    pub cancellation: Option<CancellationToken>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            using_clocks: true,
            workers: 1,
            max_jobs: None,
            starvation_limit: DEFAULT_STARVATION_LIMIT,
            cancellation: None,
        }
    }
}

impl VerifierConfig {
    /// Start building a configuration from the defaults
    #[must_use]
    pub fn builder() -> VerifierConfigBuilder {
        VerifierConfigBuilder::default()
    }

    /// Parses a configuration; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Malformed JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Whether the token, if any, was cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

/// Builder for [`VerifierConfig`]
#[derive(Debug, Default)]
pub struct VerifierConfigBuilder {
    config: VerifierConfig,
}

impl VerifierConfigBuilder {
    /// Whether views should render clocks
    #[must_use]
    pub const fn using_clocks(mut self, using_clocks: bool) -> Self {
        self.config.using_clocks = using_clocks;
        self
    }

    /// Parallel expansion width (at least 1)
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers.max(1);
        self
    }

    /// Cap on processed jobs
    #[must_use]
    pub const fn max_jobs(mut self, max_jobs: usize) -> Self {
        self.config.max_jobs = Some(max_jobs);
        self
    }

    /// Liveness threshold
    #[must_use]
    pub const fn starvation_limit(mut self, limit: u64) -> Self {
        self.config.starvation_limit = limit;
        self
    }

    /// Cancellation handle
    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.config.cancellation = Some(token);
        self
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> VerifierConfig {
        self.config
    }
}
