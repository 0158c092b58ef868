//! Error Taxonomy
//!
//! Three families of failure, grouped by how the caller must react:
//!
//! - [`ConfigurationError`]: the inputs are wrong (unregistered callee,
//!   malformed schedule, unenumerable external). Fatal; no partial output
//!   of the run is trustworthy.
//! - [`StoreError`] / [`ViewError`]: an I/O sink failed. Exploration halts,
//!   already committed state is left intact.
//! - [`VerificationError`]: the aggregate returned by the verifier, adding
//!   explicit early-termination reasons (cancellation, job limit).
//!
//! Spinner exhaustion and cycle closure are normal control flow and never
//! surface as errors.

use llfsm_core::{ExecutableId, StateId};
use thiserror::Error;

/// Fatal input errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Pool & Schedule
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    /// Referenced executable is not registered in the pool
    #[error("{0} is not registered in the executable pool")]
    UnknownExecutable(ExecutableId),

    /// Two pool entries share an id
    #[error("{0} is registered more than once")]
    DuplicateExecutable(ExecutableId),

    /// Schedule violates a structural rule
    #[error("malformed schedule: {0}")]
    MalformedSchedule(String),

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Calls
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    /// A machine called a name the gateway cannot resolve
    #[error("`{caller}` called unregistered executable `{callee}`")]
    UnknownCallee {
        /// Name of the calling machine
        caller: String,
        /// Name that failed to resolve
        callee: String,
    },

    /// Callee exists but cannot accept calls
    #[error("`{0}` is not a parameterised machine and cannot be called")]
    NotCallable(String),

    /// Callee with the same parameters is already on the call chain
    #[error("cyclic call to {callee} in call chain rooted at {root}")]
    CyclicCall {
        /// Root of the chain
        root: ExecutableId,
        /// Callee that closed the cycle
        callee: ExecutableId,
    },

    /// Call does not originate from the active executable of the chain
    #[error("call from {caller} does not originate from active executable {active}")]
    DetachedCall {
        /// Caller recorded on the call
        caller: ExecutableId,
        /// Executable currently in control
        active: ExecutableId,
    },

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Machines & Values
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    /// External whose domain the spinner cannot enumerate
    #[error("domain of `{name}` cannot be enumerated")]
    UnenumerableDomain {
        /// Name of the external (or a positional label)
        name: String,
    },

    /// Compound type that declares a field name twice
    #[error("type of `{name}` declares field `{field}` more than once")]
    DuplicateField {
        /// Name of the external (or a positional label)
        name: String,
        /// Repeated field
        field: String,
    },

    /// Reference to a state the machine does not define
    #[error("machine `{machine}` has no state named `{state}`")]
    UnknownState {
        /// Machine name
        machine: String,
        /// Missing state
        state: String,
    },

    /// State name declared twice
    #[error("machine `{machine}` declares state `{state}` more than once")]
    DuplicateState {
        /// Machine name
        machine: String,
        /// Repeated state
        state: String,
    },

    /// Reference to an undeclared variable, external or parameter
    #[error("machine `{machine}` has no variable, external or parameter named `{name}`")]
    UnknownVariable {
        /// Machine name
        machine: String,
        /// Missing name
        name: String,
    },

    /// Value does not inhabit the declared type
    #[error("value for `{name}` does not match its declared type `{expected}`")]
    TypeMismatch {
        /// Variable, external or parameter name
        name: String,
        /// Declared type
        expected: String,
    },

    /// Machine declares no states
    #[error("machine `{0}` has no states")]
    EmptyMachine(String),
}

/// Persistent store failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying sled failure
    #[error("storage backend failure: {0}")]
    Backend(#[from] sled::Error),

    /// Encoding or decoding a record failed
    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No state with this id exists
    #[error("{0} does not exist in the store")]
    UnknownState(StateId),

    /// Stored bytes are not a valid record
    #[error("corrupted record: {0}")]
    Corrupted(String),
}

/// View sink failures
#[derive(Debug, Error)]
pub enum ViewError {
    /// Writing to the sink failed
    #[error("view I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding a state failed
    #[error("view serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Aggregate error returned by a verification run
#[derive(Debug, Error)]
pub enum VerificationError {
    /// Inputs are invalid
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Persistent store failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// View failed
    #[error(transparent)]
    View(#[from] ViewError),

    /// Cancellation token fired between two job expansions
    #[error("verification cancelled after {jobs} jobs")]
    Cancelled {
        /// Jobs fully processed before cancellation
        jobs: usize,
    },

    /// Configured job cap reached
    #[error("job limit of {limit} exceeded")]
    JobLimitExceeded {
        /// The configured cap
        limit: usize,
    },

    /// A parallel expansion worker panicked
    #[error("expansion worker panicked")]
    WorkerPanicked,
}

/// Result alias for verification runs
pub type VerificationResult<T> = Result<T, VerificationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_messages() {
        let err = ConfigurationError::UnknownCallee {
            caller: "Caller".into(),
            callee: "Missing".into(),
        };
        assert_eq!(err.to_string(), "`Caller` called unregistered executable `Missing`");

        let err = ConfigurationError::UnknownExecutable(ExecutableId::new(4));
        assert_eq!(err.to_string(), "Executable(4) is not registered in the executable pool");
    }

    #[test]
    fn test_configuration_converts_transparently() {
        let err: VerificationError = ConfigurationError::EmptyMachine("m".into()).into();
        assert!(matches!(err, VerificationError::Configuration(_)));
        assert_eq!(err.to_string(), "machine `m` has no states");
    }

    #[test]
    fn test_store_error_from_json() {
        let json_err = serde_json::from_str::<u8>("nope").unwrap_err();
        let err: StoreError = json_err.into();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
