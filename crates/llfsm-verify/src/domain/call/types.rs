//! Call Types
//!
//! A [`Call`] records one cross-machine invocation issued during a ringlet.
//!
//! # Ordering
//!
//! Calls are ordered by [`CallMethod`] first (synchronous before
//! asynchronous) and then by caller, callee and parameters. The ringlet
//! executor relies on this to process the calls issued in one step in a
//! deterministic order.

use llfsm_core::{ExecutableId, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Arguments passed with a call. `None` selects the parameter's default.
pub type Parameters = BTreeMap<String, Option<Value>>;

/// How a call interacts with its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CallMethod {
    /// Caller waits until the callee has completed a step within the
    /// same ringlet
    Synchronous,
    /// Callee is started and the caller continues immediately
    Asynchronous,
}

impl CallMethod {
    /// Returns true for [`CallMethod::Synchronous`]
    #[must_use]
    pub const fn is_synchronous(self) -> bool {
        matches!(self, Self::Synchronous)
    }
}

impl fmt::Display for CallMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Synchronous => write!(f, "sync"),
            Self::Asynchronous => write!(f, "async"),
        }
    }
}

/// A single cross-machine invocation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Call {
    /// Executable that issued the call
    pub caller: ExecutableId,
    /// Executable being called
    pub callee: ExecutableId,
    /// Arguments, keyed by parameter name
    pub parameters: Parameters,
    /// Synchronous or asynchronous
    pub method: CallMethod,
}

impl Call {
    /// Create a new call
    #[must_use]
    pub const fn new(
        caller: ExecutableId,
        callee: ExecutableId,
        parameters: Parameters,
        method: CallMethod,
    ) -> Self {
        Self {
            caller,
            callee,
            parameters,
            method,
        }
    }

    /// Whether `other` targets the same callee with the same arguments
    #[must_use]
    pub fn same_invocation(&self, other: &Self) -> bool {
        self.callee == other.callee && self.parameters == other.parameters
    }
}

impl PartialOrd for Call {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Call {
    fn cmp(&self, other: &Self) -> Ordering {
        self.method
            .cmp(&other.method)
            .then_with(|| self.caller.cmp(&other.caller))
            .then_with(|| self.callee.cmp(&other.callee))
            .then_with(|| self.parameters.cmp(&other.parameters))
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -[{}]-> {}", self.caller, self.method, self.callee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(method: CallMethod, callee: usize) -> Call {
        Call::new(
            ExecutableId::new(0),
            ExecutableId::new(callee),
            Parameters::new(),
            method,
        )
    }

    #[test]
    fn test_synchronous_sorts_first() {
        let mut calls = vec![
            call(CallMethod::Asynchronous, 1),
            call(CallMethod::Synchronous, 2),
            call(CallMethod::Asynchronous, 0),
        ];
        calls.sort();
        assert_eq!(calls[0].method, CallMethod::Synchronous);
        assert_eq!(calls[1].callee, ExecutableId::new(0));
        assert_eq!(calls[2].callee, ExecutableId::new(1));
    }

    #[test]
    fn test_equality_uses_all_fields() {
        let a = call(CallMethod::Synchronous, 1);
        let mut b = a.clone();
        assert_eq!(a, b);
        b.parameters.insert("x".into(), Some(Value::U8(1)));
        assert_ne!(a, b);
        assert!(!a.same_invocation(&b));
    }

    #[test]
    fn test_parameters_hash_independent_of_insertion_order() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut first = call(CallMethod::Synchronous, 1);
        first.parameters.insert("a".into(), Some(Value::Bool(true)));
        first.parameters.insert("b".into(), None);

        let mut second = call(CallMethod::Synchronous, 1);
        second.parameters.insert("b".into(), None);
        second.parameters.insert("a".into(), Some(Value::Bool(true)));

        let hash = |c: &Call| {
            let mut hasher = DefaultHasher::new();
            c.hash(&mut hasher);
            hasher.finish()
        };
        assert_eq!(hash(&first), hash(&second));
    }
}
