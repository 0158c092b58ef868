//! Call Chains
//!
//! # Overview
//!
//! A [`CallChain`] is the stack of synchronous calls active while a
//! timeslot executes. The machine "in control" is the callee of the most
//! recent call, or the root if nothing has been called.
//!
//! ```text
//! root ──call──▶ A ──call──▶ B        executable() == B
//!                                     pop()  → executable() == A
//! ```
//!
//! # Invariants
//!
//! - `add` followed by `pop` restores the chain exactly.
//! - A call must originate from the executable currently in control.
//! - The same callee with the same arguments may not appear twice, and the
//!   root may not be called; either would recurse forever.

use super::types::Call;
use crate::domain::machine::ExecutableType;
use crate::domain::pool::ExecutablePool;
use crate::error::ConfigurationError;
use llfsm_core::ExecutableId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stack of active synchronous calls rooted at a scheduled executable
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallChain {
    root: ExecutableId,
    calls: Vec<Call>,
}

impl CallChain {
    /// Create an empty chain rooted at `root`
    #[must_use]
    pub const fn new(root: ExecutableId) -> Self {
        Self {
            root,
            calls: Vec::new(),
        }
    }

    /// The scheduled executable the chain starts from
    #[must_use]
    pub const fn root(&self) -> ExecutableId {
        self.root
    }

    /// Active calls, outermost first
    #[must_use]
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Number of active calls
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// True when no call is active
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// The executable currently in control
    #[must_use]
    pub fn executable(&self) -> ExecutableId {
        self.calls.last().map_or(self.root, |call| call.callee)
    }

    /// Whether `id` is the root or an active callee
    #[must_use]
    pub fn contains(&self, id: ExecutableId) -> bool {
        self.root == id || self.calls.iter().any(|call| call.callee == id)
    }

    /// Pushes a call onto the chain.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::DetachedCall`] if the caller is not in control
    /// - [`ConfigurationError::CyclicCall`] if the call would re-enter the
    ///   root or repeat an active invocation
    pub fn add(&mut self, call: Call) -> Result<(), ConfigurationError> {
        let active = self.executable();
        if call.caller != active {
            return Err(ConfigurationError::DetachedCall {
                caller: call.caller,
                active,
            });
        }
        if call.callee == self.root || self.calls.iter().any(|c| c.same_invocation(&call)) {
            return Err(ConfigurationError::CyclicCall {
                root: self.root,
                callee: call.callee,
            });
        }
        self.calls.push(call);
        Ok(())
    }

    /// Removes and returns the innermost call
    pub fn pop(&mut self) -> Option<Call> {
        self.calls.pop()
    }

    /// Resolves the executable in control against `pool`.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UnknownExecutable`] if the pool does not hold it.
    pub fn executable_in<'p>(
        &self,
        pool: &'p ExecutablePool,
    ) -> Result<&'p ExecutableType, ConfigurationError> {
        let id = self.executable();
        pool.get(id).ok_or(ConfigurationError::UnknownExecutable(id))
    }
}

impl fmt::Display for CallChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)?;
        for call in &self.calls {
            write!(f, " -> {}", call.callee)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::call::{CallMethod, Parameters};
    use llfsm_core::Value;

    fn id(n: usize) -> ExecutableId {
        ExecutableId::new(n)
    }

    fn sync(caller: usize, callee: usize) -> Call {
        Call::new(id(caller), id(callee), Parameters::new(), CallMethod::Synchronous)
    }

    #[test]
    fn test_executable_is_root_when_empty() {
        let chain = CallChain::new(id(3));
        assert_eq!(chain.executable(), id(3));
        assert!(chain.is_empty());
    }

    #[test]
    fn test_add_then_pop_restores_chain() {
        let mut chain = CallChain::new(id(0));
        chain.add(sync(0, 1)).unwrap();
        let before = chain.clone();

        let call = sync(1, 2);
        chain.add(call.clone()).unwrap();
        assert_eq!(chain.executable(), id(2));

        assert_eq!(chain.pop(), Some(call));
        assert_eq!(chain, before);
        assert_eq!(chain.executable(), id(1));
    }

    #[test]
    fn test_cyclic_call_rejected() {
        let mut chain = CallChain::new(id(0));
        chain.add(sync(0, 1)).unwrap();
        chain.add(sync(1, 2)).unwrap();

        let err = chain.add(sync(2, 1)).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::CyclicCall {
                root: id(0),
                callee: id(1)
            }
        );
        assert_eq!(chain.len(), 2, "failed add must not modify the chain");
    }

    #[test]
    fn test_same_callee_with_different_arguments_allowed() {
        let mut chain = CallChain::new(id(0));
        chain.add(sync(0, 1)).unwrap();

        let mut again = sync(1, 1);
        again.parameters.insert("n".into(), Some(Value::U8(2)));
        assert!(chain.add(again).is_ok());
    }

    #[test]
    fn test_calling_root_is_cyclic() {
        let mut chain = CallChain::new(id(0));
        assert!(matches!(
            chain.add(sync(0, 0)),
            Err(ConfigurationError::CyclicCall { .. })
        ));
    }

    #[test]
    fn test_detached_call_rejected() {
        let mut chain = CallChain::new(id(0));
        assert!(matches!(
            chain.add(sync(5, 1)),
            Err(ConfigurationError::DetachedCall { .. })
        ));
    }

    #[test]
    fn test_display() {
        let mut chain = CallChain::new(id(0));
        chain.add(sync(0, 4)).unwrap();
        assert_eq!(chain.to_string(), "Executable(0) -> Executable(4)");
    }
}
