//! Gateway
//!
//! The gateway is how a running machine reaches other executables. Actions
//! resolve a callee by name, then issue a synchronous `call` or an
//! asynchronous `invoke`. The gateway only records the request and returns
//! a [`Promise`]; the ringlet executor dispatches the recorded calls once
//! the caller's step is over.

use super::types::{Call, CallMethod, Parameters};
use crate::domain::pool::ExecutablePool;
use llfsm_core::{ExecutableId, Value};
use std::collections::BTreeMap;

/// Handle to an issued call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Promise {
    /// Executable that was called
    pub callee: ExecutableId,
    /// How it was called
    pub method: CallMethod,
}

/// Resolves and records cross-machine calls
pub trait Gateway {
    /// Looks up an executable by name
    fn id(&self, name: &str) -> Option<ExecutableId>;

    /// Issues a synchronous call
    fn call(&mut self, callee: ExecutableId, parameters: Parameters, caller: ExecutableId) -> Promise;

    /// Issues an asynchronous call
    fn invoke(
        &mut self,
        callee: ExecutableId,
        parameters: Parameters,
        caller: ExecutableId,
    ) -> Promise;

    /// Latest result produced by a parameterised callee
    fn result(&self, callee: ExecutableId) -> Option<Value>;
}

/// Gateway over a branch pool
///
/// Names and results are captured when the gateway is created, so the pool
/// itself stays free to be mutated by the step that uses the gateway.
#[derive(Debug, Clone, Default)]
pub struct PoolGateway {
    names: BTreeMap<String, ExecutableId>,
    results: BTreeMap<ExecutableId, Value>,
    issued: Vec<Call>,
}

impl PoolGateway {
    /// Captures the names and results of every executable in `pool`
    #[must_use]
    pub fn new(pool: &ExecutablePool) -> Self {
        let mut names = BTreeMap::new();
        let mut results = BTreeMap::new();
        for (info, executable) in pool.iter() {
            names.insert(info.name.clone(), info.id);
            if let Some(result) = executable.result() {
                results.insert(info.id, result.clone());
            }
        }
        Self {
            names,
            results,
            issued: Vec::new(),
        }
    }

    /// Calls issued so far, in issue order
    #[must_use]
    pub fn issued(&self) -> &[Call] {
        &self.issued
    }

    /// Consumes the gateway, returning the issued calls
    #[must_use]
    pub fn into_calls(self) -> Vec<Call> {
        self.issued
    }

    fn record(
        &mut self,
        callee: ExecutableId,
        parameters: Parameters,
        caller: ExecutableId,
        method: CallMethod,
    ) -> Promise {
        self.issued.push(Call::new(caller, callee, parameters, method));
        Promise { callee, method }
    }
}

impl Gateway for PoolGateway {
    fn id(&self, name: &str) -> Option<ExecutableId> {
        self.names.get(name).copied()
    }

    fn call(&mut self, callee: ExecutableId, parameters: Parameters, caller: ExecutableId) -> Promise {
        self.record(callee, parameters, caller, CallMethod::Synchronous)
    }

    fn invoke(
        &mut self,
        callee: ExecutableId,
        parameters: Parameters,
        caller: ExecutableId,
    ) -> Promise {
        self.record(callee, parameters, caller, CallMethod::Asynchronous)
    }

    fn result(&self, callee: ExecutableId) -> Option<Value> {
        self.results.get(&callee).cloned()
    }
}
