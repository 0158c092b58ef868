//! Timeslot Execution
//!
//! Runs the executable in control of a timeslot for one ringlet and then
//! dispatches the calls it issued:
//!
//! ```text
//! step(active) ──▶ issued calls (sync first)
//!                   ├─ async: begin(callee)
//!                   └─ sync:  chain.add ─▶ begin ─▶ step(callee) ─▶ chain.pop
//! ```
//!
//! Nested synchronous calls recurse through the same path, so a cyclic
//! call surfaces as [`ConfigurationError::CyclicCall`] from the chain.

use crate::domain::call::{Call, CallChain, PoolGateway};
use crate::domain::clock::Clock;
use crate::domain::pool::ExecutablePool;
use crate::domain::scheduling::Timeslot;
use crate::error::ConfigurationError;
use tracing::trace;

/// Effects of executing one timeslot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Execution {
    /// Whether the root executable transitioned
    pub transitioned: bool,
    /// Every call dispatched, nested ones included, in dispatch order
    pub calls: Vec<Call>,
}

/// Executes `timeslot` against `pool`.
///
/// # Errors
///
/// - `UnknownExecutable` if the root or a callee is not in the pool
/// - `UnknownCallee` if a machine called a name that does not resolve
/// - `NotCallable`, `CyclicCall` or argument errors from the callee
pub fn execute_timeslot(
    pool: &mut ExecutablePool,
    timeslot: &Timeslot,
    clock: &mut dyn Clock,
) -> Result<Execution, ConfigurationError> {
    let mut chain = timeslot.call_chain.clone();
    let mut calls = Vec::new();
    let transitioned = execute_active(pool, &mut chain, clock, &mut calls)?;
    Ok(Execution { transitioned, calls })
}

fn execute_active(
    pool: &mut ExecutablePool,
    chain: &mut CallChain,
    clock: &mut dyn Clock,
    calls: &mut Vec<Call>,
) -> Result<bool, ConfigurationError> {
    let id = chain.executable();
    let mut gateway = PoolGateway::new(pool);
    let executable = pool
        .get_mut(id)
        .ok_or(ConfigurationError::UnknownExecutable(id))?;
    let outcome = executable.step(id, clock, &mut gateway)?;
    if let Some(callee) = outcome.unresolved.into_iter().next() {
        return Err(ConfigurationError::UnknownCallee {
            caller: executable.name().to_owned(),
            callee,
        });
    }

    let mut issued = gateway.into_calls();
    issued.sort_by_key(|call| call.method);
    for call in issued {
        trace!(%call, chain = %chain, "dispatching call");
        let synchronous = call.method.is_synchronous();
        if synchronous {
            chain.add(call.clone())?;
        }
        pool.get_mut(call.callee)
            .ok_or(ConfigurationError::UnknownExecutable(call.callee))?
            .begin(&call)?;
        calls.push(call);
        if synchronous {
            execute_active(pool, chain, clock, calls)?;
            chain.pop();
        }
    }
    Ok(outcome.transitioned)
}
